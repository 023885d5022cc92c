//! Token generator port - produces opaque refresh token values

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Produces unique, unpredictable token strings
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Token generator backed by the operating system CSPRNG
///
/// Emits `byte_len` random bytes encoded as unpadded base64url.
#[derive(Debug, Clone, Copy)]
pub struct RandomTokenGenerator {
    byte_len: usize,
}

impl RandomTokenGenerator {
    /// Default entropy: 256 bits
    pub const DEFAULT_BYTE_LEN: usize = 32;

    pub fn new(byte_len: usize) -> Self {
        Self { byte_len }
    }
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BYTE_LEN)
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        let mut bytes = vec![0u8; self.byte_len];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

//! Client entity - a registered OAuth2 application

use crate::value_objects::Snowflake;

/// Registered client, owned by the client registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: Snowflake,
    pub key: String,
    pub redirect_uri: Option<String>,
}

impl Client {
    /// Create a new Client with required fields
    pub fn new(id: Snowflake, key: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            redirect_uri: None,
        }
    }

    /// Set the registered redirect URI
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = Client::new(Snowflake::new(1), "test_client_1")
            .with_redirect_uri("https://www.example.com");

        assert_eq!(client.key, "test_client_1");
        assert_eq!(client.redirect_uri.as_deref(), Some("https://www.example.com"));
    }
}

//! User entity - the resource owner a token is issued on behalf of

use crate::value_objects::Snowflake;

/// Resource owner, owned by the user registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
}

impl User {
    pub fn new(id: Snowflake, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

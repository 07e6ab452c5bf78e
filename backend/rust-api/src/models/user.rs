use serde::{Deserialize, Serialize};
use validator::Validate;

/// Public view of an account, also what the session pointer stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

/// Account record kept in the users map, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub email: String,
    pub password_hash: String,
}

impl From<&StoredUser> for User {
    fn from(stored: &StoredUser) -> Self {
        User {
            id: stored.id.clone(),
            email: stored.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

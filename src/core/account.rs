//! User accounts.

use serde::{Deserialize, Serialize};

/// A registered chat user.
///
/// Passwords are kept as given; the store compares them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique username.
    pub username: String,

    /// Password as entered at registration.
    #[serde(skip_serializing)]
    pub password: String,

    /// Unix timestamp when the account was created.
    pub created_at: i64,
}

impl Account {
    /// Creates a new account record.
    #[must_use]
    pub fn new(username: String, password: String) -> Self {
        Self {
            username,
            password,
            created_at: super::room::current_timestamp(),
        }
    }

    /// Checks a login attempt against this account.
    #[must_use]
    pub fn matches(&self, password: &str) -> bool {
        self.password == password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_matches() {
        let account = Account::new("alice".to_string(), "secret".to_string());
        assert!(account.matches("secret"));
        assert!(!account.matches("Secret"));
        assert!(!account.matches(""));
    }

    #[test]
    fn test_password_not_serialized() {
        let account = Account::new("alice".to_string(), "secret".to_string());
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("secret"));
    }
}

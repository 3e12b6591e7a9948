use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use serde::Deserialize;
use shelf_kernel::settings::AuthSettings;

/// Login payload. A missing field reads as empty and simply fails
/// authentication.
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Identity established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
}

/// Decides whether a username/password pair may obtain a token.
pub trait Authenticator: Debug {
    /// Returns the authenticated principal, or `None` if the pair is rejected.
    fn authenticate(&self, credentials: &Credentials) -> Option<Principal>;
}

/// Thread-safe shared reference to an authenticator.
pub type AuthenticatorArc = Arc<dyn Authenticator + Send + Sync>;

/// Accepts exactly one configured username/password pair.
pub struct StaticAuthenticator {
    username: String,
    password: String,
}

impl StaticAuthenticator {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(settings.username.clone(), settings.password.clone())
    }
}

impl Debug for StaticAuthenticator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticAuthenticator")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Authenticator for StaticAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> Option<Principal> {
        // Evaluate both comparisons so a wrong username costs the same as a
        // wrong password.
        let username_ok =
            constant_time_eq(credentials.username.as_bytes(), self.username.as_bytes());
        let password_ok =
            constant_time_eq(credentials.password.as_bytes(), self.password.as_bytes());

        if username_ok & password_ok {
            Some(Principal {
                username: credentials.username.clone(),
            })
        } else {
            None
        }
    }
}

/// Byte comparison whose running time depends only on the lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_configured_pair() {
        let auth = StaticAuthenticator::from_settings(&AuthSettings::default());
        let principal = auth.authenticate(&credentials("admin", "password")).unwrap();
        assert_eq!(principal.username, "admin");
    }

    #[test]
    fn rejects_wrong_password_or_username() {
        let auth = StaticAuthenticator::new("admin", "password");
        assert!(auth.authenticate(&credentials("admin", "wrong")).is_none());
        assert!(auth.authenticate(&credentials("root", "password")).is_none());
        assert!(auth.authenticate(&credentials("", "")).is_none());
        assert!(auth.authenticate(&credentials("admin", "password ")).is_none());
    }

    #[test]
    fn missing_fields_decode_as_empty_and_are_rejected() {
        let partial: Credentials = serde_json::from_str(r#"{"username": "admin"}"#).unwrap();
        assert_eq!(partial.password, "");
        let auth = StaticAuthenticator::new("admin", "password");
        assert!(auth.authenticate(&partial).is_none());

        let empty: Credentials = serde_json::from_str("{}").unwrap();
        assert!(auth.authenticate(&empty).is_none());
        assert!(serde_json::from_str::<Credentials>(r#"{"username": 7}"#).is_err());
    }

    #[test]
    fn compare_is_exact() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn debug_never_prints_password() {
        let auth = StaticAuthenticator::new("admin", "hunter2");
        assert!(!format!("{:?}", auth).contains("hunter2"));
        assert!(!format!("{:?}", credentials("admin", "hunter2")).contains("hunter2"));
    }
}

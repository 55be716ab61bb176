use secrecy::{ExposeSecret, SecretString};

/// HTTP basic credentials for the control endpoint.
///
/// Only constructed when both halves are present: an empty login or an
/// empty password means the client talks to the endpoint anonymously.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    login: String,
    password: SecretString,
}

impl BasicAuth {
    /// Build credentials, or `None` if either half is empty.
    pub fn new(login: impl Into<String>, password: SecretString) -> Option<Self> {
        let login = login.into();
        if login.is_empty() || password.expose_secret().is_empty() {
            return None;
        }
        Some(Self { login, password })
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn both_halves_required() {
        assert!(BasicAuth::new("admin", secret("pw")).is_some());
        assert!(BasicAuth::new("", secret("pw")).is_none());
        assert!(BasicAuth::new("admin", secret("")).is_none());
    }

    #[test]
    fn debug_does_not_leak_password() {
        let auth = BasicAuth::new("admin", secret("hunter2")).map(|a| format!("{a:?}"));
        let text = auth.unwrap_or_default();
        assert!(!text.contains("hunter2"), "{text}");
    }
}

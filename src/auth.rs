use log::debug;

use crate::constants::*;
use crate::errors::*;
use crate::types::*;
use crate::ynab_client::*;

/// Holds the access token entered by the user and whether it passed the format check.
#[derive(Debug, Default)]
pub struct AuthGate {
    token: String,
    is_valid: bool,
}

/// Purely syntactic check; nothing is sent to YNAB.
pub fn validate_api_key(key: &str) -> Result<()> {
    if API_KEY_REGEX.is_match(key) {
        Ok(())
    } else {
        bail!(ErrorKind::InvalidApiKeyFormat)
    }
}

impl AuthGate {
    pub fn new() -> AuthGate {
        AuthGate::default()
    }

    pub fn set_token(&mut self, key: &str) -> Result<()> {
        self.token = key.to_string();
        let result = validate_api_key(key);
        self.is_valid = result.is_ok();
        result
    }

    pub fn token(&self) -> Option<&str> {
        if self.is_authenticated() {
            Some(&self.token)
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_valid && !self.token.is_empty()
    }

    /// Calls `GET /user` to confirm the token is accepted by YNAB.
    pub fn confirm_live(&self, ynab_client: &YnabClient) -> Result<User> {
        let token = self.token().ok_or(ErrorKind::InvalidApiKeyFormat)?;
        let user = ynab_client.fetch_user(token)?;
        debug!("Access token belongs to YNAB user {}", user.id);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::tests::*;

    #[test]
    fn test_validate_api_key() {
        assert!(validate_api_key(&"a".repeat(32)).is_ok());
        assert!(validate_api_key(&"A-z_9".repeat(12)).is_ok());
        assert!(validate_api_key(&"a".repeat(64)).is_ok());
        assert!(validate_api_key(&"a".repeat(31)).is_err());
        assert!(validate_api_key(&"a".repeat(65)).is_err());
        assert!(validate_api_key(&format!("{}!", "a".repeat(40))).is_err());
        assert!(validate_api_key("").is_err());
    }

    #[test]
    fn test_invalid_key_message() {
        let err = validate_api_key("short").unwrap_err();
        assert_eq!(err.to_string(), "Invalid API key format");
    }

    #[test]
    fn test_auth_gate_state() {
        let mut gate = AuthGate::new();
        assert!(!gate.is_authenticated());
        assert!(gate.set_token("nope").is_err());
        assert!(!gate.is_valid());
        assert_eq!(gate.token(), None);
        gate.set_token(TEST_TOKEN).unwrap();
        assert!(gate.is_authenticated());
        assert_eq!(gate.token(), Some(TEST_TOKEN));
    }

    #[test]
    fn test_confirm_live_requires_valid_token() {
        let transport = MockTransport::new();
        let api = transport.client(test_limiter());
        let ynab_client = YnabClient::new(&api);
        assert!(AuthGate::new().confirm_live(&ynab_client).is_err());
        assert_eq!(transport.call_count(), 0);

        transport.respond(200, "OK", r#"{"data": {"user": {"id": "u1"}}}"#);
        let mut gate = AuthGate::new();
        gate.set_token(TEST_TOKEN).unwrap();
        assert_eq!(gate.confirm_live(&ynab_client).unwrap().id, "u1");
        assert_eq!(transport.requests.borrow()[0].url, "https://api.ynab.com/v1/user");
    }
}

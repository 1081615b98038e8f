use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
}

/// Body of a recognized error response.
#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub message: String,
}

/// Normalized outcome of login and registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResult {
    pub token: String,
}

impl AuthResult {
    /// Login answers with `{"token": "..."}`.
    pub fn from_login(value: Value) -> Result<Self> {
        let response: LoginResponse = serde_json::from_value(value)
            .map_err(|e| Error::invalid_response(format!("login response: {e}")))?;
        Self::checked(response.token)
    }

    /// Registration answers with the bare token string. An object carrying
    /// `token` is accepted as well.
    pub fn from_register(value: Value) -> Result<Self> {
        match value {
            Value::String(token) => Self::checked(token),
            Value::Object(_) => Self::from_login(value),
            other => Err(Error::invalid_response(format!(
                "registration response is neither a token nor an object: {other}"
            ))),
        }
    }

    fn checked(token: String) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(Error::invalid_response("empty token"));
        }
        Ok(Self { token })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn login_and_register_shapes_normalize_to_the_same_result() {
        let login = AuthResult::from_login(json!({ "token": "abc" })).unwrap();
        let register = AuthResult::from_register(json!("abc")).unwrap();
        assert_eq!(login, register);
    }

    #[test]
    fn register_accepts_an_object_with_token() {
        let result = AuthResult::from_register(json!({ "token": "t-1" })).unwrap();
        assert_eq!(result.token, "t-1");
    }

    #[test]
    fn login_without_token_is_invalid() {
        let result = AuthResult::from_login(json!({ "message": "ok" }));
        assert!(matches!(result, Err(Error::InvalidResponse { .. })));
    }

    #[test]
    fn blank_or_non_string_tokens_are_rejected() {
        assert!(AuthResult::from_register(json!("")).is_err());
        assert!(AuthResult::from_register(json!(42)).is_err());
    }
}

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};

use crate::models::api_models::TokenClaims;

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 3_600;

/// HS256 token for `username`, valid for [`TOKEN_TTL_SECS`] from now.
pub fn generate_jwt_token(
    secret: &EncodingKey,
    username: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let issued_at = Utc::now().timestamp();
    let claims = TokenClaims {
        username: username.to_string(),
        iat: issued_at,
        exp: issued_at + TOKEN_TTL_SECS,
    };
    jsonwebtoken::encode(&Header::default(), &claims, secret)
}

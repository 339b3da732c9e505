use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::middleware::auth::Claims;

pub fn issue_token(user_id: Uuid, secret: &str, ttl_hours: i64) -> Result<String> {
    let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: exp.max(0) as usize,
        role: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token signing failed: {}", e)))
}

pub fn decode_token(token: &str, secret: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .ok()
        .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_decodes_to_the_same_user() {
        let user = Uuid::new_v4();
        let token = issue_token(user, "secret", 1).unwrap();
        let claims = decode_token(&token, "secret").unwrap();
        assert_eq!(claims.user_id(), Some(user));
    }

    #[test]
    fn wrong_secret_or_expired_token_is_rejected() {
        let user = Uuid::new_v4();
        let token = issue_token(user, "secret", 1).unwrap();
        assert!(decode_token(&token, "other").is_none());

        let expired = issue_token(user, "secret", -2).unwrap();
        assert!(decode_token(&expired, "secret").is_none());
    }
}

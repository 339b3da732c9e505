use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::utils::token::decode_token;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Claims of the caller, when a valid bearer token was presented.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<Claims>);

impl Caller {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().and_then(Claims::user_id)
    }
}

enum BearerError {
    Missing,
    Malformed,
    UnsupportedScheme,
    Invalid,
}

impl BearerError {
    fn into_response(self) -> Response {
        let code = match self {
            BearerError::Missing => "missing_authorization",
            BearerError::Malformed => "bad_authorization",
            BearerError::UnsupportedScheme => "unsupported_scheme",
            BearerError::Invalid => "invalid_token",
        };
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
    }
}

fn bearer_claims(req: &Request) -> Result<Claims, BearerError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?;
    let auth_str = auth_header.to_str().map_err(|_| BearerError::Malformed)?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(BearerError::UnsupportedScheme)?;

    let config = crate::config::get_config();
    let claims = decode_token(token, &config.jwt_secret).ok_or(BearerError::Invalid)?;
    if claims.user_id().is_none() {
        return Err(BearerError::Invalid);
    }
    Ok(claims)
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    match bearer_claims(&req) {
        Ok(claims) => {
            req.extensions_mut().insert(Caller(Some(claims.clone())));
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Attaches the caller's claims when a token is present. A token that is
/// present but invalid is still rejected; no token means anonymous.
pub async fn optional_bearer_auth(mut req: Request, next: Next) -> Response {
    match bearer_claims(&req) {
        Ok(claims) => {
            req.extensions_mut().insert(Caller(Some(claims)));
            next.run(req).await
        }
        Err(BearerError::Missing) => {
            req.extensions_mut().insert(Caller(None));
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

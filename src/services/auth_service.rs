use crate::dto::auth_dto::{AuthResponse, LoginPayload, RegisterPayload};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::token::issue_token;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    jwt_secret: String,
    ttl_hours: i64,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt_secret: String, ttl_hours: i64) -> Self {
        Self {
            pool,
            jwt_secret,
            ttl_hours,
        }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<AuthResponse> {
        let email = payload.email.trim().to_lowercase();
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Err(Error::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_password(&payload.password)?;
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(&email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            // lost a race with a concurrent registration
            Error::Conflict(_) => Error::Conflict("User already exists".to_string()),
            other => other,
        })?;

        tracing::info!(user_id = %user.id, "User registered");
        self.respond(user)
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<AuthResponse> {
        let email = payload.email.trim().to_lowercase();
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::Unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(&payload.password, &user.password_hash) {
            return Err(Error::Unauthorized("Invalid email or password".to_string()));
        }
        self.respond(user)
    }

    fn respond(&self, user: User) -> Result<AuthResponse> {
        let token = issue_token(user.id, &self.jwt_secret, self.ttl_hours)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }
}

pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    auth_service::AuthService, catalog_service::CatalogService, quiz_service::QuizService,
    recorder_service::RecorderService, result_service::ResultService,
    session_service::SessionService,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub quiz_service: QuizService,
    pub result_service: ResultService,
    pub session_service: SessionService,
}

impl AppState {
    /// `catalog` should already carry its database fallback when one is wanted.
    pub fn new(pool: PgPool, catalog: CatalogService) -> Self {
        let config = crate::config::get_config();

        let auth_service =
            AuthService::new(pool.clone(), config.jwt_secret.clone(), config.jwt_ttl_hours);
        let quiz_service = QuizService::new(pool.clone());
        let result_service = ResultService::new(pool.clone());
        let recorder =
            RecorderService::new(result_service.clone(), config.result_webhook_url.clone());
        let session_service = SessionService::new(catalog, Arc::new(recorder));

        Self {
            pool,
            auth_service,
            quiz_service,
            result_service,
            session_service,
        }
    }
}

pub mod auth;
pub mod catalog;
pub mod health;
pub mod quizzes;
pub mod results;
pub mod sessions;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::auth::{optional_bearer_auth, require_bearer_auth};
use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::AppState;

/// Full HTTP surface. `public_rps` caps the unauthenticated groups.
pub fn api_router(state: AppState, public_rps: u32) -> Router {
    let base_routes = Router::new().route("/health", get(health::health));

    let public_api = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/catalog", get(catalog::list_catalog))
        .route("/api/catalog/:subject/:level", get(catalog::get_quiz))
        .route("/api/quizzes", get(quizzes::list_quizzes))
        .route("/api/quizzes/:id", get(quizzes::get_quiz))
        .layer(from_fn_with_state(
            RateLimiter::new(public_rps),
            rps_middleware,
        ));

    let session_api = Router::new()
        .route("/api/sessions", post(sessions::start_session))
        .route(
            "/api/sessions/:id",
            get(sessions::get_session).delete(sessions::discard),
        )
        .route("/api/sessions/:id/answer", post(sessions::answer))
        .route("/api/sessions/:id/skip", post(sessions::skip))
        .route("/api/sessions/:id/goto", post(sessions::go_to))
        .route("/api/sessions/:id/next", post(sessions::next))
        .route("/api/sessions/:id/previous", post(sessions::previous))
        .route("/api/sessions/:id/finish", post(sessions::finish))
        .route("/api/sessions/:id/restart", post(sessions::restart))
        .route_layer(from_fn(optional_bearer_auth))
        .layer(from_fn_with_state(
            RateLimiter::new(public_rps),
            rps_middleware,
        ));

    let protected_api = Router::new()
        .route("/api/quizzes", post(quizzes::create_quiz))
        .route(
            "/api/quizzes/:id",
            axum::routing::put(quizzes::update_quiz).delete(quizzes::delete_quiz),
        )
        .route(
            "/api/results",
            get(results::list_results).post(results::create_result),
        )
        .route("/api/results/stats", get(results::result_stats))
        .route("/api/results/:id", delete(results::delete_result))
        .route_layer(from_fn(require_bearer_auth));

    base_routes
        .merge(public_api)
        .merge(session_api)
        .merge(protected_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

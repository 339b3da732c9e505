use quiz_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes,
    services::{catalog_service::CatalogService, quiz_service::QuizService},
    AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let mut catalog = CatalogService::load_file(&config.catalog_path).await?;
    if config.catalog_db_fallback {
        catalog = catalog.with_database(QuizService::new(pool.clone()));
    }

    let app_state = AppState::new(pool, catalog);

    {
        let state = app_state.clone();
        let max_idle = chrono::Duration::minutes(config.session_idle_minutes);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
                let reaped = state.session_service.reap_idle(max_idle).await;
                if reaped > 0 {
                    info!(reaped, "Discarded idle sessions");
                }
            }
        });
    }

    let app = routes::api_router(app_state, config.public_rps);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

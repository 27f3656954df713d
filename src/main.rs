use std::{net::SocketAddr, sync::Arc};

use pixel_relay::{
    AppState, RateLimiters, build_router,
    config::Config,
    infrastructure::{cache::Cache, db::Database},
    middleware::rate_limit::create_limiter,
    services::{
        auth::JwtService, canvas::CanvasClient, oauth::OAuthClient, scheduler::TaskStore,
    },
    utils::server::{init_tracing, shutdown_signal},
};

#[tokio::main]
async fn main() -> pixel_relay::error::Result<()> {
    init_tracing()?;

    let config = Config::from_env()?;
    config.validate()?;
    tracing::info!("configuration loaded");

    let db = Database::init_db(&config.database).await?;
    db.run_migrations().await?;
    tracing::info!("database migrated");
    let refresh_connection = db.get_connection().clone();

    let cache = Arc::new(Cache::new(&config.cache));
    let jwt_service = Arc::new(JwtService::new(&config.jwt));
    let oauth_client = Arc::new(OAuthClient::new(config.oauth.clone()));
    let canvas_client = Arc::new(CanvasClient::new(&config.canvas));
    let task_store = TaskStore::new(config.scheduler.lease_duration, config.scheduler.refresh_interval);

    let rate_limiters = Arc::new(RateLimiters {
        login: create_limiter(cache.clone(), config.rate_limit.login_limit, "login"),
    });

    let refresh_interval = config.scheduler.refresh_interval;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| pixel_relay::error::AppError::InvalidParams(format!("{e}")))?;

    let state = AppState {
        config: Arc::new(config),
        db: Arc::new(db),
        cache,
        jwt_service,
        oauth_client,
        canvas_client: canvas_client.clone(),
        task_store: task_store.clone(),
        rate_limiters,
    };

    tokio::spawn(pixel_relay::services::scheduler::refresh::run(
        task_store,
        refresh_connection,
        canvas_client,
        refresh_interval,
    ));

    let app = build_router(state);

    tracing::info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| pixel_relay::error::AppError::InternalServerError(e.to_string()))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| pixel_relay::error::AppError::InternalServerError(e.to_string()))?;

    Ok(())
}

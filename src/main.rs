use axum::{routing::get, Router};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seat_hold::{config::Config, controllers, AppState};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting seat hold service");

    let app_state = AppState::new(config.clone()).await?;

    // Прогрев кеша в фоне
    let state_for_bg = app_state.clone();
    tokio::spawn(async move {
        state_for_bg.cache.warmup_cache().await;
    });

    // --- Start background tasks ---

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reaper = spawn_reaper(&app_state, shutdown_rx);

    // --- Start the web server ---

    let app = Router::new()
        .route("/", get(|| async { "Seat hold API v1.0" }))
        .merge(controllers::health_route())
        .nest("/api", controllers::routes())
        .with_state(app_state.clone())
        // Схему мест редактирует SPA организатора с другого origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Сервер остановлен: даём сверке доработать текущий цикл
    let _ = shutdown_tx.send(true);
    if let Some(handle) = reaper {
        handle.await?;
    }

    info!("Shutdown complete");
    Ok(())
}

#[cfg(feature = "reaper")]
fn spawn_reaper(
    state: &std::sync::Arc<AppState>,
    shutdown: watch::Receiver<bool>,
) -> Option<tokio::task::JoinHandle<()>> {
    use seat_hold::services::reaper::ReaperTask;

    if !state.config.reaper.enabled {
        info!("Hold reaper disabled by config");
        return None;
    }

    let task = ReaperTask::new(state.tickets.clone(), state.config.reaper.interval())
        .with_cache(state.cache.clone());
    Some(task.spawn(shutdown))
}

#[cfg(not(feature = "reaper"))]
fn spawn_reaper(
    _state: &std::sync::Arc<AppState>,
    _shutdown: watch::Receiver<bool>,
) -> Option<tokio::task::JoinHandle<()>> {
    None
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use rollcall::{AttendanceStorage, Config, RollcallState, rollcall_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        loglevel = %cfg.loglevel,
        admin = %cfg.admin.username,
        default_events = cfg.default_events.len(),
        insecure_cookie = cfg.insecure_cookie
    );
    if cfg.uses_default_admin_password() {
        warn!("seeding admin with the built-in default password; set ROLLCALL_ADMIN__PASSWORD");
    }
    if cfg.cookie_secret.is_none() {
        warn!("no cookie_secret configured; sessions will not survive a restart");
    }

    let storage = AttendanceStorage::connect(&cfg.database_url).await?;
    storage.ensure_schema(&cfg.admin, &cfg.default_events).await?;

    let state = RollcallState::from_config(storage, &cfg)?;
    let app = rollcall_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}

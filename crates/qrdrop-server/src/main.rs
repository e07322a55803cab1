mod config;

use std::sync::Arc;

use tracing::{info, warn};

use qrdrop_api::auth::{AppState, AppStateInner};
use qrdrop_api::bootstrap::ensure_manager_account;
use qrdrop_api::router::router;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qrdrop=debug,qrdrop_api=debug,qrdrop_db=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.uses_placeholder_secret() {
        warn!("QRDROP_JWT_SECRET is unset or a placeholder; sessions can be forged. Set it before deploying.");
    }

    // Init database and make sure the operator can log in
    let db = qrdrop_db::Database::open(&config.db_path)?;
    let manager_id = ensure_manager_account(&db, &config.manager_email, &config.manager_password)?;
    info!("Manager account {} is {}", manager_id, config.manager_email);

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret,
        public_url: config.public_url,
    });

    let app = router(state);

    info!("qrdrop listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}

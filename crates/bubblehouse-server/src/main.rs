mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use bubblehouse_catalog::WooCommerceSource;
use bubblehouse_core::{ConfigError, SettingsSource};
use bubblehouse_sync::SyncRunner;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
    scheduler::SyncScheduler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(bubblehouse_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let woocommerce = config
        .woocommerce
        .as_ref()
        .ok_or_else(|| ConfigError::MissingEnvVar("WOOCOMMERCE_URL".to_string()))?;
    let source = WooCommerceSource::new(woocommerce, config.sync_timeout_secs)?;

    let settings = SettingsSource::from_path(config.settings_path.as_deref());
    let runner = SyncRunner::new(
        source,
        settings,
        config.api_version.clone(),
        config.sync_timeout_secs,
    )?;

    let scheduler = Arc::new(
        SyncScheduler::new(
            Arc::new(runner),
            Duration::from_secs(config.sync_interval_secs),
        )
        .await?,
    );
    scheduler.arm().await?;
    // First delivery happens at startup rather than one interval later.
    scheduler.trigger().await?;
    scheduler.start().await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        bubblehouse_core::Environment::Development
    ))?;
    let app = build_app(
        AppState {
            scheduler: Arc::clone(&scheduler),
            block_version: Arc::from(config.block_version.as_str()),
        },
        auth,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "control API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

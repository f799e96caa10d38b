//! # momo-sim
//!
//! Mobile-money payment simulator.
//!
//! ## Usage
//!
//! ```bash
//! # Optional: require clients to send `x-api-key` (or `?api_key=`)
//! export API_KEY=change-me
//!
//! # Run the server
//! momo-sim
//! ```
//!
//! Without `API_KEY` the payment route is open to anyone. That mode is
//! meant for local development only; set a key in every shared or
//! production deployment.

use momo_api::middleware::spawn_purge_task;
use momo_api::{routes, AppConfig, AppState, LogFormat};
use std::net::SocketAddr;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    match config.log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
    }

    // Print banner
    print_banner();

    // Initialize application state
    let state = AppState::from_config(config)?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Providers: {}", state.rules.providers.join(", "));
    info!(
        "Rate limit: {} requests per {}s per client",
        state.config.rate_limit.max_requests,
        state.config.rate_limit.window.as_secs()
    );

    if !state.config.access_gate_enabled() {
        if is_prod {
            error!("API_KEY is not set: payment route is OPEN in production");
        } else {
            warn!("API_KEY is not set: payment route is open (development mode)");
        }
    }

    spawn_purge_task(state.limiter.clone());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("📱 momo-sim starting on http://{}", addr);

    if !is_prod {
        info!("💳 Simulate: POST http://{}/api/payments/simulate", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("momo-sim stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

fn print_banner() {
    println!(
        r#"
  📱 momo-sim 📱
  ━━━━━━━━━━━━━━━━━━━━━━━
  Mobile Money payment simulator
  Version: {}
  
"#,
        env!("CARGO_PKG_VERSION")
    );
}

mod app;
mod config;

use std::process::ExitCode;

use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let port_arg = std::env::args().nth(1);
    let port = match config::server_port(port_arg.as_deref()) {
        Ok(port) => port,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let site_dir = config::site_dir();
    if !site_dir.is_dir() {
        tracing::error!(site_dir = %site_dir.display(), "site directory does not exist");
        return ExitCode::FAILURE;
    }
    for path in app::missing_layer_resources(&site_dir) {
        tracing::warn!(%path, "layer resource missing; selecting it will fail");
    }

    let app = app::build_app(&site_dir);

    let addr = format!("{}:{port}", config::BIND_HOST);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        site_dir = %site_dir.display(),
        "Serving heat map at http://localhost:{port}/index.html"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }

    tracing::info!("Heat map server stopped");
    ExitCode::SUCCESS
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed never
/// fires, so the other one still can.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let reason = tokio::select! {
        () = interrupt => "interrupt",
        () = terminate => "terminate",
    };
    tracing::info!(reason, "Stopping heat map server");
}

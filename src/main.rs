use std::net::SocketAddr;

use axum::{Router, routing::get};
use dotenvy::dotenv;
use tracing::info;

use quizmaster::router::init_router;
use quizmaster::state::init_app_state;
use quizmaster_db::run_migrations;
use quizmaster_observability::{init_metrics, init_tracing, shutdown_tracer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let state = init_app_state().await?;
    run_migrations(&state.db).await?;

    let bind_address = state.server_config.bind_address();
    let mut app = init_router(state);

    if let Some(handle) = init_metrics() {
        app = app.merge(Router::new().route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        ));
    }

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "🚀 Server running");
    info!("📚 Swagger UI available at /swagger-ui, Scalar at /scalar");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    shutdown_tracer().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

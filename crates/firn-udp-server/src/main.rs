use clap::Parser;
use firn_udp_server::config::{CliArgs, ServerConfig};
use firn_udp_server::server::Server;
use firn_udp_server::telemetry;
use tokio::signal;
use tokio_util::sync::CancellationToken;

// Using mimalloc for better performance under contention, especially in
// musl environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    telemetry::init_tracing();

    let server = Server::bind(config.clone()).await?;
    tracing::info!(
        "starting id service on {} with {} workers (node id {})",
        server.local_addr()?,
        config.workers,
        config.node_id
    );

    let shutdown = CancellationToken::new();
    let serving = tokio::spawn(server.run(shutdown.clone()));

    shutdown_signal().await;
    tracing::info!("shutdown signal received, terminating gracefully...");
    shutdown.cancel();
    serving.await??;

    tracing::info!("service shut down successfully");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("received SIGTERM signal");
        },
    }
}

//! Binary entry point for the text-file editing service.
//!
//! # Usage
//!
//! ```bash
//! textedit-service --dir <path> [--transport http|stdio] [--port 8080]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: control log verbosity (default: `edit_cli=info,edit_core=info,edit_transport=info`)
//!
//! Logs always go to stderr, even for the HTTP transport, so a deployment
//! can switch transports without retuning logging; this is mandatory for
//! the stdio transport since stdout carries the JSON-RPC stream.

mod cli;
mod config;
mod error;

use clap::Parser;
use edit_core::FileService;
use edit_transport::StdioServer;

use cli::{Args, Transport};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "edit_cli=info,edit_core=info,edit_transport=info,edit_fs=info",
                )
            }),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> error::Result<()> {
    let args = Args::parse();
    init_logging();

    let service_config = config::build_config(&args)?;
    tracing::info!(
        dir = %service_config.working_root.as_path().display(),
        transport = ?args.transport,
        "starting textedit-service"
    );

    let service = std::sync::Arc::new(FileService::new(service_config));

    match args.transport {
        Transport::Stdio => run_stdio(service),
        Transport::Http => run_http(service, args.port),
    }
}

fn run_stdio(service: std::sync::Arc<FileService>) -> error::Result<()> {
    let server = StdioServer::new(service);
    server.run()?;
    Ok(())
}

fn run_http(service: std::sync::Arc<FileService>, port: u16) -> error::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");

    runtime.block_on(async move {
        let app = edit_transport::router(service);
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("failed to bind HTTP listener");

        tracing::info!(%addr, "HTTP transport ready");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .expect("HTTP server error");
    });

    Ok(())
}

/// Waits for `SIGINT`/`SIGTERM` to request a graceful shutdown, bounded
/// by `axum::serve`'s own in-flight-request drain (≤ 5s per the CLI
/// contract is enforced by the caller's process supervisor, not here).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

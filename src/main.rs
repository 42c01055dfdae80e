mod error;
mod handlers;
mod ops;
mod rpc;
mod tools;
mod tzdb;

use axum::routing::post;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use handlers::{mcp_handler, AppState};
use tzdb::ZoneDb;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,
    /// Path to the TLS certificate file
    #[arg(long)]
    tls_cert: Option<PathBuf>,
    /// Path to the TLS key file
    #[arg(long)]
    tls_key: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

fn init_tracing(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[ERROR] Failed to set tracing subscriber: {e}");
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let state = Arc::new(AppState {
        zones: ZoneDb::bundled(),
    });

    // Routes for both /mcp and /mcp/
    let app = Router::new()
        .route("/mcp", post(mcp_handler))
        .route("/mcp/", post(mcp_handler))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    match (args.tls_cert, args.tls_key) {
        (Some(cert_path), Some(key_path)) => {
            tracing::info!("MCP time server listening on https://{addr}");
            let config = RustlsConfig::from_pem_file(cert_path, key_path)
                .await
                .unwrap_or_else(|e| {
                    eprintln!("[ERROR] Failed to load TLS certificate/key: {e}");
                    std::process::exit(1);
                });
            axum_server::bind_rustls(addr, config)
                .serve(app.into_make_service())
                .await
                .unwrap_or_else(|e| {
                    eprintln!("[ERROR] Failed to start HTTPS server: {e}");
                    std::process::exit(1);
                });
        }
        (None, None) => {
            tracing::info!("MCP time server listening on http://{addr}");
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .unwrap_or_else(|e| {
                    eprintln!("[ERROR] Failed to bind to address {addr}: {e}");
                    std::process::exit(1);
                });
            axum::serve(listener, app).await.unwrap_or_else(|e| {
                eprintln!("[ERROR] Failed to start HTTP server: {e}");
                std::process::exit(1);
            });
        }
        _ => {
            eprintln!(
                "[ERROR] Both --tls-cert and --tls-key must be provided together to enable TLS."
            );
            std::process::exit(1);
        }
    }
}

//! API gateway for the editor dashboard.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                  GATEWAY                     │
//!   Browser request       │  ┌────────┐   ┌─────────┐   ┌────────────┐   │
//!   ──────────────────────┼─▶│  http  │──▶│ routing │──▶│   proxy    │───┼──▶ auth / projects /
//!                         │  │ server │   │ longest │   │ forwarder  │   │    analysis / ai-core
//!                         │  └────────┘   │ prefix  │   └────────────┘   │
//!                         │               └────┬────┘                    │
//!                         │                    │ unmatched               │
//!                         │                    ▼                         │
//!                         │             ┌──────────────┐                 │
//!                         │             │ static_files │◀── static_root  │
//!                         │             └──────────────┘                 │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::config::{load_config, GatewayConfig, LogFormat};
use api_gateway::lifecycle::{wait_for_signal, Shutdown};
use api_gateway::observability::init_logging;
use api_gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Path-prefix API gateway with static bundle fallback", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration, print the route table and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let _ = init_logging("info", LogFormat::Pretty);
            tracing::error!(error = %e, "Configuration rejected, refusing to start");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.log_level, config.log_format) {
        eprintln!("failed to initialise logging: {e}");
    }

    tracing::info!("api-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    if cli.check {
        return print_routes(config);
    }

    match serve(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Gateway stopped with an error");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.bind_address(),
        request_timeout_ms = config.request_timeout_ms,
        static_root = %config.static_root.display(),
        routes = config.upstream_map.len(),
        "Configuration loaded"
    );

    let server = GatewayServer::new(config)?;
    for route in server.routes().routes() {
        tracing::info!(route = %route.name, prefix = %route.prefix(), upstream = %route.upstream, "Route registered");
    }

    let listener = TcpListener::bind(server.config().bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(wait_for_signal(shutdown));

    server.run(listener, server_shutdown).await?;
    Ok(())
}

fn print_routes(config: GatewayConfig) -> ExitCode {
    match GatewayServer::new(config) {
        Ok(server) => {
            println!("configuration OK, {} route(s), longest prefix first:", server.routes().len());
            for route in server.routes().routes() {
                println!("  {:<20} {:<16} -> {}", route.prefix(), route.name, route.upstream);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Route table rejected");
            ExitCode::FAILURE
        }
    }
}

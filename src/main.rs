// src/main.rs

use anyhow::{Context, Result};
use evm_mcp_adapter::{
    blockchain::client::ChainClients,
    config::Config,
    mcp::handler::{handle_mcp_request, parse_frame, SERVER_NAME},
    AppState,
};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "evm_mcp_adapter=info,evm_mcp=info";

/// Target of the startup line; enabled whatever `RUST_LOG` says.
const STARTUP_TARGET: &str = "evm_mcp::startup";

fn log_filter(base: EnvFilter) -> EnvFilter {
    match format!("{STARTUP_TARGET}=info").parse() {
        Ok(directive) => base.add_directive(directive),
        Err(_) => base,
    }
}

// --- MCP Server Logic ---
async fn run_mcp_server(state: AppState) -> Result<()> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut stdout = io::stdout();

    info!(
        target: STARTUP_TARGET,
        "{} running on stdio (RPC endpoint: {})",
        SERVER_NAME,
        state.clients.rpc_url()
    );

    loop {
        let mut line = String::new();

        match stdin.read_line(&mut line).await {
            Ok(0) => {
                info!("EOF received, shutting down MCP server");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                debug!("Received: {}", line);

                let response = match parse_frame(line) {
                    Ok(request) => handle_mcp_request(request, &state).await,
                    Err(rejection) => Some(rejection),
                };

                if let Some(response) = response {
                    let response_json = serde_json::to_string(&response)?;
                    debug!("Sending: {}", response_json);
                    stdout
                        .write_all(format!("{}\n", response_json).as_bytes())
                        .await
                        .context("Failed to write response")?;
                    stdout.flush().await.context("Failed to flush stdout")?;
                }
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        }
    }

    info!("MCP server shutting down");
    Ok(())
}

async fn run() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let clients = ChainClients::new(config.chain.clone()).context("Failed to initialize chain client")?;
    if config.private_key.is_none() {
        info!("PRIVATE_KEY not set; write tools will be rejected");
    }
    run_mcp_server(AppState::new(config, clients)).await
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries protocol frames only
    tracing_subscriber::registry()
        .with(log_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        error!("❌ Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

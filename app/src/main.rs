use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use contract_binding::prelude::*;
use contract_console::{Command, Config, Console, Session};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "contract-console", version, about = "Deploy, query and transact with the Test / Yo contracts")]
struct Cli {
    /// JSON-RPC endpoint (overrides RPC_URL / RPC_HOST / RPC_PORT).
    #[arg(long, global = true)]
    rpc_url: Option<String>,
    /// Network id to use instead of asking the node.
    #[arg(long, global = true, env = "NETWORK_ID")]
    network: Option<String>,
    /// Seconds to wait for a transaction to be mined (0 = forever).
    #[arg(long, global = true)]
    timeout: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = cli.rpc_url {
        config.rpc_url = url;
    }
    if cli.network.is_some() {
        config.network = cli.network;
    }
    if let Some(secs) = cli.timeout {
        config.confirmation_timeout = Duration::from_secs(secs);
    }
    info!(rpc = %config.rpc_url, network = ?config.network, "config loaded");

    let transport = HttpTransport::builder(&config.rpc_url)?
        .timeout(config.request_timeout)
        .build()
        .with_context(|| format!("connecting to {}", config.rpc_url))?;
    let provider: Provider = Arc::new(transport);

    let mut session = Session::connect(provider, config.binding_config(), Console::stdout()).await?;
    session.run(cli.command).await
}

fn init_tracing() {
    let _ = dotenvy::dotenv();
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,contract_binding=info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

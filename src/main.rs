use clap::Parser;
use tracing_subscriber::EnvFilter;

use ppc_optimizer::Config;
use ppc_optimizer::cli::{Cli, Command, run_optimize_command, run_policy_command};
use ppc_optimizer::server::OptimizerServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Command::Serve { bind } => {
            if let Some(addr) = bind {
                config.server.bind_addr = addr;
            }
            OptimizerServer::start(config.server, config.policy, shutdown_signal()).await?;
        }
        Command::Optimize(args) => run_optimize_command(args, config.policy)?,
        Command::Policy => run_policy_command(&config.policy)?,
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ppc_optimizer=info,tower_http=info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

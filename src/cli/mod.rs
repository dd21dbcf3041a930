//! Command-line interface.

mod optimize;
mod policy;

pub use optimize::{OptimizeArgs, optimize_file, run_optimize_command};
pub use policy::{policy_entries, run_policy_command};

use std::net::SocketAddr;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ppc-optimizer",
    version,
    about = "Bid recommendations for Amazon PPC keywords and product targets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to bind to (overrides PPC_BIND_ADDR)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Optimize a file of targets and write the report
    Optimize(OptimizeArgs),

    /// Show the effective bid policy
    Policy,
}

use clap::Parser;
use sla_gateway::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => cli::serve::run(args.table).await,
        Command::Check(args) => cli::check::run(args.table),
    }
}

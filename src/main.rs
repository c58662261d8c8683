use clap::Parser;
use radixroute::cli::{run_cli, Cli};
use radixroute::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    init_logging(&LogConfig::from_env())?;
    let cli = Cli::parse();
    run_cli(cli)
}

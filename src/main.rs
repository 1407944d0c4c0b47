use clap::Parser;
use log::*;

use notesmith::{cli::Args, error::Result, orchestrator::Orchestrator};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("notesmith")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = Args::parse();

    initialize_logger(cli_args.debug)?;

    let config = cli_args.to_config()?;

    let orchestrator = Orchestrator::from_config(config)?;

    let report = orchestrator.run().await;

    report.log_summary();

    if report.failed() > 0 {
        warn!(
            "{} of {} repositories failed",
            report.failed(),
            report.repos.len()
        );
    }

    Ok(())
}

use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use retro8080::{exit_status, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.trace {
        logger.filter_module("retro8080_core::cpu", LevelFilter::Trace);
    }
    logger.init();

    match retro8080::run(cli) {
        Ok(summary) => {
            println!(
                "{:?}: {} instructions, {} states, {} interrupts",
                summary.reason, summary.instructions, summary.cycles, summary.interrupts
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

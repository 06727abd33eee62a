mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use dotenv::dotenv;
use neat_freak::{config, logging, mailer, scheduler, Organizer};
use std::sync::mpsc;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Once) => run_once(),
        Some(Commands::PrintConfig) => print_config(),
        Some(Commands::Run) | None => run_daemon(),
    };

    if let Err(err) = result {
        // Reaching here means startup configuration was unusable; per-item
        // errors never propagate this far.
        error!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run_daemon() -> anyhow::Result<()> {
    let config = config::load_configuration().context("loading configuration")?;
    info!("Starting File Organizer with internal scheduler.");

    let schedule = config.schedule;
    let notifier = mailer::build_notifier(&config);
    let organizer = Organizer::new(config);

    // The sender is parked here for the lifetime of the process; a
    // graceful shutdown path can hand it to a signal handler later.
    let (_stop_tx, stop_rx) = mpsc::channel::<()>();
    scheduler::run(&organizer, notifier.as_ref(), schedule, &stop_rx);
    Ok(())
}

fn run_once() -> anyhow::Result<()> {
    let config = config::load_configuration().context("loading configuration")?;
    let notifier = mailer::build_notifier(&config);
    let organizer = Organizer::new(config);
    scheduler::run_one_pass(&organizer, notifier.as_ref());
    Ok(())
}

fn print_config() -> anyhow::Result<()> {
    let config = config::load_configuration().context("loading configuration")?;
    println!("{:#?}", config);
    Ok(())
}

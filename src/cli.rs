use clap::{Parser, Subcommand};

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "neat-freak")]
#[command(about = "A neat freak for messy directory trees", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the organizer daemon on its configured schedule
    #[command()]
    Run,
    /// Run a single organization pass and exit
    Once,
    /// Print the validated configuration values
    PrintConfig,
}

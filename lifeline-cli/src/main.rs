use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod components;
mod config;

#[derive(Parser)]
#[command(name = "lifeline", about = "Guided symptom checking with follow-up questions")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Answer follow-up questions until a diagnosis is reached
    Diagnose(commands::diagnose::DiagnoseArgs),
    /// Show recent diagnoses
    History(commands::history::HistoryArgs),
    /// Run the lifeline server
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Config(args) => commands::config::run(args),
        Commands::Diagnose(args) => commands::diagnose::run(args).await,
        Commands::History(args) => commands::history::run(args).await,
        Commands::Serve(args) => commands::serve::run(args).await,
    }
}

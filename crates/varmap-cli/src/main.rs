use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::context::AppContext;

#[derive(Parser)]
#[command(name = "varmap")]
#[command(about = "varmap - offline-first map points synchronized with a remote service", long_about = None)]
struct Cli {
    /// Keep config, points and session state in this directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the remote base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the local point collection
    List,
    /// Replace the local collection with the remote one
    Pull,
    /// Send the local collection and store the remote's answer
    Push,
    /// Add a point locally and push it
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lon: f64,
    },
    /// Print the restored session state
    State,
    /// Run both sync loops until Ctrl-C
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::build(cli.data_dir.as_deref(), cli.base_url).await?;

    match cli.command {
        Commands::List => commands::points::list(&ctx).await?,
        Commands::Pull => commands::points::pull(&ctx).await?,
        Commands::Push => commands::points::push(&ctx).await?,
        Commands::Add { name, lat, lon } => commands::points::add(&ctx, name, lat, lon).await?,
        Commands::State => commands::state::show(&ctx).await?,
        Commands::Run => commands::run::run(&ctx).await?,
    }

    Ok(())
}

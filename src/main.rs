//! CLI entry point for pressroom

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pressroom")]
#[command(version)]
#[command(about = "A static site generator for collections of markdown and template content", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the site into the output directory
    #[command(alias = "b")]
    Build,

    /// Remove the output directory
    Clean,

    /// List the items of each collection
    List {
        /// Only list this collection
        collection: Option<String>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "pressroom=debug,info"
    } else {
        "pressroom=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine the current directory")?,
    };

    match cli.command {
        Commands::Build => {
            let site = pressroom::Site::new(&base_dir)?;
            tracing::info!("Building site in {:?}", base_dir);
            let summary = site.build()?;
            println!(
                "Generated {} pages and {} indexes from {} items, copied {} assets",
                summary.pages, summary.indexes, summary.items, summary.assets
            );
        }

        Commands::Clean => {
            let site = pressroom::Site::new(&base_dir)?;
            tracing::info!("Cleaning output folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { collection } => {
            let site = pressroom::Site::new(&base_dir)?;
            pressroom::commands::list::run(&site, collection.as_deref())?;
        }

        Commands::Version => {
            println!("pressroom version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

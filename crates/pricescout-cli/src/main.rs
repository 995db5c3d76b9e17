mod output;
mod search;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricescout")]
#[command(about = "Search a store for products under a price ceiling")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one search right away and print the results
    Search {
        /// Search terms; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Print results as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Write the raw fetched response to this file before normalizing
        #[arg(long, value_name = "PATH")]
        dump_raw: Option<PathBuf>,
    },
    /// Read search-box text from stdin, one line per edit, and search as you type
    ///
    /// A line containing only `!` submits the current text immediately.
    /// `:q` quits at once; end of input waits for the pending search first.
    Watch {
        /// Print results as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Also loads `.env`.
    let config = pricescout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Some(Commands::Search {
            query,
            json,
            dump_raw,
        }) => search::run_search(&config, &query.join(" "), json, dump_raw.as_deref()).await,
        Some(Commands::Watch { json }) => watch::run_watch(&config, json).await,
        None => {
            println!("pricescout: try `pricescout search <QUERY>` or `pricescout watch`");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;

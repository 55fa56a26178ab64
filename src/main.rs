//! # ragdesk CLI
//!
//! The `ragdesk` binary builds the answer pipeline from a TOML config and
//! either serves it over HTTP or answers from the command line.
//!
//! ## Usage
//!
//! ```bash
//! ragdesk --config ./config/ragdesk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragdesk serve` | Build the index and start the chat server |
//! | `ragdesk ask "<question>"` | Answer one question and print its sources |
//! | `ragdesk search "<question>"` | Show the nearest documents with distances |
//! | `ragdesk check` | Validate config and corpus without calling providers |
//! | `ragdesk completions <shell>` | Print a shell completion script |
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ragdesk::{ask, config, server, startup};

/// ragdesk: retrieval-augmented answers over a fixed knowledge base.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/ragdesk.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "ragdesk",
    about = "ragdesk: retrieval-augmented answers over a fixed knowledge base",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ragdesk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and start the HTTP chat server.
    ///
    /// The server binds only after every document has been embedded.
    Serve,

    /// Answer one question and print the answer with its sources.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// Retrieve the nearest documents for a question without generating.
    Search {
        /// The question to search for.
        question: String,

        /// Number of documents to return (defaults to retrieval.top_k).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Validate the config and corpus without contacting any provider.
    Check,

    /// Print a shell completion script to stdout.
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Commands that don't require config
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "ragdesk", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            let pipeline = startup::build_pipeline(&cfg).await?;
            server::run_server(&cfg, Arc::new(pipeline)).await?;
        }
        Commands::Ask { question } => {
            ask::run_ask(&cfg, &question).await?;
        }
        Commands::Search { question, k } => {
            if k == Some(0) {
                anyhow::bail!("--k must be greater than zero");
            }
            ask::run_search(&cfg, &question, k).await?;
        }
        Commands::Check => {
            ask::run_check(&cfg)?;
        }
        Commands::Completions { .. } => unreachable!("handled before config load"),
    }

    Ok(())
}

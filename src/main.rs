use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use smokeboard::board::Board;
use smokeboard::config::BoardConfig;
use smokeboard::feed::file::FileSource;
use smokeboard::feed::EventSource;
use smokeboard::{board, projector};

#[derive(Parser)]
#[command(
    name = "smokeboard",
    about = "Live status board daemon for smoke-test results",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon (feed subscriber + projector + HTTP server)
    Serve {
        /// Bind address for the API and dashboard (overrides config)
        #[arg(long)]
        bind: Option<String>,

        /// Notification feed address (overrides config)
        #[arg(long)]
        feed: Option<String>,

        /// Config file path (falls back to SMOKEBOARD_CONFIG, then
        /// /etc/smokeboard/smokeboard.toml, then defaults)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Layout file seeding the board at startup
        #[arg(long)]
        layout: Option<PathBuf>,
    },

    /// Apply a recorded event stream to a board offline and print the result
    Replay {
        /// Layout file describing the board elements
        #[arg(long)]
        layout: PathBuf,

        /// JSONL file with one event envelope per line
        #[arg(long)]
        events: PathBuf,

        /// Print the patch trace instead of the final board
        #[arg(long)]
        patches: bool,
    },
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            feed,
            config,
            layout,
        } => {
            let mut cfg = match config {
                Some(path) => BoardConfig::load(&path)?,
                None => BoardConfig::load_or_default(),
            };
            if let Some(bind) = bind {
                cfg.http.bind = bind;
            }
            if let Some(feed) = feed {
                cfg.feed.address = feed;
            }

            init_tracing(&cfg.logging.level);
            tracing::info!(feed = %cfg.feed.address, "starting smokeboard daemon");
            smokeboard::serve(cfg, layout.as_deref()).await?;
        }
        Commands::Replay {
            layout,
            events,
            patches,
        } => {
            init_tracing("warn");

            let entries = board::layout::load(&layout)?;
            let mut board = Board::from_entries(entries)?;

            let mut source = FileSource::open(&events).await?;
            let mut trace = Vec::new();
            while let Some(event) = source.next_event().await? {
                trace.extend(projector::project_and_apply(&mut board, &event));
            }

            if patches {
                println!("{}", serde_json::to_string_pretty(&trace)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&board)?);
            }
        }
    }

    Ok(())
}

//! ChanStore control tool
//!
//! Inspects and maintains an offline cache root from the command line.

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use chancache::CacheConfig;

use crate::commands::{Command, CommandHandler};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache root directory
    #[arg(short, long, env = "CHANSTORE_ROOT", default_value = "./cache")]
    root: String,

    /// Boards kept in memory
    #[arg(long, default_value_t = chancache::DEFAULT_BOARD_CAPACITY)]
    board_capacity: usize,

    /// Threads kept in memory
    #[arg(long, default_value_t = chancache::DEFAULT_THREAD_CAPACITY)]
    thread_capacity: usize,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!(root = %args.root, "chanctl v{}", env!("CARGO_PKG_VERSION"));

    let config = CacheConfig::new(&args.root)
        .with_board_capacity(args.board_capacity)
        .with_thread_capacity(args.thread_capacity);
    let cache = chancache::init_global(config)
        .with_context(|| format!("opening cache root {}", args.root))?;

    let handler = CommandHandler::new(cache);
    let output = handler.handle(args.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

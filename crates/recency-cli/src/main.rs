//! Recency Shell - line-oriented command shell over an LRU cache

mod command;
mod handler;
mod reply;

use anyhow::{Context, Result};
use clap::Parser;
use recency::LruCache;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::command::{parse_command, Command};
use crate::handler::CommandHandler;

const PROMPT: &str = "recency> ";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache capacity (number of items)
    #[arg(short, long, env = "RECENCY_CAPACITY", default_value_t = 1024)]
    capacity: usize,

    /// Read commands from a script file instead of stdin
    #[arg(short, long)]
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Logs go to stderr so replies on stdout stay clean
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting Recency Shell v{}", env!("CARGO_PKG_VERSION"));
    info!("Cache capacity: {}", args.capacity);

    let mut handler = build_handler(args.capacity)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &args.script {
        Some(path) => {
            info!("Running script {}", path.display());
            let input = open_script(path)?;
            run(&mut handler, input, &mut out, false)
        }
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            run(&mut handler, stdin.lock(), &mut out, interactive)
        }
    }
}

fn build_handler(capacity: usize) -> Result<CommandHandler> {
    let cache = LruCache::new(capacity).context("Failed to create cache")?;
    Ok(CommandHandler::new(cache))
}

fn open_script(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open script {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Read commands line by line until EOF or QUIT, writing one reply per command
fn run<R: BufRead, W: Write>(
    handler: &mut CommandHandler,
    mut input: R,
    out: &mut W,
    prompt: bool,
) -> Result<()> {
    let mut line = String::new();

    loop {
        if prompt {
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        match parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(cmd)) => writeln!(out, "{}", handler.handle(cmd))?,
            Err(reply) => {
                warn!("Parse error: {}", reply);
                writeln!(out, "{}", reply)?;
            }
        }
    }

    out.flush()?;
    info!(entries = handler.cache().len(), "Session closed");
    Ok(())
}

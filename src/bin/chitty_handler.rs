//! Line-oriented request handler
//!
//! Reads one JSON request per line (stdin or `--input`) and writes one
//! success/data/message envelope per line to stdout. Stands in for the HTTP
//! layer so the engine can be driven from scripts and test harnesses.
//!
//! Example:
//! ```text
//! {"op": "createFund", "name": "5 Lakh Chitty", "principal": 500000, "duration": 20}
//! {"op": "listFunds"}
//! ```

use anyhow::Context;
use chitty_manager::api::handle_json;
use chitty_manager::ChittyManager;
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "chitty_handler", version, about = "Serve chitty requests as JSON lines")]
struct Args {
    /// Read requests from this file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("unable to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let manager = ChittyManager::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut handled = 0usize;

    for line in reader.lines() {
        let line = line.context("failed to read request line")?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(out, "{}", handle_json(&manager, &line))?;
        handled += 1;
    }
    out.flush()?;

    info!("Handled {} requests", handled);
    Ok(())
}

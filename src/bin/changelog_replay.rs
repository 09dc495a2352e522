//! Replay a stream of proposals through a sequencer
//!
//! Reads newline-delimited JSON proposals from a file (or stdin) and prints
//! each accepted entry as JSON. Rejected proposals are logged.
//!
//! Run with: RUST_LOG=debug cargo run --bin changelog_replay -- proposals.jsonl

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use anyhow::{Context, Result};
use docseq::{Proposal, Sequencer, SequencerConfig, TrustingResolver};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args().nth(1);
    let input: Box<dyn BufRead> = match &path {
        Some(p) => Box::new(BufReader::new(
            File::open(p).with_context(|| format!("Failed to open {}", p))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let label = path.clone().unwrap_or_else(|| "stdin".to_string());
    let sequencer = Sequencer::new(SequencerConfig::default().with_label(label));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut rejected = 0usize;

    for (line_no, line) in input.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let proposal: Proposal = serde_json::from_str(&line)
            .with_context(|| format!("Invalid proposal on line {}", line_no + 1))?;

        match sequencer.submit(proposal, &TrustingResolver).await {
            Ok(accepted) => {
                serde_json::to_writer(&mut out, &accepted)?;
                writeln!(out)?;
            }
            Err(e) => {
                log::warn!("line {}: {}", line_no + 1, e);
                rejected += 1;
            }
        }
    }

    eprintln!(
        "final clock {} ({} rejected)",
        sequencer.current_clock()?,
        rejected
    );
    Ok(())
}

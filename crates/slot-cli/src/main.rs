//! `slots` CLI — expand calendars, project availability and find common
//! meeting slots from JSON on the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Expand stamps into concrete occurrences for a date window
//! slots expand --from 2026-03-16 --to 2026-03-29 -i calendar.json
//!
//! # Reduce a calendar to busy intervals inside a request's search space
//! slots project --request request.json -i calendar.json -o busy.json
//!
//! # Find every candidate slot for a request and its participants
//! slots find --step 15 -i search.json
//!
//! # Summarize a search without printing every slot
//! slots stats -i search.json
//! ```
//!
//! Input and output default to stdin/stdout. Diagnostics go to stderr;
//! set `RUST_LOG` to control them.

mod logger;

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use slot_engine::space::SearchSpace;
use slot_engine::{
    CalendarItem, CommonSlot, ParticipantAvailability, RequestConfiguration, DEFAULT_STEP_MINUTES,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Find meeting times that fit everyone's calendar"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log engine diagnostics (skipped items, search summaries) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand calendar items and stamps into occurrences within a day window
    Expand {
        /// Calendar items JSON array (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day of the window, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },
    /// Project a calendar onto a request's date and time ranges as busy intervals
    Project {
        /// Calendar items JSON array (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Request configuration JSON file
        #[arg(short, long)]
        request: String,
    },
    /// Find every candidate slot for a request and its participants
    Find {
        /// Search JSON with `config` and `participants` (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Probe step in minutes
        #[arg(long, default_value_t = DEFAULT_STEP_MINUTES)]
        step: u32,
    },
    /// Show a summary of a search (cells scanned, slots found, best headcount)
    Stats {
        /// Search JSON with `config` and `participants` (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Probe step in minutes
        #[arg(long, default_value_t = DEFAULT_STEP_MINUTES)]
        step: u32,
    },
}

/// Input of `find` and `stats`.
#[derive(Debug, Serialize, Deserialize)]
struct SearchInput {
    config: RequestConfiguration,
    #[serde(default)]
    participants: Vec<ParticipantAvailability>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match cli.command {
        Commands::Expand {
            input,
            output,
            from,
            to,
        } => {
            let items: Vec<CalendarItem> = read_json(input.as_deref())?;
            let occurrences = slot_engine::expand(&items, from, to);
            info!(
                items = items.len(),
                occurrences = occurrences.len(),
                "expanded calendar"
            );
            write_json(output.as_deref(), &occurrences)?;
        }
        Commands::Project {
            input,
            output,
            request,
        } => {
            let items: Vec<CalendarItem> = read_json(input.as_deref())?;
            let config: RequestConfiguration = read_json(Some(request.as_str()))?;
            let busy = slot_engine::project_for_request(&items, &config)
                .context("Failed to project calendar onto request")?;
            write_json(output.as_deref(), &busy)?;
        }
        Commands::Find {
            input,
            output,
            step,
        } => {
            let search: SearchInput = read_json(input.as_deref())?;
            let slots = run_search(&search, step)?;
            write_json(output.as_deref(), &slots)?;
        }
        Commands::Stats { input, step } => {
            let search: SearchInput = read_json(input.as_deref())?;
            let slots = run_search(&search, step)?;
            let cells = SearchSpace::for_request(&search.config)
                .context("Invalid request configuration")?
                .cells()
                .count();
            let best = slots.iter().map(CommonSlot::headcount).max().unwrap_or(0);

            println!("Participants:  {}", search.participants.len());
            println!("Required:      {}", search.config.desired_member_count);
            println!("Cells scanned: {}", cells);
            println!("Slots found:   {}", slots.len());
            println!("Best headcount: {}", best);
            if let Some(first) = slots.first() {
                println!("Earliest slot: {} - {}", first.start, first.end);
            }
        }
    }

    Ok(())
}

/// Run the finder, logging why an empty result came back.
fn run_search(search: &SearchInput, step: u32) -> Result<Vec<CommonSlot>> {
    let slots = slot_engine::find_common(&search.config, &search.participants, step)
        .context("Failed to search for common slots")?;

    if slots.is_empty() {
        if search.participants.len() < search.config.desired_member_count {
            warn!(
                participants = search.participants.len(),
                required = search.config.desired_member_count,
                "not enough participants have submitted availability"
            );
        } else {
            info!("no common slots found");
        }
    } else {
        info!(slots = slots.len(), "common slots found");
    }
    Ok(slots)
}

fn read_json<T: DeserializeOwned>(path: Option<&str>) -> Result<T> {
    let raw = read_input(path)?;
    let source = path.unwrap_or("stdin");
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse JSON from {}", source))
}

fn write_json<T: Serialize + ?Sized>(path: Option<&str>, value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    write_output(path, &pretty)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

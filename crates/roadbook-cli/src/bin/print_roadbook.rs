//! Print the roadbooks of a saved travel document.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use roadbook_cli::{format_distance, render_roadbook};
use roadbook_core::Travel;

#[derive(Parser, Debug)]
#[command(author, version, about = "Render the roadbooks of a travel document")]
struct Args {
    /// Travel document produced by plan_trip
    file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let data = std::fs::read_to_string(&args.file)
        .with_context(|| format!("cannot read {}", args.file.display()))?;
    let travel: Travel =
        serde_json::from_str(&data).context("the file is not a travel document")?;

    println!("# {}", travel.name);
    if let Some(saved_at) = travel.saved_at {
        println!("saved {}", saved_at.format("%Y-%m-%d %H:%M UTC"));
    }
    for route in &travel.routes {
        println!();
        print!("{}", render_roadbook(route));
    }
    if !travel.travel_notes.is_empty() {
        println!();
        println!("travel notes:");
        for note in &travel.travel_notes {
            let text = if note.tooltip.is_empty() {
                &note.icon_name
            } else {
                &note.tooltip
            };
            println!("  - [{}] {text}", format_distance(note.distance));
        }
    }

    Ok(())
}

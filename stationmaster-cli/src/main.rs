use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stationmaster_core::{ContentTables, Station, TeamNumber};

/// Stationmaster: content-pack tooling for the hunt bot
#[derive(Parser, Debug)]
#[command(name = "stationmaster")]
#[command(about = "Validate and preview hunt content packs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a clue/code table pair before the event
    Validate(TablesArgs),
    /// Print one team's station sequence as players will see it
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct TablesArgs {
    /// Pipe-delimited clue table
    #[arg(long, default_value = "Clues.csv")]
    clues: PathBuf,

    /// Pipe-delimited completion-code table
    #[arg(long, default_value = "Codes.csv")]
    codes: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    tables: TablesArgs,

    /// Team number to preview
    #[arg(long)]
    team: u32,

    /// Also print the completion codes (spoilers!)
    #[arg(long)]
    show_codes: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate(args) => validate(&args),
        Commands::Preview(args) => preview(&args),
    }
}

fn load(args: &TablesArgs) -> Result<ContentTables> {
    ContentTables::load(&args.clues, &args.codes).with_context(|| {
        format!(
            "content pack invalid ({} / {})",
            args.clues.display(),
            args.codes.display()
        )
    })
}

fn validate(args: &TablesArgs) -> Result<()> {
    let tables = load(args)?;

    println!("Content pack OK: {} teams", tables.team_count());
    for team in tables.team_numbers() {
        let stations = tables.station_count(team)?;
        let break_position = tables.break_position(team)?;
        println!(
            "  team {}: {} slots, break at index {} ({} phase-one stations, {} phase-two)",
            team,
            stations,
            break_position,
            break_position,
            stations - break_position - 1,
        );
    }
    Ok(())
}

fn preview(args: &PreviewArgs) -> Result<()> {
    let tables = load(&args.tables)?;
    let team = TeamNumber(args.team);

    let station_count = tables
        .station_count(team)
        .with_context(|| format!("no such team: {}", args.team))?;

    println!("Team {} route:", team);
    for index in 0..station_count {
        match tables.station(team, index)? {
            Station::Break => {
                println!("  -- BREAK (assembly point) --");
                continue;
            }
            Station::PhotoClue { asset } => {
                let number = tables.display_number(team, index)?;
                println!("  Station {}: [photo] {}", number, asset);
            }
            Station::Clue(body) => {
                let number = tables.display_number(team, index)?;
                let first_line = body.lines().next().unwrap_or("");
                println!("  Station {}: {}", number, first_line);
            }
        }
        if args.show_codes {
            println!("      code: {}", tables.code(team, index)?);
        }
    }
    Ok(())
}

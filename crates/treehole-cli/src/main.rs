//! treehole - browse treehole divisions and holes from the terminal.
//!
//! Divisions are shown from the local snapshot first and then refreshed;
//! holes are paged in newest first until the requested number of pages is
//! loaded or the division runs out.

mod format;

use std::io;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use treehole_core::{Config, DivisionId, TagFilter, TreeHole};

use format::{single_line, truncate_string};

/// Width of the hole preview column
const PREVIEW_WIDTH: usize = 60;

/// Pages loaded by `holes` unless `--pages` says otherwise
const DEFAULT_PAGES: usize = 1;

const USAGE: &str = "\
Usage:
  treehole divisions
  treehole holes [DIVISION_ID] [--pages N] [--size N] [--tag NAME]";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // RUST_LOG controls the level (e.g., RUST_LOG=treehole_core=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[derive(Debug, PartialEq)]
enum Command {
    Divisions,
    Holes(HolesArgs),
    Help,
}

#[derive(Debug, Default, PartialEq)]
struct HolesArgs {
    division_id: Option<DivisionId>,
    pages: Option<usize>,
    size: Option<usize>,
    tag: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(command) = args.first() else {
        return Ok(Command::Help);
    };

    match command.as_str() {
        "divisions" => Ok(Command::Divisions),
        "holes" => {
            let mut holes = HolesArgs::default();
            let mut rest = args[1..].iter();
            while let Some(arg) = rest.next() {
                match arg.as_str() {
                    "--pages" => holes.pages = Some(parse_count(rest.next(), "--pages")?),
                    "--size" => holes.size = Some(parse_count(rest.next(), "--size")?),
                    "--tag" => {
                        let tag = rest.next().context("--tag needs a value")?;
                        holes.tag = Some(tag.clone());
                    }
                    other if holes.division_id.is_none() => {
                        let id = other
                            .parse()
                            .with_context(|| format!("Invalid division id: {}", other))?;
                        holes.division_id = Some(id);
                    }
                    other => bail!("Unexpected argument: {}", other),
                }
            }
            Ok(Command::Holes(holes))
        }
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    }
}

fn parse_count(value: Option<&String>, flag: &str) -> Result<usize> {
    let value = value.with_context(|| format!("{} needs a value", flag))?;
    let count: usize = value
        .parse()
        .with_context(|| format!("Invalid value for {}: {}", flag, value))?;
    if count == 0 {
        bail!("{} must be at least 1", flag);
    }
    Ok(count)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    let app = TreeHole::from_config(&config)?;
    info!(base_url = config.api_base_url(), "treehole starting");

    match command {
        Command::Divisions => show_divisions(&app).await,
        Command::Holes(args) => show_holes(&app, &mut config, args).await,
        Command::Help => Ok(()),
    }
}

async fn show_divisions(app: &TreeHole) -> Result<()> {
    if let Some(age) = app.divisions.snapshot_age() {
        eprintln!("Cached divisions from {}, refreshing...", age);
    }
    app.divisions.refresh().await?;

    for division in app.divisions.divisions().await {
        println!(
            "{:>4}  {:<16} {}",
            division.id,
            division.name,
            truncate_string(&single_line(division.display_description()), PREVIEW_WIDTH)
        );
    }
    Ok(())
}

async fn show_holes(app: &TreeHole, config: &mut Config, args: HolesArgs) -> Result<()> {
    let division_id = args
        .division_id
        .or(config.last_division_id)
        .context("No division given and none remembered; run `treehole divisions` first")?;

    // Divisions are only needed for the header; a failed refresh is not fatal
    if let Err(e) = app.divisions.refresh().await {
        warn!(error = %e, "Could not refresh divisions");
    }
    app.select_division(Some(division_id));

    let size = args.size.unwrap_or_else(|| config.page_size());
    let tag = args.tag.as_deref().map(TagFilter::from);
    let pages = args.pages.unwrap_or(DEFAULT_PAGES);

    for _ in 0..pages {
        if !app.holes.sync_page(division_id, size, tag.as_ref()).await? {
            eprintln!("No more holes.");
            break;
        }
    }

    match app.current_division().await {
        Some(division) => println!("# {}", division.name),
        None => println!("# Division {}", division_id),
    }
    for hole in app.current_holes().await {
        let preview = hole.preview().map(single_line).unwrap_or_default();
        println!(
            "#{:<8} {}  [{}]  {}",
            hole.id,
            hole.formatted_updated(),
            hole.tag_names(),
            truncate_string(&preview, PREVIEW_WIDTH)
        );
    }

    if config.last_division_id != Some(division_id) {
        config.last_division_id = Some(division_id);
        if let Err(e) = config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }
    Ok(())
}

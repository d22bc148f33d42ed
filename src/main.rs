use anyhow::{bail, Context, Result};
use std::env;
use std::path::Path;

use wolfpack_api::logging::init_logging;
use wolfpack_api::{import_rows, load_csv, Gender, ImportReport, ServerConfig, WolfService};

const USAGE: &str = "\
Usage:
  wolfpack-api import <csv>   validate and insert wolves from a CSV file
  wolfpack-api check <csv>    validate a CSV file without inserting
  wolfpack-api list           print all stored wolves

Environment: WOLFPACK_DB (default wolfpack.db), WOLFPACK_LOG";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = ServerConfig::from_env()?;
    init_logging(&config.log_filter)?;

    match args.get(1).map(String::as_str) {
        Some("import") => run_import(&config, csv_arg(&args)?, false),
        Some("check") => run_import(&config, csv_arg(&args)?, true),
        Some("list") => run_list(&config),
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}

fn csv_arg(args: &[String]) -> Result<&Path> {
    match args.get(2) {
        Some(path) => Ok(Path::new(path)),
        None => bail!("missing <csv> argument\n\n{USAGE}"),
    }
}

fn run_import(config: &ServerConfig, csv_path: &Path, dry_run: bool) -> Result<()> {
    println!("📂 Loading {}...", csv_path.display());
    let rows = load_csv(csv_path)?;
    println!("✓ Read {} rows", rows.len());

    let store = config.open_store().context("Failed to open wolf store")?;
    let service = WolfService::new(store);

    let report = import_rows(&service, rows, dry_run)?;
    print_report(&report, dry_run);

    Ok(())
}

fn print_report(report: &ImportReport, dry_run: bool) {
    let verb = if dry_run { "Valid" } else { "Inserted" };
    println!("✓ {}: {} wolves", verb, report.accepted.len());

    if !report.rejected.is_empty() {
        println!("✗ Rejected: {}", report.rejected.len());
        for row in &report.rejected {
            println!("   line {:>4}  {:<20} {}", row.line, row.name, row.reason);
        }
    }
}

fn run_list(config: &ServerConfig) -> Result<()> {
    let store = config.open_store().context("Failed to open wolf store")?;
    let wolves = WolfService::new(store).list()?;

    println!("{:>5}  {:<20} {:<12} {:<14}  LOCATION", "ID", "NAME", "BORN", "GENDER");
    for wolf in &wolves {
        let gender = Gender::from_code(wolf.gender).map_or("?", |gender| gender.as_str());
        println!(
            "{:>5}  {:<20} {:<12} {:<14}  {}",
            wolf.id, wolf.name, wolf.birth_date, gender, wolf.location
        );
    }
    println!("\n{} wolves", wolves.len());

    Ok(())
}

//! Heist Ledger
//!
//! Command-line front end: classifies OCR text from a loot capture and
//! maintains the loot log.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::io::Read;

use heist_ledger::cli::{Cli, Commands, DeleteArgs, EditArgs, ListArgs, ScanArgs, SummaryArgs};
use heist_ledger::history::{export_to_json, LogSummary, LootLog, LOG_HEADER};
use heist_ledger::{load_config, logging, paths, AppConfig, ClassifiedRow, Pipeline};

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        log::error!("[PANIC]{} {}", location, msg);
    }));

    let cli = Cli::parse();

    paths::ensure_directories().context("Failed to create output directories")?;
    logging::init(cli.verbose)?;

    let config_path = cli.config.clone().unwrap_or_else(paths::default_config_path);
    let config = load_config(&config_path);

    match cli.command {
        Commands::Scan(args) => run_scan(args, &config),
        Commands::List(args) => run_list(args, &config),
        Commands::Edit(args) => run_edit(args, &config),
        Commands::Delete(args) => run_delete(args, &config),
        Commands::Summary(args) => run_summary(args, &config),
    }
}

fn read_ocr_text(args: &ScanArgs) -> Result<String> {
    match &args.file {
        Some(path) if !args.reads_stdin() => fs::read_to_string(path)
            .context(format!("Failed to read OCR text: {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read OCR text from stdin")?;
            Ok(text)
        }
    }
}

fn describe(row: &ClassifiedRow) -> String {
    let mut line = format!("{}: {}", row.column, row.value);
    if let Some(stack) = row.stack_size {
        line.push_str(&format!(" x{}", stack));
    }
    if row.is_duplicate {
        line.push_str(" (duplicate)");
    }
    line
}

fn run_scan(args: ScanArgs, config: &AppConfig) -> Result<()> {
    let text = read_ocr_text(&args)?;
    let pipeline = Pipeline::from_config(config)?.with_fuzzy(config.use_fuzzy || args.fuzzy);

    let rows = pipeline.process(&text, args.allow_duplicates);
    if rows.is_empty() {
        log::info!("No known items found");
        return Ok(());
    }
    for row in &rows {
        println!("{}", describe(row));
    }

    if args.dry_run {
        log::info!("Dry run, nothing written");
        return Ok(());
    }
    let records = pipeline.persist(&rows, args.allow_duplicates)?;
    if !records.is_empty() {
        log::info!("Logged record(s) {:?}", records);
    }
    Ok(())
}

fn run_list(args: ListArgs, config: &AppConfig) -> Result<()> {
    let entries = LootLog::new(config.log_path()).read()?;
    let skip = args
        .last
        .map_or(0, |n| entries.len().saturating_sub(n));

    println!("{}", LOG_HEADER);
    for entry in &entries[skip..] {
        println!("{}", entry.to_line());
    }
    Ok(())
}

fn run_edit(args: EditArgs, config: &AppConfig) -> Result<()> {
    let log = LootLog::new(config.log_path());
    if !log.update(args.record, &args.column, &args.value)? {
        return Err(anyhow!("Record {} not found", args.record));
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, config: &AppConfig) -> Result<()> {
    let log = LootLog::new(config.log_path());
    if !log.delete(args.record)? {
        return Err(anyhow!("Record {} not found", args.record));
    }
    Ok(())
}

fn run_summary(args: SummaryArgs, config: &AppConfig) -> Result<()> {
    let entries = LootLog::new(config.log_path()).read()?;
    let summary = LogSummary::from_entries(&entries);

    println!("Records: {}", summary.total_records);
    println!("Flagged duplicates: {}", summary.duplicates_flagged);
    if let (Some(first), Some(last)) = (&summary.first_time, &summary.last_time) {
        println!("Span: {} .. {}", first, last);
    }
    for (column, count) in summary.categories.iter().filter(|(_, n)| **n > 0) {
        println!("  {}: {}", column, count);
    }
    for (value, total) in &summary.stacks {
        println!("  {} x{}", value, total);
    }

    if let Some(path) = &args.json {
        export_to_json(&summary, path)?;
        log::info!("Summary written to {}", path.display());
    }
    Ok(())
}

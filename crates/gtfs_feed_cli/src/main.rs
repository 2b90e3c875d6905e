use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;
use tracing::{info, Level};

use gtfs_feed_core::{DirectorySource, Feed, FeedLoader, LoadOptions, LoadReport};

#[derive(Debug, Parser)]
#[command(name = "gtfs-feed")]
#[command(about = "Load a GTFS feed directory and summarize its tables")]
struct Args {
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Print the load report as JSON
    #[arg(long = "json")]
    json: bool,

    #[arg(long = "skip-stop-times", alias = "skip_stop_times")]
    skip_stop_times: bool,

    #[arg(long = "skip-optional-tables", alias = "skip_optional_tables")]
    skip_optional_tables: bool,

    /// List the services running on this date (YYYY-MM-DD or YYYYMMDD)
    #[arg(short = 'd', long = "date")]
    date: Option<String>,

    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    input: String,
    load_millis: u128,
    report: &'a LoadReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_services: Option<ActiveServices>,
}

#[derive(Debug, Serialize)]
struct ActiveServices {
    date: String,
    service_ids: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .init();

    let date = args.date.as_deref().map(parse_service_date).transpose()?;

    let options = LoadOptions::default()
        .read_stop_times(!args.skip_stop_times)
        .read_optional_tables(!args.skip_optional_tables);
    let source = DirectorySource::new(&args.input)
        .with_context(|| format!("cannot open feed at {}", args.input.display()))?;

    let started = Instant::now();
    let (feed, report) = FeedLoader::new(options)
        .load(&source)
        .with_context(|| format!("failed to load feed from {}", args.input.display()))?;
    let elapsed = started.elapsed();
    info!("feed {} loaded in {:?}", args.input.display(), elapsed);

    let summary = Summary {
        input: args.input.display().to_string(),
        load_millis: elapsed.as_millis(),
        report: &report,
        active_services: date.map(|date| active_services(&feed, date)),
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("serialize load report")?
        );
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn parse_service_date(value: &str) -> anyhow::Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("--date cannot be empty");
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y%m%d"))
        .with_context(|| format!("invalid --date {}", value))
}

fn active_services(feed: &Feed, date: NaiveDate) -> ActiveServices {
    let mut service_ids: Vec<String> = feed
        .calendars()
        .iter()
        .map(|calendar| calendar.service_id.as_str())
        .chain(
            feed.calendar_dates()
                .iter()
                .map(|exception| exception.service_id.as_str()),
        )
        .filter(|service_id| feed.service_runs_on(service_id, date))
        .map(str::to_string)
        .collect();
    service_ids.sort();
    service_ids.dedup();

    ActiveServices {
        date: date.format("%Y%m%d").to_string(),
        service_ids,
    }
}

fn print_summary(summary: &Summary<'_>) {
    println!("Feed: {} ({} ms)", summary.input, summary.load_millis);
    for table in &summary.report.tables {
        println!(
            "  {:<16} {:>8} records  {:?}",
            table.table, table.records_added, table.status
        );
    }
    println!("Total records: {}", summary.report.total_records());
    if let Some(active) = &summary.active_services {
        println!(
            "Services on {}: {}",
            active.date,
            active.service_ids.join(", ")
        );
    }
}

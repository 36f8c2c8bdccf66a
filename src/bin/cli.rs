//! sgcovid CLI
//!
//! Terminal front-end for the case pipeline:
//! - Clusters within a case-count range (with optional raw table)
//! - Gender breakdown for those clusters
//! - Top locations by nationality
//! - Density points and map midpoint
//! - Load summary and default config generation

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sgcovid::config::{generate_default_config, Config, DashboardConfig};
use sgcovid::pipeline::{CaseDataset, CountRange, DatasetCache, NationalityGroup};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sgcovid-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Explore Singapore Covid-19 case clusters from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Read cases from a local CSV instead of the configured source
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Maximum number of data rows to read
    #[arg(long, global = true)]
    pub max_rows: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Locations whose total case count is inside a range
    Clusters {
        /// Lower bound (inclusive)
        #[arg(long)]
        low: Option<u32>,
        /// Upper bound (inclusive)
        #[arg(long)]
        high: Option<u32>,
        /// Also print the raw data table
        #[arg(long)]
        raw: bool,
    },

    /// Gender breakdown for the locations inside a range
    Gender {
        #[arg(long)]
        low: Option<u32>,
        #[arg(long)]
        high: Option<u32>,
    },

    /// Top locations for Singaporeans or foreigners
    Nationality {
        /// singaporean or foreigners
        #[arg(short, long, default_value = "singaporean")]
        group: String,
        /// Number of rows (default: configured top N)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Density points and map midpoint
    Density,

    /// Load the dataset and print the load summary
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sgcovid=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing config to {:?}", path))?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path))?,
        None => Config::load_default().context("loading default config")?,
    };
    if let Some(file) = &cli.file {
        config.source.file = Some(file.clone());
    }
    if let Some(max_rows) = cli.max_rows {
        config.source.max_rows = max_rows;
    }

    let cache = DatasetCache::with_mapping(
        config.source.build_source()?,
        config.source.columns.clone(),
    );
    let dataset = cache.get_or_load(config.source.max_rows).await?;
    let dash = &config.dashboard;

    match cli.command {
        Commands::Clusters { low, high, raw } => {
            let range = resolve_range(low, high, dash)?;
            let rows = dataset.locations_in_range(range);

            if cli.format == OutputFormat::Json {
                return print_json(&rows);
            }

            println!("Clusters with total infected persons {}", range);
            if rows.is_empty() {
                println!(
                    "Based on the loaded dataset, there are no total number of people in this range."
                );
                return Ok(());
            }

            print_view(&rows);

            if raw {
                println!();
                println!(
                    "Raw data by total number of infected persons between {} and {}",
                    range.low, range.high
                );
                for row in &rows {
                    println!(
                        "{},{},{},{}",
                        row.location, row.latitude, row.longitude, row.numbers
                    );
                }
            }
        }

        Commands::Gender { low, high } => {
            let range = resolve_range(low, high, dash)?;
            let bars = dataset.gender_breakdown(range);

            if cli.format == OutputFormat::Json {
                return print_json(&bars);
            }

            println!(
                "Total number of infected persons between {} and {} based on gender",
                range.low, range.high
            );
            if bars.is_empty() {
                println!("No records in this range.");
            }
            for bar in &bars {
                println!("{:<10} {:>6}", bar.gender.to_string(), bar.count);
            }
        }

        Commands::Nationality { group, limit } => {
            let group: NationalityGroup = group.parse().map_err(anyhow::Error::msg)?;
            let rows = dataset.top_locations(group, limit.unwrap_or(dash.top_n));

            if cli.format == OutputFormat::Json {
                return print_json(&rows);
            }

            println!("Top locations: {}", group.label());
            if rows.is_empty() {
                println!("No records for this group.");
            }
            for row in &rows {
                println!("{:<40} {:>6}", row.location, row.numbers);
            }
        }

        Commands::Density => print_density(&dataset, cli.format)?,

        Commands::Status => {
            let report = dataset.report();

            if cli.format == OutputFormat::Json {
                return print_json(report);
            }

            println!("Source:               {}", cache.source_description());
            println!("Loaded at:            {}", dataset.loaded_at().to_rfc3339());
            println!("Rows read:            {}", report.rows_read);
            println!("Malformed rows:       {}", report.rows_malformed);
            println!("Missing coordinates:  {}", report.rows_missing_coordinates);
            println!("Records:              {}", report.records);
            println!("Locations:            {}", dataset.anchors().len());
        }

        Commands::Config { .. } => unreachable!("handled before loading"),
    }

    Ok(())
}

/// Fill missing bounds from the dashboard defaults and validate
fn resolve_range(
    low: Option<u32>,
    high: Option<u32>,
    dash: &DashboardConfig,
) -> anyhow::Result<CountRange> {
    let low = low.unwrap_or(dash.default_low);
    let high = high.unwrap_or(dash.default_high);

    let Some(range) = CountRange::new(low, high) else {
        bail!("--low ({}) must not exceed --high ({})", low, high);
    };
    if !dash.allows(range) {
        bail!(
            "range must lie within [{}, {}]",
            dash.range_min,
            dash.range_max
        );
    }
    Ok(range)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_view(rows: &[sgcovid::LocationViewRow]) {
    println!(
        "{:<40} {:>10} {:>11} {:>7}",
        "location", "latitude", "longitude", "numbers"
    );
    for row in rows {
        println!(
            "{:<40} {:>10.5} {:>11.5} {:>7}",
            row.location, row.latitude, row.longitude, row.numbers
        );
    }
}

fn print_density(dataset: &Arc<CaseDataset>, format: OutputFormat) -> anyhow::Result<()> {
    let points = dataset.density_points();
    let midpoint = dataset.centroid();

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "points": points,
            "midpoint": midpoint,
        }));
    }

    match midpoint {
        Some(c) => println!("Midpoint: {:.5}, {:.5}", c.latitude, c.longitude),
        None => println!("Midpoint: n/a (no locations loaded)"),
    }
    println!("{} density points", points.len());
    Ok(())
}

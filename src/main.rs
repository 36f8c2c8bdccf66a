//! sgcovid API Server
//!
//! Run with: cargo run --bin sgcovid -- --config config.toml
//!
//! Without `--config` the default locations are searched
//! (see [`Config::load_default`]); `SGCOVID_*` environment variables
//! override file values and `RUST_LOG` overrides the log level.

use anyhow::Context;
use clap::Parser;
use sgcovid::api::{serve, AppState};
use sgcovid::config::{Config, LoggingConfig};
use sgcovid::pipeline::DatasetCache;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sgcovid")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serve the Singapore Covid-19 cluster dashboard API")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Load the dataset before accepting requests
    #[arg(long)]
    preload: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The configured subscriber depends on the config, so loading logs go
    // through a stderr subscriber scoped to this call.
    let config = tracing::subscriber::with_default(bootstrap_subscriber(), || {
        load_config(args.config.as_deref())
    })?;

    init_tracing(&config.logging)?;

    tracing::info!("Starting sgcovid API server v{}", env!("CARGO_PKG_VERSION"));

    let source = config
        .source
        .build_source()
        .context("building case data source")?;
    tracing::info!("Case data source: {}", source.describe());
    tracing::info!("Row cap: {}", config.source.max_rows);

    let cache = Arc::new(DatasetCache::with_mapping(
        source,
        config.source.columns.clone(),
    ));

    if args.preload {
        tracing::info!("Preloading dataset...");
        let dataset = cache.get_or_load(config.source.max_rows).await?;
        tracing::info!(
            records = dataset.records().len(),
            locations = dataset.anchors().len(),
            "Dataset preloaded"
        );
    }

    let state = AppState::new(cache, config.source.max_rows, config.dashboard.clone());

    tracing::info!("Starting server on {}:{}", config.api.host, config.api.port);
    serve(state, &config.api).await?;

    tracing::info!("sgcovid API server stopped");
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path)),
        None => Config::load_default().context("loading default config"),
    }
}

fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sgcovid=info".into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

/// Install the global subscriber described by `[logging]`
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("sgcovid={},tower_http=debug", logging.level).into()
    });

    let writer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path))?;
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(Arc::new(file))
        }
        None => tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout),
    };

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nmax_rows = 100").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.source.max_rows, 100);
    }

    #[test]
    fn test_invalid_config_file_fails_startup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nmax_rows = 0").unwrap();

        let err = tracing::subscriber::with_default(bootstrap_subscriber(), || {
            load_config(Some(file.path()))
        })
        .unwrap_err();
        assert!(err.to_string().contains("loading config"));
    }
}

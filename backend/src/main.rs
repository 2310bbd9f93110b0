use std::fs;

use anyhow::{Context, Result};
use fuel_station_backend::domain::seed_data;
use fuel_station_backend::domain::ReportService;
use fuel_station_backend::Backend;
use shared::{ExportFormat, ReportDataset, ReportRequest, ReportType, StationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable naming an optional YAML config file
const CONFIG_ENV: &str = "FUEL_STATION_CONFIG";

fn load_config() -> Result<StationConfig> {
    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            let contents =
                fs::read_to_string(&path).with_context(|| format!("Failed to read config file {}", path))?;
            serde_yaml::from_str::<StationConfig>(&contents)
                .with_context(|| format!("Failed to parse config file {}", path))?
        }
        Err(_) => {
            info!("{} not set, using default configuration", CONFIG_ENV);
            StationConfig::default()
        }
    };
    config.validate().context("Invalid station configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    let backend = Backend::with_seed_data(config).context("Failed to load demo data")?;

    let today = seed_data::seed_date();
    let dashboard = backend.dashboard(today);
    println!("{}", serde_json::to_string_pretty(&dashboard)?);

    let request = ReportRequest {
        range: ReportService::default_range(today),
        report_type: ReportType::Daily,
    };
    let report = backend.report(&request);
    println!("{}", serde_json::to_string_pretty(&report)?);

    let export = backend.export(&request, ReportDataset::Expenses, ExportFormat::Csv, today);
    info!("Prepared {} with {} rows", export.file_name, export.rows.len());
    println!("{}", serde_json::to_string_pretty(&export)?);

    Ok(())
}

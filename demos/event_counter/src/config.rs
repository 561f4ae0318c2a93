// demos/event_counter/src/config.rs

use crate::errors::{AppError, Result};
use algokernel::KernelConfig;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
  /// Where the run summary goes (the kernel's default output).
  pub output: PathBuf,
  /// Optional file for the per-bin histogram.
  pub histogram_output: Option<PathBuf>,

  /// Records below this energy are vetoed for the rest of their tick.
  pub threshold: f64,

  // Histogram layout
  pub bins: usize,
  pub min_energy: f64,
  pub max_energy: f64,

  pub kernel: KernelConfig,
}

impl AppConfig {
  /// Reads `EVENT_COUNTER_*` variables (after loading `.env` if present) plus
  /// the kernel's own `ALGOKERNEL_*` variables.
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let output = env::var("EVENT_COUNTER_OUTPUT").unwrap_or_else(|_| "summary.txt".to_string());
    let histogram_output = env::var("EVENT_COUNTER_HISTOGRAM").ok().map(PathBuf::from);
    let threshold = parse_or("EVENT_COUNTER_THRESHOLD", 0.0)?;
    let bins = parse_or("EVENT_COUNTER_BINS", 10usize)?;
    let min_energy = parse_or("EVENT_COUNTER_MIN_ENERGY", 0.0)?;
    let max_energy = parse_or("EVENT_COUNTER_MAX_ENERGY", 100.0)?;
    let kernel = KernelConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;

    let config = Self {
      output: PathBuf::from(output),
      histogram_output,
      threshold,
      bins,
      min_energy,
      max_energy,
      kernel,
    };
    config.validate()?;
    tracing::info!("Application configuration loaded successfully.");
    tracing::debug!(?config, "Loaded config details");
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if self.bins == 0 {
      return Err(AppError::Config("bin count must be at least 1".to_string()));
    }
    if !(self.max_energy > self.min_energy) {
      return Err(AppError::Config(format!(
        "energy range is empty: [{}, {})",
        self.min_energy, self.max_energy
      )));
    }
    Ok(())
  }
}

fn parse_or<T>(var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(var_name) {
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e))),
    Err(_) => Ok(default),
  }
}

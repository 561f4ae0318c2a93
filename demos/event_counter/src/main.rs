// demos/event_counter/src/main.rs

mod app;
mod config;
mod errors;
mod stages;

use crate::config::AppConfig;
use crate::errors::Result as AppResult;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

/// Counts and histograms `<channel> <energy>` events read from text files.
#[derive(Parser, Debug)]
#[command(name = "event_counter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run the event counting kernel over one or more input files", long_about = None)]
struct Cli {
  /// Input files, read in order
  #[arg(value_name = "INPUT", required = true)]
  inputs: Vec<String>,

  /// Summary file (overrides EVENT_COUNTER_OUTPUT)
  #[arg(long = "output", short = 'o')]
  output: Option<PathBuf>,

  /// Histogram file (overrides EVENT_COUNTER_HISTOGRAM)
  #[arg(long = "histogram")]
  histogram: Option<PathBuf>,

  /// Minimum accepted energy (overrides EVENT_COUNTER_THRESHOLD)
  #[arg(long = "threshold", short = 't')]
  threshold: Option<f64>,

  /// Stop after this many ticks (overrides ALGOKERNEL_MAX_TICKS)
  #[arg(long = "max-ticks")]
  max_ticks: Option<u64>,
}

impl Cli {
  fn apply(self, mut config: AppConfig) -> AppResult<(AppConfig, Vec<String>)> {
    if let Some(output) = self.output {
      config.output = output;
    }
    if let Some(histogram) = self.histogram {
      config.histogram_output = Some(histogram);
    }
    if let Some(threshold) = self.threshold {
      config.threshold = threshold;
    }
    if let Some(max_ticks) = self.max_ticks {
      config.kernel.max_ticks = Some(max_ticks);
    }
    config.validate()?;
    Ok((config, self.inputs))
  }
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  let cli = Cli::parse();

  let result = AppConfig::from_env()
    .and_then(|config| cli.apply(config))
    .and_then(|(config, inputs)| app::run(&config, &inputs));

  match result {
    Ok((summary, totals)) => {
      tracing::info!(
        outcome = ?summary.outcome,
        ticks = summary.ticks,
        events = totals.events,
        accepted = totals.accepted,
        rejected = totals.rejected,
        "event_counter finished."
      );
      ExitCode::SUCCESS
    }
    Err(e) => {
      tracing::error!(error = %e, "event_counter failed.");
      ExitCode::FAILURE
    }
  }
}

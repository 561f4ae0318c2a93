// demos/event_counter/src/app.rs

use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::AppError;
use crate::stages::{
  Binning, EnergyHistogram, LineReader, Summary, ThresholdCounter, Totals, TotalsReport, HISTOGRAM_OUTPUT,
};

use algokernel::{Kernel, RunSummary};
use tracing::{event, instrument, Level};

/// Registers the stages in execution order: the reader first, the threshold
/// veto next, so the histogram and summary only see accepted events.
/// `report` receives the totals when the summary finalizes.
pub fn build_kernel(config: &AppConfig, report: &TotalsReport) -> Result<Kernel> {
  let mut kernel = Kernel::with_config(config.kernel.clone());

  kernel.add_tool(Binning::new(config.bins, config.min_energy, config.max_energy));
  kernel.add_alg(LineReader::new());
  kernel.add_alg(ThresholdCounter::stage(config.threshold));
  kernel.add_alg(EnergyHistogram::stage());
  kernel.add_alg(Summary::new(report));

  kernel.open_default_output(&config.output)?;
  if let Some(path) = &config.histogram_output {
    kernel.open_output(path, HISTOGRAM_OUTPUT, false)?;
  }
  Ok(kernel)
}

/// Builds and runs the kernel over `inputs`, returning the loop summary and
/// the event totals.
#[instrument(name = "event_counter::run", skip_all, fields(num_inputs = inputs.len()), err(Display))]
pub fn run(config: &AppConfig, inputs: &[String]) -> Result<(RunSummary, Totals)> {
  let report = TotalsReport::default();
  let mut kernel = build_kernel(config, &report)?;

  let summary = kernel.run(inputs.iter().cloned())?;
  let totals = report
    .lock()
    .take()
    .ok_or_else(|| AppError::Internal("summary finished without reporting totals".to_string()))?;

  event!(
    Level::INFO,
    ticks = summary.ticks,
    skipped = summary.skipped_ticks,
    events = totals.events,
    accepted = totals.accepted,
    "Run complete."
  );
  Ok((summary, totals))
}

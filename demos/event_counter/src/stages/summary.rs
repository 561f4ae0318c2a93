// demos/event_counter/src/stages/summary.rs

use super::histogram::HistogramStage;
use super::reader::LineReader;
use super::threshold::ThresholdStage;
use algokernel::{
  Algorithm, Kernel, KernelError, KernelResult, RecordSource, Stage, StageRef, Status, DEFAULT_OUTPUT,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Counts the ticks that got past every veto and writes the run totals to
/// the current output when the run finalizes. The same totals are published
/// to the shared report, which outlives the kernel's stages.
#[derive(Default)]
pub struct Summary {
  reader: Option<StageRef<LineReader>>,
  threshold: Option<StageRef<ThresholdStage>>,
  histogram: Option<StageRef<HistogramStage>>,
  reached: u64,
  report: TotalsReport,
}

/// Filled by `Summary` at finalize; `None` if the run never got there.
pub type TotalsReport = Arc<Mutex<Option<Totals>>>;

/// Totals reported by `Summary`, also returned to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
  pub events: u64,
  pub accepted: u64,
  pub rejected: u64,
  pub histogram_entries: u64,
  pub reached_end: u64,
}

impl Summary {
  pub fn new(report: &TotalsReport) -> Self {
    Self {
      report: Arc::clone(report),
      ..Self::default()
    }
  }

  pub fn totals(&self) -> Totals {
    let mut totals = Totals {
      reached_end: self.reached,
      ..Totals::default()
    };
    if let Some(reader) = &self.reader {
      totals.events = reader.read().events_read();
    }
    if let Some(threshold) = &self.threshold {
      let threshold = threshold.read();
      totals.accepted = threshold.handler().accepted();
      totals.rejected = threshold.handler().rejected();
    }
    if let Some(histogram) = &self.histogram {
      totals.histogram_entries = histogram.read().handler().entries();
    }
    totals
  }
}

impl Stage for Summary {
  fn name(&self) -> &str {
    "summary"
  }

  fn connect(&mut self, kernel: &Kernel) -> KernelResult<()> {
    self.reader = Some(kernel.find_alg::<LineReader>()?);
    self.threshold = Some(kernel.find_alg::<ThresholdStage>()?);
    self.histogram = Some(kernel.find_alg::<HistogramStage>()?);
    Ok(())
  }
}

impl Algorithm for Summary {
  fn execute(&mut self) -> KernelResult<Status> {
    if self.reader.as_ref().is_some_and(|r| r.read().ready()) {
      self.reached += 1;
    }
    Ok(Status::Continue)
  }

  fn finalize(&mut self, kernel: &Kernel) -> KernelResult<()> {
    let output = kernel.current_output().ok_or_else(|| KernelError::OutputNotOpen {
      name: DEFAULT_OUTPUT.to_string(),
    })?;
    let totals = self.totals();
    output.write_record(&format!("events {}", totals.events))?;
    output.write_record(&format!("accepted {}", totals.accepted))?;
    output.write_record(&format!("rejected {}", totals.rejected))?;
    output.write_record(&format!("histogram_entries {}", totals.histogram_entries))?;
    output.write_record(&format!("reached_end {}", totals.reached_end))?;
    *self.report.lock() = Some(totals);
    Ok(())
  }
}

// demos/event_counter/src/stages/histogram.rs

use super::binning::Binning;
use super::reader::{Event, LineReader};
use algokernel::{Consume, Consumer, Kernel, KernelError, KernelResult, StageRef, Status};
use tracing::{event, Level};

/// Name of the optional output the histogram is written to.
pub const HISTOGRAM_OUTPUT: &str = "histogram";

/// Fills a histogram of event energies using the shared `Binning` layout.
#[derive(Debug, Default)]
pub struct EnergyHistogram {
  binning: Option<StageRef<Binning>>,
  counts: Vec<u64>,
  underflow: u64,
  overflow: u64,
}

pub type HistogramStage = Consumer<LineReader, EnergyHistogram>;

impl EnergyHistogram {
  pub fn stage() -> HistogramStage {
    Consumer::new(Self::default()).with_name("energy_histogram")
  }

  pub fn entries(&self) -> u64 {
    self.counts.iter().sum::<u64>() + self.underflow + self.overflow
  }
}

impl Consume<LineReader> for EnergyHistogram {
  fn connect(&mut self, kernel: &Kernel) -> KernelResult<()> {
    let binning = kernel.find_tool::<Binning>()?;
    self.counts = vec![0; binning.read().bins()];
    self.binning = Some(binning);
    Ok(())
  }

  fn consume(&mut self, event: &Event) -> KernelResult<Status> {
    let binning = self
      .binning
      .as_ref()
      .ok_or_else(|| KernelError::Internal("histogram used before connect".to_string()))?;
    match binning.read().bin_of(event.energy) {
      Some(index) => self.counts[index] += 1,
      None if event.energy < binning.read().edges(0).0 => self.underflow += 1,
      None => self.overflow += 1,
    }
    Ok(Status::Continue)
  }

  fn finalize(&mut self, kernel: &Kernel) -> KernelResult<()> {
    // Only written when the caller opened the output.
    let (Some(binning), Ok(output)) = (&self.binning, kernel.output(HISTOGRAM_OUTPUT)) else {
      return Ok(());
    };
    let binning = binning.read();
    output.write_record("# low high count")?;
    for (index, count) in self.counts.iter().enumerate() {
      let (low, high) = binning.edges(index);
      output.write_record(&format!("{} {} {}", low, high, count))?;
    }
    event!(Level::DEBUG, bins = self.counts.len(), "Histogram written.");
    Ok(())
  }
}

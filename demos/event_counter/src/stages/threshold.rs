// demos/event_counter/src/stages/threshold.rs

use super::reader::{Event, LineReader};
use algokernel::{Consume, Consumer, KernelResult, Status};

/// Vetoes the rest of the tick for events below the energy threshold, so
/// algorithms registered after it only see accepted events.
#[derive(Debug)]
pub struct ThresholdCounter {
  threshold: f64,
  accepted: u64,
  rejected: u64,
}

pub type ThresholdStage = Consumer<LineReader, ThresholdCounter>;

impl ThresholdCounter {
  pub fn new(threshold: f64) -> Self {
    Self {
      threshold,
      accepted: 0,
      rejected: 0,
    }
  }

  pub fn stage(threshold: f64) -> ThresholdStage {
    Consumer::new(Self::new(threshold)).with_name("threshold")
  }

  pub fn accepted(&self) -> u64 {
    self.accepted
  }

  pub fn rejected(&self) -> u64 {
    self.rejected
  }
}

impl Consume<LineReader> for ThresholdCounter {
  fn consume(&mut self, event: &Event) -> KernelResult<Status> {
    let below = event.energy < self.threshold;
    if below {
      self.rejected += 1;
    } else {
      self.accepted += 1;
    }
    Ok(Status::skip_if(below))
  }
}

// demos/event_counter/src/stages/binning.rs

use algokernel::{Stage, Tool};

/// Shared histogram layout: `bins` equal-width bins over `[min, max)`.
#[derive(Debug, Clone)]
pub struct Binning {
  bins: usize,
  min: f64,
  max: f64,
}

impl Binning {
  pub fn new(bins: usize, min: f64, max: f64) -> Self {
    Self { bins, min, max }
  }

  pub fn bins(&self) -> usize {
    self.bins
  }

  fn width(&self) -> f64 {
    (self.max - self.min) / self.bins as f64
  }

  /// Bin index for `value`, or `None` for under/overflow.
  pub fn bin_of(&self, value: f64) -> Option<usize> {
    if !(value >= self.min && value < self.max) {
      return None;
    }
    let index = ((value - self.min) / self.width()) as usize;
    // Rounding can push values just below `max` into a bin past the end.
    Some(index.min(self.bins - 1))
  }

  /// Lower and upper edge of bin `index`.
  pub fn edges(&self, index: usize) -> (f64, f64) {
    let low = self.min + self.width() * index as f64;
    (low, low + self.width())
  }
}

impl Stage for Binning {
  fn name(&self) -> &str {
    "binning"
  }
}

impl Tool for Binning {}

// algokernel/src/consumer/source.rs

use crate::core::stage::Algorithm;

/// A data-source algorithm exposing the record it produced this tick.
pub trait RecordSource: Algorithm {
  type Record: Send + Sync + 'static;

  /// True when `record` holds data produced during the current tick.
  fn ready(&self) -> bool;

  /// The most recent record. Only meaningful while `ready` is true.
  fn record(&self) -> &Self::Record;
}

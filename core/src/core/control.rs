// algokernel/src/core/control.rs

//! Defines the per-tick signal returned by algorithms and the outcome of a full run.

/// Signal from an algorithm's `execute` telling the kernel how to proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
  /// Proceed to the next algorithm in this tick.
  Continue,
  /// Abort the remainder of this tick. No further algorithms execute until the
  /// next tick, which starts again at the first registered algorithm.
  ///
  /// This is global to the tick: it also starves every algorithm registered
  /// after the one that returned it, data source or not.
  SkipRestOfTick,
  /// The algorithm has no more data. A data source returning this is removed
  /// from the active set and stays inert for the rest of the run; the current
  /// tick continues with the next algorithm.
  Exhausted,
}

impl Status {
  /// `SkipRestOfTick` when `veto` holds, `Continue` otherwise.
  pub fn skip_if(veto: bool) -> Self {
    if veto {
      Status::SkipRestOfTick
    } else {
      Status::Continue
    }
  }
}

/// Why the execution loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
  /// Every data source reported `Exhausted`.
  SourcesExhausted,
  /// `KernelConfig::max_ticks` was reached while sources were still active.
  TickLimitReached,
}

/// Counters collected over one `Kernel::run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
  pub outcome: RunOutcome,
  /// Ticks started, including ones cut short by `SkipRestOfTick`.
  pub ticks: u64,
  /// Ticks aborted by `SkipRestOfTick`.
  pub skipped_ticks: u64,
  /// Total `execute` calls across all algorithms.
  pub executions: u64,
  /// Names of the data sources in the order they reported `Exhausted`.
  pub exhausted_sources: Vec<String>,
}

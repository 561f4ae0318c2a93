// algokernel/src/kernel/config.rs

use crate::error::{KernelError, KernelResult};
use std::env;

pub const MAX_TICKS_ENV: &str = "ALGOKERNEL_MAX_TICKS";
pub const PROGRESS_INTERVAL_ENV: &str = "ALGOKERNEL_PROGRESS_INTERVAL";

/// Run-time knobs of a `Kernel`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KernelConfig {
  /// Stop the execution loop after this many ticks even if data sources are
  /// still active. `None` runs until every source is exhausted (forever, if
  /// none is registered).
  pub max_ticks: Option<u64>,
  /// Emit an INFO progress event every this many ticks.
  pub progress_interval: Option<u64>,
}

impl KernelConfig {
  pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
    self.max_ticks = Some(max_ticks);
    self
  }

  pub fn with_progress_interval(mut self, interval: u64) -> Self {
    self.progress_interval = Some(interval);
    self
  }

  /// Reads `ALGOKERNEL_MAX_TICKS` and `ALGOKERNEL_PROGRESS_INTERVAL`.
  /// Unset variables keep their defaults; unparsable ones are an error.
  pub fn from_env() -> KernelResult<Self> {
    let config = Self {
      max_ticks: read_u64(MAX_TICKS_ENV)?,
      progress_interval: read_u64(PROGRESS_INTERVAL_ENV)?,
    };
    tracing::debug!(?config, "Kernel configuration loaded from environment.");
    Ok(config)
  }
}

fn read_u64(var_name: &str) -> KernelResult<Option<u64>> {
  match env::var(var_name) {
    Ok(raw) => raw
      .trim()
      .parse::<u64>()
      .map(Some)
      .map_err(|e| KernelError::Configuration(format!("Invalid {} value '{}': {}", var_name, raw, e))),
    Err(env::VarError::NotPresent) => Ok(None),
    Err(e) => Err(KernelError::Configuration(format!("Unreadable {}: {}", var_name, e))),
  }
}

// algokernel/src/error.rs
use anyhow::Error as AnyhowError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
  /// A lookup matched nothing. Lookups express mandatory wiring, so this is fatal.
  #[error("No {registry} of type {capability} is registered{detail}")]
  NotFound {
    registry: &'static str,
    capability: &'static str,
    detail: String,
  },

  #[error("Output '{name}' is already open")]
  AlreadyOpen { name: String },

  #[error("Output '{name}' is not open")]
  OutputNotOpen { name: String },

  #[error("Stage '{stage}' does not support '{operation}'")]
  UnsupportedOperation { stage: String, operation: &'static str },

  #[error("Input index {index} is out of range ({count} inputs configured)")]
  InputOutOfRange { index: usize, count: usize },

  #[error("Output '{name}' was closed")]
  ResourceClosed { name: String },

  #[error("I/O failure on '{}': {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Cannot {operation} while the kernel is in phase {phase}")]
  InvalidPhase { operation: &'static str, phase: String },

  #[error("Stage '{stage}' failed during {phase}. Source: {source}")]
  StageFailure {
    stage: String,
    phase: &'static str,
    #[source]
    source: AnyhowError,
  },

  #[error("Error in user-provided stage code. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Configuration error: {0}")]
  Configuration(String),

  #[error("Internal algokernel error: {0}")]
  Internal(String),
}

impl KernelError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    KernelError::Io {
      path: path.into(),
      source,
    }
  }

  /// True for lookup failures, whichever registry they came from.
  pub fn is_not_found(&self) -> bool {
    matches!(self, KernelError::NotFound { .. })
  }
}

// Lets stage code use `?` on anyhow results.
impl From<AnyhowError> for KernelError {
  fn from(err: AnyhowError) -> Self {
    // Avoid KernelError(HandlerError(KernelError(...))) when stage code
    // round-tripped one of our own errors through anyhow.
    match err.downcast::<KernelError>() {
      Ok(kernel_err) => kernel_err,
      Err(source) => KernelError::HandlerError { source },
    }
  }
}

pub type KernelResult<T, E = KernelError> = std::result::Result<T, E>;

// demos/event_counter/src/errors.rs

use algokernel::KernelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Kernel Error: {source}")]
  Kernel {
    #[from]
    source: KernelError,
  },

  #[error("Internal Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<KernelError>() {
      Ok(source) => AppError::Kernel { source },
      Err(other) => AppError::Internal(format!("{:#}", other)),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

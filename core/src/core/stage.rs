// algokernel/src/core/stage.rs

//! The contracts shared by everything a `Kernel` owns.
//!
//! A *stage* is either an `Algorithm` (executed once per tick) or a `Tool`
//! (never executed, only looked up and used by algorithms). Stages never hold
//! each other directly at construction time; they resolve one another through
//! the kernel during `connect`.

use std::any::Any;

use crate::core::control::Status;
use crate::error::{KernelError, KernelResult};
use crate::kernel::Kernel;

/// Common contract of algorithms and tools.
pub trait Stage: Any + Send + Sync {
  /// Human-readable name used in logs and errors. Defaults to the type name.
  fn name(&self) -> &str {
    std::any::type_name::<Self>()
  }

  /// Invoked once, after every stage has been registered and loaded.
  ///
  /// This is where stages call `Kernel::find_*` to resolve their
  /// dependencies. A failed lookup aborts the run before any tick executes.
  fn connect(&mut self, _kernel: &Kernel) -> KernelResult<()> {
    Ok(())
  }

  /// Optional integer identity used by tag lookups. `None` never matches a tag.
  fn tag(&self) -> Option<i64> {
    None
  }
}

/// A helper object shared between algorithms. Has no execution semantics.
pub trait Tool: Stage {}

/// A processing unit driven by the kernel's execution loop.
pub trait Algorithm: Stage {
  /// Invoked once, before `connect`, with every configured input path.
  fn load(&mut self, _input_paths: &[String]) -> KernelResult<()> {
    Ok(())
  }

  /// One unit of work, called once per tick.
  fn execute(&mut self) -> KernelResult<Status>;

  /// Invoked once after the execution loop ends.
  fn finalize(&mut self, _kernel: &Kernel) -> KernelResult<()> {
    Ok(())
  }

  /// Data sources drive iteration: the loop ends once all of them are exhausted.
  /// Read once, at registration.
  fn is_data_source(&self) -> bool {
    false
  }
}

/// Returns the stage's tag or `UnsupportedOperation` if it does not take part
/// in tag-based identification.
pub fn require_tag<S: Stage + ?Sized>(stage: &S) -> KernelResult<i64> {
  stage.tag().ok_or_else(|| KernelError::UnsupportedOperation {
    stage: stage.name().to_string(),
    operation: "tag",
  })
}

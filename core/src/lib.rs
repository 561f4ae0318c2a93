// src/lib.rs

//! algokernel: a synchronous, in-process kernel for tick-driven processing.
//!
//! A `Kernel` owns a fixed set of algorithms and shared tools and runs them
//! through one deterministic lifecycle:
//!  - **load**: every algorithm sees the full list of input paths.
//!  - **connect**: algorithms, then tools, resolve their dependencies by type
//!    (optionally refined by a predicate or a tag) through the kernel.
//!  - **run**: ticks repeat over the algorithms in registration order until
//!    every data source has reported `Status::Exhausted`.
//!  - **finalize**: every algorithm gets a last call, with the default output
//!    made current.
//!  - **teardown**: stages are released first, outputs are closed last.
//!
//! Shared inputs and named outputs live in a `ResourceManager` reachable from
//! any hook through the kernel.

pub mod consumer;
pub mod core;
pub mod error;
pub mod kernel;
pub mod registry;
pub mod resources;

// --- Re-exports for the Public API ---

pub use crate::core::control::{RunOutcome, RunSummary, Status};
pub use crate::core::stage::{require_tag, Algorithm, Stage, Tool};
pub use crate::core::stage_ref::{StageId, StageReadGuard, StageRef, StageWriteGuard};

pub use crate::consumer::{Consume, Consumer, FnConsume, RecordSource};

pub use crate::error::{KernelError, KernelResult};

pub use crate::kernel::{Kernel, KernelConfig, Phase};

pub use crate::registry::Registry;
pub use crate::resources::{InputResource, OutputResource, ResourceManager, DEFAULT_OUTPUT};

/*
    Typical wiring:
    1. Implement `Algorithm` for each processing unit; mark producers with
       `is_data_source() -> true` and return `Status::Exhausted` when done.
    2. Implement `Tool` for shared helpers.
    3. `let mut kernel = Kernel::new();` then `add_tool` / `add_alg` in the
       order the algorithms must execute.
    4. In `connect`, call `kernel.find_alg::<Upstream>()?` or
       `kernel.find_tool::<Helper>()?` and keep the returned `StageRef`.
    5. `kernel.run(input_paths)?` returns a `RunSummary`.
*/

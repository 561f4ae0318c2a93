pub mod control;
pub mod stage;
pub mod stage_ref;

// Re-export key types for easier access from other modules (and lib.rs)
pub use control::{RunOutcome, RunSummary, Status};
pub use stage::{require_tag, Algorithm, Stage, Tool};
pub use stage_ref::{StageId, StageReadGuard, StageRef, StageWriteGuard};

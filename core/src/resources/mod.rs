// algokernel/src/resources/mod.rs

//! Input and output resources shared by every stage of a run.
//!
//! Inputs are opened lazily by index and cached by path. Outputs are opened by
//! name, at most one per name, and stay open until the kernel has released
//! every stage.

pub mod handle;
pub mod manager;

pub use handle::{InputResource, OutputResource};
pub use manager::{ResourceManager, DEFAULT_OUTPUT};

// algokernel/src/kernel/mod.rs

//! Defines the `Kernel`: stage registration and lookup, shared resources, and
//! the phased run (load, connect, tick loop, finalize, teardown).

pub mod config;
pub mod definition;
pub mod execution;

pub use config::KernelConfig;
pub use definition::{Kernel, Phase};

// algokernel/src/consumer/mod.rs

//! Building blocks for algorithms that consume the records of one upstream
//! data source.
//!
//! A `Consumer` looks its source up during `connect` and, on every tick the
//! source has a fresh record, hands that record to its `Consume`
//! implementation. On ticks without a record it just returns `Continue`.
//! It adds no scheduling behavior of its own.

pub mod adapter;
pub mod source;

pub use adapter::{Consume, Consumer, FnConsume};
pub use source::RecordSource;

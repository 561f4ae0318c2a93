// demos/event_counter/src/stages/mod.rs

pub mod binning;
pub mod histogram;
pub mod reader;
pub mod summary;
pub mod threshold;

pub use binning::Binning;
pub use histogram::{EnergyHistogram, HistogramStage, HISTOGRAM_OUTPUT};
pub use reader::LineReader;
pub use summary::{Summary, Totals, TotalsReport};
pub use threshold::{ThresholdCounter, ThresholdStage};

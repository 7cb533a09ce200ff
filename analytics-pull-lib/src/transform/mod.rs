//! Row classification and fan-out
//!
//! Turns the positional rows of a report page into flattened [`OutputRecord`]s:
//! each cell is normalized, each row is split into dimensions and metrics by
//! header membership, and each row is fanned out according to the configured
//! [`EmissionMode`].

mod classify;
mod fanout;
mod normalize;

pub use classify::{ClassifiedRow, Entry, classify};
pub use fanout::{EmissionMode, NAMESPACE_PREFIX, OutputRecord, RecordMetrics, TransformOptions, expand, strip_namespace};
pub use normalize::{CellValue, normalize};

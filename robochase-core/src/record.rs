//! Types and traits for diagnostic records.
//!
//! Environments return a [`Record`] from every `reset` and `step` call.
//! It is a free-form key-value container: consumers may log it, buffer it with a
//! [`Recorder`] or ignore it. Keys are not part of any stable API.
//!
//! ```rust
//! use robochase_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("step", RecordValue::Scalar(1.0));
//! record.insert("reward", RecordValue::Scalar(-100.0));
//! record.insert("velocity", RecordValue::Array1(vec![2.0, 2.0]));
//! assert_eq!(record.get_scalar("reward").unwrap(), -100.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;

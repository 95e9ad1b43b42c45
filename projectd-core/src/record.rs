//! Key-value records.
//!
//! A [`Record`] is the info mapping returned from `reset` and `step`, and the
//! container for values an environment wants logged alongside a step.
//!
//! ```rust
//! use projectd_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("step_id", RecordValue::Scalar(12.0));
//! record.insert("terminated_by", RecordValue::String("collision".to_string()));
//! record.insert("obs", RecordValue::Array1(vec![0.5, -0.25]));
//!
//! assert_eq!(record.get_scalar("step_id").unwrap(), 12.0);
//! ```
mod base;

pub use base::{Record, RecordValue};

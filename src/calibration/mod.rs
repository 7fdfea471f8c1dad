//! Camera-to-arm correspondence collection
//!
//! This module holds the interactive session that pairs detected targets
//! with arm poses, and the dataset those pairs are written to.

pub mod record;
pub mod session;

pub use record::{
    read_dataset, read_records, CorrespondenceRecord, DatasetFile, DatasetWriter, RecordSink,
};
pub use session::{CalibrationSession, PoseDims, SessionState, TriggerOutcome};

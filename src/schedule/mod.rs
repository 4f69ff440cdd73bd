//! Calendar generation and mutation.
//!
//! Everything here is synchronous and free of I/O; services own persistence.

pub mod generator;
pub mod mutator;
pub mod periodic;

use chrono::NaiveDate;
use thiserror::Error;

pub use generator::{MAX_STUDY_DAYS, ScheduleGenerator, study_days, validate_templates};
pub use mutator::ScheduleMutator;
pub use periodic::{PeriodicState, should_trigger};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid range: end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

pub(crate) fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), ScheduleError> {
    if end < start {
        return Err(ScheduleError::InvalidRange { start, end });
    }
    Ok(())
}

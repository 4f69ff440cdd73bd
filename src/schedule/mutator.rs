use chrono::NaiveDate;
use tracing::debug;

use crate::models::{Calendar, DailyTaskTemplate, PeriodicTaskTemplate};
use crate::schedule::generator::{MAX_STUDY_DAYS, ScheduleGenerator};
use crate::schedule::{ScheduleError, check_range};

/// Shrinks or grows an existing calendar.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleMutator {
    generator: ScheduleGenerator,
}

impl ScheduleMutator {
    pub fn new(generator: ScheduleGenerator) -> Self {
        Self { generator }
    }

    /// Deletes every day in `[start, end]`.
    ///
    /// Dates missing from the calendar are skipped, so repeating a removal is
    /// harmless. Returns the number of days actually deleted.
    pub fn remove_range(
        &self,
        calendar: &mut Calendar,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<usize, ScheduleError> {
        check_range(start, end)?;
        let removed = calendar.remove_between(start, end);
        debug!("removed {} days between {} and {}", removed, start, end);
        Ok(removed)
    }

    /// Builds every day in `[start, end]` and writes it into the calendar,
    /// overwriting days that already exist.
    ///
    /// The questionnaire cadence is anchored at `start`, so `start` itself
    /// always receives a questionnaire. Ranges longer than [`MAX_STUDY_DAYS`]
    /// are rejected.
    pub fn extend_range(
        &self,
        calendar: &mut Calendar,
        start: NaiveDate,
        end: NaiveDate,
        periodic: &PeriodicTaskTemplate,
        tasks: &[DailyTaskTemplate],
    ) -> Result<usize, ScheduleError> {
        check_range(start, end)?;
        let span = (end - start).num_days() + 1;
        let num_days = u32::try_from(span)
            .ok()
            .filter(|days| *days <= MAX_STUDY_DAYS)
            .ok_or_else(|| {
                ScheduleError::InvalidInput(format!(
                    "extension of {} days exceeds the {} day limit",
                    span, MAX_STUDY_DAYS
                ))
            })?;

        let written = self.generator.fill(calendar, start, num_days, tasks, periodic)?;
        debug!("extended calendar with {} days from {} to {}", written, start, end);
        Ok(written)
    }
}

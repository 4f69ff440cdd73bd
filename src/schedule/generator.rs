use std::collections::HashSet;

use chrono::{Days, FixedOffset, NaiveDate};
use tracing::debug;

use crate::models::{Calendar, CalendarDay, DailyTaskTemplate, PeriodicTaskTemplate, TaskTemplate};
use crate::schedule::ScheduleError;
use crate::schedule::periodic::{PeriodicState, should_trigger};

pub const MAX_TIME_FRAME_MONTHS: u32 = 12;

/// Longest span, in days, that a single generate or extend may produce.
pub const MAX_STUDY_DAYS: u32 = MAX_TIME_FRAME_MONTHS * 31 - 3;

/// Number of study days for an enrollment window of `months` months.
pub fn study_days(months: u32) -> Result<u32, ScheduleError> {
    if !(1..=MAX_TIME_FRAME_MONTHS).contains(&months) {
        return Err(ScheduleError::InvalidInput(format!(
            "time frame must be between 1 and {} months, got {}",
            MAX_TIME_FRAME_MONTHS, months
        )));
    }
    Ok(months * 31 - 3)
}

/// Builds calendars from task templates.
///
/// Due times are stamped in `offset`, the study site's UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleGenerator {
    offset: FixedOffset,
}

impl ScheduleGenerator {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn generate(
        &self,
        start: NaiveDate,
        num_days: u32,
        tasks: &[DailyTaskTemplate],
        periodic: &PeriodicTaskTemplate,
    ) -> Result<Calendar, ScheduleError> {
        let mut calendar = Calendar::new();
        self.fill(&mut calendar, start, num_days, tasks, periodic)?;
        debug!(
            "generated {} days from {} ({} questionnaire days)",
            calendar.len(),
            start,
            calendar.dates_with(&periodic.name).len()
        );
        Ok(calendar)
    }

    /// Writes `num_days` consecutive days starting at `start` into `calendar`,
    /// replacing any day already present. The questionnaire cadence restarts
    /// at `start`.
    pub(crate) fn fill(
        &self,
        calendar: &mut Calendar,
        start: NaiveDate,
        num_days: u32,
        tasks: &[DailyTaskTemplate],
        periodic: &PeriodicTaskTemplate,
    ) -> Result<usize, ScheduleError> {
        if num_days < 1 {
            return Err(ScheduleError::InvalidInput(
                "number of days must be at least 1".to_string(),
            ));
        }
        validate_templates(tasks, periodic)?;
        start
            .checked_add_days(Days::new(u64::from(num_days - 1)))
            .ok_or_else(|| {
                ScheduleError::InvalidInput(format!("{} days from {} is out of range", num_days, start))
            })?;

        let mut state = PeriodicState::fresh(periodic.frequency_days);
        for date in start.iter_days().take(num_days as usize) {
            let (questionnaire_due, next) = should_trigger(state);
            state = next;
            calendar.insert(date, self.build_day(date, tasks, periodic, questionnaire_due));
        }

        Ok(num_days as usize)
    }

    fn build_day(
        &self,
        date: NaiveDate,
        tasks: &[DailyTaskTemplate],
        periodic: &PeriodicTaskTemplate,
        questionnaire_due: bool,
    ) -> CalendarDay {
        let scheduled = tasks
            .iter()
            .map(TaskTemplate::Daily)
            .chain(questionnaire_due.then_some(TaskTemplate::Periodic(periodic)));

        let mut day = CalendarDay::new();
        for template in scheduled {
            day.insert(template.name(), template.instantiate(date, self.offset));
        }
        day
    }
}

pub fn validate_templates(
    tasks: &[DailyTaskTemplate],
    periodic: &PeriodicTaskTemplate,
) -> Result<(), ScheduleError> {
    if tasks.is_empty() {
        return Err(ScheduleError::InvalidInput(
            "at least one daily task is required".to_string(),
        ));
    }
    if periodic.frequency_days < 1 {
        return Err(ScheduleError::InvalidInput(
            "questionnaire frequency must be at least 1 day".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let names = tasks.iter().map(|t| t.name.as_str()).chain([periodic.name.as_str()]);
    for name in names {
        if name.trim().is_empty() {
            return Err(ScheduleError::InvalidInput("task names must not be empty".to_string()));
        }
        if !seen.insert(name) {
            return Err(ScheduleError::InvalidInput(format!("duplicate task name: {}", name)));
        }
    }

    Ok(())
}

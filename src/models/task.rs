use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub const QUESTIONNAIRE: &str = "Questionnaire";

/// A task scheduled on every day of the study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTaskTemplate {
    pub name: String,
    #[serde(default)]
    pub due_time_of_day: Option<NaiveTime>,
}

impl DailyTaskTemplate {
    pub fn new(name: impl Into<String>, due_time_of_day: Option<NaiveTime>) -> Self {
        Self {
            name: name.into(),
            due_time_of_day,
        }
    }
}

/// The questionnaire, scheduled every `frequency_days` days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicTaskTemplate {
    #[serde(default = "questionnaire_name")]
    pub name: String,
    pub frequency_days: u32,
    pub due_time_of_day: NaiveTime,
    pub link: String,
}

impl PeriodicTaskTemplate {
    pub fn questionnaire(frequency_days: u32, due_time_of_day: NaiveTime, link: impl Into<String>) -> Self {
        Self {
            name: questionnaire_name(),
            frequency_days,
            due_time_of_day,
            link: link.into(),
        }
    }
}

fn questionnaire_name() -> String {
    QUESTIONNAIRE.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskTemplate<'a> {
    Daily(&'a DailyTaskTemplate),
    Periodic(&'a PeriodicTaskTemplate),
}

impl TaskTemplate<'_> {
    pub fn name(&self) -> &str {
        match self {
            TaskTemplate::Daily(t) => &t.name,
            TaskTemplate::Periodic(t) => &t.name,
        }
    }

    /// Builds the occurrence of this template on `date`.
    ///
    /// Daily tasks without a time of day are due at midnight; the periodic
    /// task always carries its link.
    pub fn instantiate(&self, date: NaiveDate, offset: FixedOffset) -> TaskInstance {
        match self {
            TaskTemplate::Daily(t) => {
                let local = match t.due_time_of_day {
                    Some(time) => date.and_time(time),
                    None => NaiveDateTime::from(date),
                };
                TaskInstance::pending(Some(stamp(local, offset)), None)
            }
            TaskTemplate::Periodic(t) => TaskInstance::pending(
                Some(stamp(date.and_time(t.due_time_of_day), offset)),
                Some(t.link.clone()),
            ),
        }
    }
}

/// Interprets a wall-clock time in the study's UTC offset.
pub fn stamp(local: NaiveDateTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::from_naive_utc_and_offset(local - offset, offset)
}

/// One occurrence of a task on a calendar day, in its persisted shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInstance {
    #[serde(rename = "Completed", default)]
    pub completed: bool,
    #[serde(rename = "Due time", default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<DateTime<FixedOffset>>,
    #[serde(rename = "Link", default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl TaskInstance {
    pub fn pending(due_time: Option<DateTime<FixedOffset>>, link: Option<String>) -> Self {
        Self {
            completed: false,
            due_time,
            link,
        }
    }
}

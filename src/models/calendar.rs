use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::task::TaskInstance;

/// Tasks scheduled on a single date, keyed by task name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDay {
    tasks: BTreeMap<String, TaskInstance>,
}

impl CalendarDay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, task: TaskInstance) -> Option<TaskInstance> {
        self.tasks.insert(name.into(), task)
    }

    pub fn get(&self, name: &str) -> Option<&TaskInstance> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaskInstance)> {
        self.tasks.iter().map(|(name, task)| (name.as_str(), task))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// A participant's full schedule.
///
/// Serializes as `{"YYYY-MM-DD": {"<task>": {...}}}`, the document shape the
/// store has always used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Calendar {
    days: BTreeMap<NaiveDate, CalendarDay>,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a day, returning the entry it replaced.
    pub fn insert(&mut self, date: NaiveDate, day: CalendarDay) -> Option<CalendarDay> {
        self.days.insert(date, day)
    }

    /// Drops every day in `[start, end]` and returns how many were present.
    pub fn remove_between(&mut self, start: NaiveDate, end: NaiveDate) -> usize {
        if end < start {
            return 0;
        }
        let doomed: Vec<NaiveDate> = self.days.range(start..=end).map(|(date, _)| *date).collect();
        for date in &doomed {
            self.days.remove(date);
        }
        doomed.len()
    }

    pub fn get(&self, date: &NaiveDate) -> Option<&CalendarDay> {
        self.days.get(date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &CalendarDay)> {
        self.days.iter()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    /// Dates on which `task` is scheduled.
    pub fn dates_with(&self, task: &str) -> Vec<NaiveDate> {
        self.days
            .iter()
            .filter(|(_, day)| day.contains(task))
            .map(|(date, _)| *date)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::task::{DailyTaskTemplate, PeriodicTaskTemplate};

pub const DEFAULT_QUESTIONNAIRE_FREQUENCY: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

/// Timings chosen at enrollment, reused whenever the calendar is extended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    pub tasks: Vec<DailyTaskTemplate>,
    pub questionnaire: PeriodicTaskTemplate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub uid: String,
    pub email: String,
    pub settings: ScheduleSettings,
    pub enrolled_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicInfo {
    #[serde(rename = "Gender")]
    pub gender: Sex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollRequest {
    pub email: String,
    pub password: String,
    pub sex: Sex,
    pub start_date: NaiveDate,
    pub time_frame_months: u32,
    #[serde(default = "default_daily_tasks")]
    pub tasks: Vec<DailyTaskTemplate>,
    pub questionnaire: QuestionnaireRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionnaireRequest {
    pub time: NaiveTime,
    pub link: String,
    #[serde(default = "default_frequency")]
    pub frequency_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    pub uid: String,
    pub email: String,
    pub calendar_days: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub questionnaire_days: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub questionnaire_link: Option<String>,
    pub frequency_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyRequest {
    pub email: String,
    #[serde(default)]
    pub remove: Option<DateRange>,
    #[serde(default)]
    pub extend: Option<ExtendRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyResponse {
    pub removed_days: usize,
    pub extended_days: usize,
    pub calendar_days: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarQuery {
    pub email: String,
}

/// The study's standard device and symptom tasks.
pub fn default_daily_tasks() -> Vec<DailyTaskTemplate> {
    vec![
        DailyTaskTemplate::new("Hailie", NaiveTime::from_hms_opt(8, 30, 0)),
        DailyTaskTemplate::new("RespiTrak", NaiveTime::from_hms_opt(8, 30, 0)),
        DailyTaskTemplate::new("Cough Monitor", NaiveTime::from_hms_opt(21, 0, 0)),
        DailyTaskTemplate::new("CheckIn", None),
    ]
}

fn default_frequency() -> u32 {
    DEFAULT_QUESTIONNAIRE_FREQUENCY
}

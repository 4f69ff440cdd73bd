pub mod calendar;
pub mod participant;
pub mod session;
pub mod task;

pub use calendar::{Calendar, CalendarDay};
pub use participant::{
    BasicInfo, CalendarQuery, DateRange, EnrollRequest, EnrollmentResponse, ExtendRequest,
    ModifyRequest, ModifyResponse, Participant, QuestionnaireRequest, ScheduleSettings, Sex,
    default_daily_tasks,
};
pub use session::{LoginRequest, LoginResponse};
pub use task::{DailyTaskTemplate, PeriodicTaskTemplate, QUESTIONNAIRE, TaskInstance, TaskTemplate};

/// Document names, one per top-level key of a participant's record.
pub mod documents {
    pub const BASIC_INFO: &str = "Basic Info";
    pub const CALENDAR: &str = "Calendar";
    pub const NOTIFICATIONS: &str = "Notifications";
}

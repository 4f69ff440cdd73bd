pub mod calendar_service;
pub mod enrollment_service;
pub mod session;
pub mod session_sweeper;

pub use calendar_service::CalendarService;
pub use enrollment_service::EnrollmentService;
pub use session::{Session, SessionStore};
pub use session_sweeper::SessionSweeper;

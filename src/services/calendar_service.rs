use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{Calendar, ModifyRequest, ModifyResponse, Participant, documents};
use crate::schedule::{ScheduleError, ScheduleGenerator, ScheduleMutator, check_range};

/// Reads and edits calendars of enrolled participants.
pub struct CalendarService {
    db: SqlitePool,
    mutator: ScheduleMutator,
}

impl CalendarService {
    pub fn new(db: SqlitePool, generator: ScheduleGenerator) -> Self {
        Self {
            db,
            mutator: ScheduleMutator::new(generator),
        }
    }

    pub async fn fetch_calendar(&self, email: &str) -> Result<Calendar, AppError> {
        let participant = self.participant(email).await?;
        let mut conn = self.db.acquire().await?;
        let payload = repository::fetch_document(&mut conn, &participant.uid, documents::CALENDAR)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("calendar for {}", participant.email)))?;
        Ok(serde_json::from_str(&payload)?)
    }

    /// Applies the requested removal, then the requested extension, and
    /// stores the result. The read-modify-write runs in one transaction that
    /// takes the write lock up front, so concurrent edits queue behind it.
    pub async fn modify(&self, req: ModifyRequest) -> Result<ModifyResponse, AppError> {
        if req.remove.is_none() && req.extend.is_none() {
            return Err(ScheduleError::InvalidInput(
                "request must remove or extend dates".to_string(),
            )
            .into());
        }
        if let Some(range) = &req.remove {
            check_range(range.start, range.end)?;
        }
        if let Some(extend) = &req.extend {
            check_range(extend.start, extend.end)?;
        }

        let participant = self.participant(req.email.trim()).await?;
        let mut tx = self.db.begin_with("BEGIN IMMEDIATE").await?;

        let payload = repository::fetch_document(&mut tx, &participant.uid, documents::CALENDAR)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("calendar for {}", participant.email)))?;
        let mut calendar: Calendar = serde_json::from_str(&payload)?;

        let mut removed_days = 0;
        if let Some(range) = &req.remove {
            removed_days = self.mutator.remove_range(&mut calendar, range.start, range.end)?;
            info!(
                "Removed {} days between {} and {} for {}",
                removed_days, range.start, range.end, participant.email
            );
        }

        let mut extended_days = 0;
        if let Some(extend) = &req.extend {
            let mut questionnaire = participant.settings.questionnaire.clone();
            if let Some(link) = &extend.questionnaire_link {
                questionnaire.link = link.clone();
            }
            if let Some(frequency_days) = extend.frequency_days {
                questionnaire.frequency_days = frequency_days;
            }

            extended_days = self.mutator.extend_range(
                &mut calendar,
                extend.start,
                extend.end,
                &questionnaire,
                &participant.settings.tasks,
            )?;
            info!(
                "Extended {} days between {} and {} for {}",
                extended_days, extend.start, extend.end, participant.email
            );
        }

        let payload = serde_json::to_string(&calendar)?;
        repository::write_document(&mut tx, &participant.uid, documents::CALENDAR, &payload).await?;
        tx.commit().await?;

        Ok(ModifyResponse {
            removed_days,
            extended_days,
            calendar_days: calendar.len(),
        })
    }

    async fn participant(&self, email: &str) -> Result<Participant, AppError> {
        repository::find_participant_by_email(&self.db, email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("participant {}", email)))
    }
}

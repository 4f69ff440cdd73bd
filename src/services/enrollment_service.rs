use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::db::repository::{self, Document};
use crate::error::AppError;
use crate::identity::{IdentityProvider, IdentityUser};
use crate::models::{
    BasicInfo, Calendar, EnrollRequest, EnrollmentResponse, PeriodicTaskTemplate, ScheduleSettings, documents,
};
use crate::schedule::{ScheduleGenerator, study_days, validate_templates};

pub struct EnrollmentService {
    db: SqlitePool,
    identity: Arc<dyn IdentityProvider>,
    generator: ScheduleGenerator,
}

impl EnrollmentService {
    pub fn new(db: SqlitePool, identity: Arc<dyn IdentityProvider>, generator: ScheduleGenerator) -> Self {
        Self {
            db,
            identity,
            generator,
        }
    }

    /// Creates the participant's account and stores their generated calendar.
    ///
    /// Nothing is written unless the account was created; if storing the
    /// documents fails afterwards the account is deleted again.
    pub async fn enroll(&self, req: EnrollRequest) -> Result<EnrollmentResponse, AppError> {
        let email = req.email.trim().to_string();
        info!("Enrolling participant {}", email);

        if self.identity.user_exists(&email).await?
            || repository::find_participant_by_email(&self.db, &email).await?.is_some()
        {
            warn!("Rejected duplicate enrollment for {}", email);
            return Err(AppError::AlreadyExists("User already exists".to_string()));
        }

        let num_days = study_days(req.time_frame_months)?;
        let settings = ScheduleSettings {
            tasks: req.tasks,
            questionnaire: PeriodicTaskTemplate::questionnaire(
                req.questionnaire.frequency_days,
                req.questionnaire.time,
                req.questionnaire.link,
            ),
        };
        validate_templates(&settings.tasks, &settings.questionnaire)?;

        let user = self.identity.create_user(&email, &req.password).await?;

        let calendar = match self.generator.generate(
            req.start_date,
            num_days,
            &settings.tasks,
            &settings.questionnaire,
        ) {
            Ok(calendar) => calendar,
            Err(e) => {
                self.compensate(&user).await;
                return Err(e.into());
            }
        };

        let stored = match enrollment_documents(&BasicInfo { gender: req.sex }, &calendar) {
            Ok(docs) => {
                repository::insert_enrollment(&self.db, &user.uid, &email, &settings, &docs).await
            }
            Err(e) => Err(e.into()),
        };

        if let Err(e) = stored {
            error!("Failed to store enrollment for {}: {}", email, e);
            self.compensate(&user).await;
            return Err(e);
        }

        let questionnaire_days = calendar.dates_with(&settings.questionnaire.name).len();
        info!(
            "Enrolled {} as {}: {} days, {} questionnaires",
            email,
            user.uid,
            calendar.len(),
            questionnaire_days
        );

        Ok(EnrollmentResponse {
            uid: user.uid,
            email,
            calendar_days: calendar.len(),
            first_date: calendar.first_date(),
            last_date: calendar.last_date(),
            questionnaire_days,
        })
    }

    async fn compensate(&self, user: &IdentityUser) {
        warn!("Rolling back account {} for {}", user.uid, user.email);
        if let Err(e) = self.identity.delete_user(user).await {
            error!("Failed to delete account {} during rollback: {}", user.uid, e);
        }
    }
}

fn enrollment_documents(
    basic_info: &BasicInfo,
    calendar: &Calendar,
) -> Result<Vec<Document<'static>>, serde_json::Error> {
    Ok(vec![
        Document {
            name: documents::BASIC_INFO,
            payload: serde_json::to_string(basic_info)?,
        },
        Document {
            name: documents::CALENDAR,
            payload: serde_json::to_string(calendar)?,
        },
        Document {
            name: documents::NOTIFICATIONS,
            payload: "{}".to_string(),
        },
    ])
}

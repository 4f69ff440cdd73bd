use chrono::Utc;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::error::AppError;
use crate::models::{Participant, ScheduleSettings};

#[derive(Debug, FromRow)]
struct ParticipantRow {
    uid: String,
    email: String,
    settings: String,
    enrolled_at: String,
    updated_at: String,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = serde_json::Error;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        Ok(Participant {
            uid: row.uid,
            email: row.email,
            settings: serde_json::from_str::<ScheduleSettings>(&row.settings)?,
            enrolled_at: row.enrolled_at,
            updated_at: row.updated_at,
        })
    }
}

/// A named JSON document belonging to one participant.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    pub name: &'a str,
    pub payload: String,
}

pub async fn find_participant_by_email(
    db: &SqlitePool,
    email: &str,
) -> Result<Option<Participant>, AppError> {
    let row = sqlx::query_as::<_, ParticipantRow>(
        "SELECT uid, email, settings, enrolled_at, updated_at FROM participants WHERE email = ?",
    )
    .bind(email.to_lowercase())
    .fetch_optional(db)
    .await?;

    Ok(row.map(Participant::try_from).transpose()?)
}

/// Stores a new participant and all of their documents in one transaction.
pub async fn insert_enrollment(
    db: &SqlitePool,
    uid: &str,
    email: &str,
    settings: &ScheduleSettings,
    documents: &[Document<'_>],
) -> Result<Participant, AppError> {
    let now = Utc::now().to_rfc3339();
    let settings_json = serde_json::to_string(settings)?;
    let email = email.to_lowercase();

    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO participants (uid, email, settings, enrolled_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        "#,
    )
    .bind(uid)
    .bind(&email)
    .bind(&settings_json)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    for document in documents {
        write_document(&mut *tx, uid, document.name, &document.payload).await?;
    }

    tx.commit().await?;

    Ok(Participant {
        uid: uid.to_string(),
        email,
        settings: settings.clone(),
        enrolled_at: now.clone(),
        updated_at: now,
    })
}

pub async fn fetch_document(
    conn: &mut SqliteConnection,
    uid: &str,
    name: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT payload FROM documents WHERE participant_id = ?1 AND name = ?2",
    )
    .bind(uid)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await
}

/// Creates or replaces a document and bumps the participant's `updated_at`.
pub async fn write_document(
    conn: &mut SqliteConnection,
    uid: &str,
    name: &str,
    payload: &str,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO documents (participant_id, name, payload, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (participant_id, name)
        DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at
        "#,
    )
    .bind(uid)
    .bind(name)
    .bind(payload)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    sqlx::query("UPDATE participants SET updated_at = ?1 WHERE uid = ?2")
        .bind(&now)
        .bind(uid)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

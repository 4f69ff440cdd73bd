use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AdminCredentials;
use crate::identity::IdentityProvider;
use crate::schedule::ScheduleGenerator;
use crate::services::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: SessionStore,
    pub admin: Arc<AdminCredentials>,
    pub generator: ScheduleGenerator,
}

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_calendar::api::router;
use study_calendar::config::AppConfig;
use study_calendar::db;
use study_calendar::identity::{FirebaseIdentityClient, IdentityProvider, InMemoryIdentityProvider};
use study_calendar::schedule::ScheduleGenerator;
use study_calendar::services::{SessionStore, SessionSweeper};
use study_calendar::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "study_calendar=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let pool = db::connect(&config.database_url, 5).await?;
    db::migrate(&pool).await?;

    let identity: Arc<dyn IdentityProvider> = match config.firebase.clone() {
        Some(firebase) => {
            info!("using Firebase identity provider at {}", firebase.base_url);
            Arc::new(FirebaseIdentityClient::new(firebase)?)
        }
        None => {
            warn!("FIREBASE_API_KEY is not set; accounts are kept in memory only");
            Arc::new(InMemoryIdentityProvider::new())
        }
    };

    let sessions = SessionStore::new(config.session_ttl);
    let sweeper = SessionSweeper::new(sessions.clone(), config.session_sweep_secs);
    tokio::spawn(sweeper.start());

    let state = AppState {
        db: pool.clone(),
        identity,
        sessions,
        admin: Arc::new(config.admin.clone()),
        generator: ScheduleGenerator::new(config.utc_offset),
    };

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

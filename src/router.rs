use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_extractor_with_state,
    routing::{delete, get, patch, post, put},
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::db::sqlite::Storage;
use crate::error::MedError;
use crate::handlers::{admin, chat, donor};
use crate::middleware::auth::RequireAdminKey;
use crate::service::assistant::Assistant;
use crate::service::donations::DonationDesk;

#[derive(Clone)]
pub struct AppState {
    pub desk: DonationDesk,
    pub assistant: Arc<Assistant>,
    pub admin_key: Arc<str>,
    pub uploads_dir: Arc<PathBuf>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(storage: Storage, assistant: Assistant, cfg: &Config) -> Self {
        Self {
            desk: DonationDesk::new(storage, cfg.eligibility_threshold_days),
            assistant: Arc::new(assistant),
            admin_key: Arc::from(cfg.admin_key.as_str()),
            uploads_dir: Arc::new(cfg.uploads_dir.clone()),
            max_upload_bytes: cfg.max_upload_bytes,
        }
    }

    /// Open the database, make sure the schema exists and build the assistant.
    pub async fn from_config(cfg: &Config) -> Result<Self, MedError> {
        let storage = Storage::connect(&cfg.database_url).await?;
        storage.init_schema().await?;
        let assistant = Assistant::from_config(cfg)?;
        Ok(Self::new(storage, assistant, cfg))
    }

    pub fn storage(&self) -> &Storage {
        self.desk.storage()
    }
}

pub fn app_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/shelf-life",
            get(admin::list_shelf_life).post(admin::upsert_shelf_life),
        )
        .route(
            "/shelf-life/{id}",
            put(admin::update_shelf_life).delete(admin::delete_shelf_life),
        )
        .route("/ngos", get(admin::list_ngos).post(admin::create_ngo))
        .route("/ngos/{id}", put(admin::update_ngo))
        .route("/ngos/{id}/connections", get(admin::ngo_connections))
        .route("/donations", get(admin::list_donations))
        .route("/donations/{id}", delete(admin::delete_donation))
        .route("/donations/{id}/status", patch(admin::update_donation_status))
        .route("/donations/{id}/connect", post(admin::connect_donation))
        .route("/transcriptions", get(admin::list_transcriptions))
        .route("/stats", get(admin::stats))
        .route("/export/{entity}", get(admin::export_csv))
        .route_layer(from_extractor_with_state::<RequireAdminKey, AppState>(
            state.clone(),
        ));

    Router::new()
        .route("/health", get(donor::health))
        .route("/api/ngos", get(donor::match_ngos))
        .route("/api/eligibility", post(donor::check_eligibility))
        .route("/api/donations", post(donor::record_donation))
        .route("/api/chat", post(chat::chat))
        .route(
            "/api/chat/audio",
            post(chat::chat_audio).layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .nest("/admin", admin_routes)
        .with_state(state)
}

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::info;

use crate::db::models::{
    AudioTranscription, Donation, DonationFilter, Ngo, NgoConnection, NgoFilter, NgoInput,
    ShelfLifeEntry, ShelfLifeFilter, ShelfLifeInput,
};
use crate::service::export::{ExportEntity, to_csv};
use crate::types::forms::{ConfirmQuery, ConnectRequest, StatusUpdate};
use crate::{MedError, router::AppState};

const MAX_SHELF_MONTHS: u32 = 120;

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct Updated {
    pub updated: u64,
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub ngos: i64,
    pub shelf_life: i64,
    pub donations: i64,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: u64,
    pub confirmed: bool,
}

fn require_updated(rows: u64, what: &'static str) -> Result<Json<Updated>, MedError> {
    if rows == 0 {
        return Err(MedError::NotFound(what));
    }
    Ok(Json(Updated { updated: rows }))
}

fn validate_shelf_life(input: &ShelfLifeInput) -> Result<(), MedError> {
    if input.medicine_name.trim().is_empty() {
        return Err(MedError::validation("Medicine name is required."));
    }
    if !(1..=MAX_SHELF_MONTHS).contains(&input.shelf_months) {
        return Err(MedError::validation(format!(
            "Shelf life must be between 1 and {MAX_SHELF_MONTHS} months."
        )));
    }
    Ok(())
}

fn validate_ngo(input: &NgoInput) -> Result<(), MedError> {
    if input.name.trim().is_empty() || input.city.trim().is_empty() {
        return Err(MedError::validation("NGO name and city are required."));
    }
    Ok(())
}

// ---- shelf life ----

pub async fn list_shelf_life(
    State(state): State<AppState>,
    Query(filter): Query<ShelfLifeFilter>,
) -> Result<Json<Vec<ShelfLifeEntry>>, MedError> {
    Ok(Json(state.storage().list_shelf_life(&filter).await?))
}

/// Insert, or update the months of an existing medicine name (case-insensitive).
pub async fn upsert_shelf_life(
    State(state): State<AppState>,
    Json(input): Json<ShelfLifeInput>,
) -> Result<Json<Created>, MedError> {
    validate_shelf_life(&input)?;
    let id = state.storage().upsert_shelf_life(&input).await?;
    info!(id, medicine = %input.medicine_name.trim(), "shelf-life entry saved");
    Ok(Json(Created { id }))
}

pub async fn update_shelf_life(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ShelfLifeInput>,
) -> Result<Json<Updated>, MedError> {
    validate_shelf_life(&input)?;
    let rows = state.storage().update_shelf_life(id, &input).await?;
    require_updated(rows, "Shelf-life entry")
}

pub async fn delete_shelf_life(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<ConfirmQuery>,
) -> Result<Json<Deleted>, MedError> {
    let deleted = state.storage().delete_shelf_life(id, q.confirm).await?;
    Ok(Json(Deleted {
        deleted,
        confirmed: q.confirm,
    }))
}

// ---- ngos ----

pub async fn list_ngos(
    State(state): State<AppState>,
    Query(filter): Query<NgoFilter>,
) -> Result<Json<Vec<Ngo>>, MedError> {
    Ok(Json(state.storage().list_ngos(&filter).await?))
}

pub async fn create_ngo(
    State(state): State<AppState>,
    Json(input): Json<NgoInput>,
) -> Result<(StatusCode, Json<Created>), MedError> {
    validate_ngo(&input)?;
    let id = state.storage().insert_ngo(&input).await?;
    info!(id, city = %input.city.trim(), "ngo added");
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn update_ngo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<NgoInput>,
) -> Result<Json<Updated>, MedError> {
    validate_ngo(&input)?;
    let rows = state.storage().update_ngo(id, &input).await?;
    require_updated(rows, "NGO")
}

pub async fn ngo_connections(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<NgoConnection>>, MedError> {
    let storage = state.storage();
    if storage.get_ngo(id).await?.is_none() {
        return Err(MedError::NotFound("NGO"));
    }
    Ok(Json(storage.list_connections_for_ngo(id).await?))
}

// ---- donations ----

pub async fn list_donations(
    State(state): State<AppState>,
    Query(filter): Query<DonationFilter>,
) -> Result<Json<Vec<Donation>>, MedError> {
    Ok(Json(state.storage().list_donations(&filter).await?))
}

pub async fn update_donation_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Updated>, MedError> {
    let status = update.status.trim();
    if status.is_empty() {
        return Err(MedError::validation("Status is required."));
    }
    let rows = state.storage().update_donation_status(id, status).await?;
    if rows > 0 {
        info!(id, status, "donation status changed");
    }
    require_updated(rows, "Donation")
}

pub async fn delete_donation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<ConfirmQuery>,
) -> Result<Json<Deleted>, MedError> {
    let deleted = state.storage().delete_donation(id, q.confirm).await?;
    Ok(Json(Deleted {
        deleted,
        confirmed: q.confirm,
    }))
}

pub async fn connect_donation(
    State(state): State<AppState>,
    Path(donation_id): Path<i64>,
    Json(req): Json<ConnectRequest>,
) -> Result<(StatusCode, Json<Created>), MedError> {
    let id = state
        .storage()
        .connect_donation_to_ngo(donation_id, req.ngo_id, &req.message)
        .await?;
    info!(donation_id, ngo_id = req.ngo_id, "donation connected to ngo");
    Ok((StatusCode::CREATED, Json(Created { id })))
}

// ---- transcriptions / stats / export ----

pub async fn stats(State(state): State<AppState>) -> Result<Json<Stats>, MedError> {
    let storage = state.storage();
    Ok(Json(Stats {
        ngos: storage.count_ngos().await?,
        shelf_life: storage.count_shelf_life().await?,
        donations: storage.count_donations().await?,
    }))
}

pub async fn list_transcriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<AudioTranscription>>, MedError> {
    Ok(Json(state.storage().list_transcriptions().await?))
}

/// GET /admin/export/{entity} -> CSV download with a header row even when empty.
pub async fn export_csv(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Result<Response, MedError> {
    let entity: ExportEntity = entity.parse()?;
    let storage = state.storage();
    let body = match entity {
        ExportEntity::Donations => {
            let all = DonationFilter {
                limit: Some(i64::MAX),
                ..Default::default()
            };
            to_csv(&storage.list_donations(&all).await?)?
        }
        ExportEntity::Ngos => to_csv(&storage.list_ngos(&NgoFilter::default()).await?)?,
        ExportEntity::ShelfLife => {
            to_csv(&storage.list_shelf_life(&ShelfLifeFilter::default()).await?)?
        }
    };

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", entity.file_name()),
            ),
        ],
        body,
    )
        .into_response())
}

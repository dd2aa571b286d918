use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Local;
use serde_json::{Value, json};

use crate::db::models::Ngo;
use crate::service::donations::{Assessment, RecordedDonation};
use crate::types::forms::{CityQuery, DonationForm};
use crate::{MedError, router::AppState};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/ngos?city=... -> NGOs serving that city.
pub async fn match_ngos(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> Result<Json<Vec<Ngo>>, MedError> {
    let ngos = state.storage().match_ngos_by_city(&query.city).await?;
    Ok(Json(ngos))
}

/// POST /api/eligibility -> eligibility report and matching NGOs, nothing stored.
pub async fn check_eligibility(
    State(state): State<AppState>,
    Json(form): Json<DonationForm>,
) -> Result<Json<Assessment>, MedError> {
    let today = Local::now().date_naive();
    Ok(Json(state.desk.assess(&form, today).await?))
}

/// POST /api/donations -> records a pledged donation.
pub async fn record_donation(
    State(state): State<AppState>,
    Json(form): Json<DonationForm>,
) -> Result<(StatusCode, Json<RecordedDonation>), MedError> {
    let today = Local::now().date_naive();
    let recorded = state.desk.record(&form, today).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status every newly recorded donation starts with.
pub const STATUS_PLEDGED: &str = "pledged";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct ShelfLifeEntry {
    pub id: i64,
    pub medicine_name: String,
    pub shelf_months: u32,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct Ngo {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub contact: String,
    /// Free-text, usually a comma separated list of medicine types.
    pub accepts: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Donation {
    pub id: i64,
    pub donor_name: String,
    pub donor_city: String,
    pub medicine_name: String,
    pub batch_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub status: String,
    pub matched_ngo_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A connection row joined with the donation it points at.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NgoConnection {
    pub id: i64,
    pub ngo_id: i64,
    pub donation_id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub donor_name: Option<String>,
    pub donor_city: Option<String>,
    pub medicine_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AudioTranscription {
    pub id: i64,
    pub filename: String,
    pub filepath: String,
    pub uploader: String,
    pub uploaded_at: DateTime<Utc>,
    pub transcription: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDonation {
    pub donor_name: String,
    pub donor_city: String,
    pub medicine_name: String,
    pub batch_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub matched_ngo_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewTranscription {
    pub filename: String,
    pub filepath: String,
    pub uploader: String,
    pub transcription: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NgoInput {
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub accepts: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShelfLifeInput {
    pub medicine_name: String,
    pub shelf_months: u32,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShelfLifeFilter {
    pub medicine: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NgoFilter {
    pub name: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DonationFilter {
    pub donor: Option<String>,
    pub city: Option<String>,
    pub medicine: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    /// Only donations not yet matched to an NGO.
    #[serde(default)]
    pub unmatched: bool,
}

impl DonationFilter {
    pub const DEFAULT_LIMIT: i64 = 500;

    pub fn limit(&self) -> i64 {
        self.limit
            .filter(|l| *l > 0)
            .unwrap_or(Self::DEFAULT_LIMIT)
    }
}

use serde::Deserialize;

/// Donor-facing donation form as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct DonationForm {
    #[serde(default)]
    pub donor_name: String,
    #[serde(default)]
    pub donor_city: String,
    #[serde(default)]
    pub medicine_name: String,
    /// Manufacture or purchase date.
    #[serde(default)]
    pub batch_date: String,
    /// Printed expiry, if the donor has one.
    #[serde(default)]
    pub expiry_date: Option<String>,
    /// NGO the donor picked from the matches.
    #[serde(default)]
    pub ngo_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityQuery {
    #[serde(default)]
    pub city: String,
}

/// `?confirm=true` is required for destructive admin actions.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectRequest {
    pub ngo_id: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

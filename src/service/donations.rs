use crate::db::models::{Donation, NewDonation, Ngo};
use crate::db::sqlite::Storage;
use crate::error::MedError;
use crate::service::dates;
use crate::service::eligibility::{self, EligibilityReport, ExpiryEvidence};
use crate::types::forms::DonationForm;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

/// Eligibility plus the NGOs serving the donor's city.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub eligibility: EligibilityReport,
    pub matches: Vec<Ngo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedDonation {
    pub donation: Donation,
    pub eligibility: EligibilityReport,
    pub matches: Vec<Ngo>,
}

/// A form that passed validation: required fields present, dates parsed.
#[derive(Debug, Clone, PartialEq)]
struct ValidForm {
    donor_name: String,
    donor_city: String,
    medicine_name: String,
    batch_date: NaiveDate,
    expiry_date: Option<NaiveDate>,
    ngo_id: Option<i64>,
}

impl TryFrom<&DonationForm> for ValidForm {
    type Error = MedError;

    fn try_from(form: &DonationForm) -> Result<Self, Self::Error> {
        let donor_name = form.donor_name.trim();
        let medicine_name = form.medicine_name.trim();
        if donor_name.is_empty() || medicine_name.is_empty() {
            return Err(MedError::validation("Provide donor name and medicine name."));
        }
        if form.batch_date.trim().is_empty() {
            return Err(MedError::validation("Provide the manufacture/purchase date."));
        }
        let batch_date = dates::parse_flexible(&form.batch_date)?;
        let expiry_date = dates::parse_optional(form.expiry_date.as_deref())
            .map_err(|e| MedError::validation(format!("Expiry parse error: {e}")))?;

        Ok(Self {
            donor_name: donor_name.to_string(),
            donor_city: form.donor_city.trim().to_string(),
            medicine_name: medicine_name.to_string(),
            batch_date,
            expiry_date,
            ngo_id: form.ngo_id,
        })
    }
}

/// Checks, matches and records donations against the store.
#[derive(Clone)]
pub struct DonationDesk {
    storage: Storage,
    threshold_days: i64,
}

impl DonationDesk {
    pub fn new(storage: Storage, threshold_days: i64) -> Self {
        Self {
            storage,
            threshold_days,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Evaluate a form without writing anything.
    pub async fn assess(&self, form: &DonationForm, today: NaiveDate) -> Result<Assessment, MedError> {
        let valid = ValidForm::try_from(form)?;
        self.assess_valid(&valid, today).await
    }

    /// Record a donation as `pledged`, whatever its eligibility outcome.
    pub async fn record(
        &self,
        form: &DonationForm,
        today: NaiveDate,
    ) -> Result<RecordedDonation, MedError> {
        let valid = ValidForm::try_from(form)?;

        if let Some(ngo_id) = valid.ngo_id
            && self.storage.get_ngo(ngo_id).await?.is_none()
        {
            return Err(MedError::validation(format!("Unknown NGO id {ngo_id}.")));
        }

        let Assessment {
            eligibility,
            matches,
        } = self.assess_valid(&valid, today).await?;

        let id = self
            .storage
            .insert_donation(&NewDonation {
                donor_name: valid.donor_name,
                donor_city: valid.donor_city,
                medicine_name: valid.medicine_name,
                batch_date: valid.batch_date,
                expiry_date: valid.expiry_date.or(eligibility.effective_expiry),
                matched_ngo_id: valid.ngo_id,
            })
            .await?;
        let donation = self
            .storage
            .get_donation(id)
            .await?
            .ok_or(MedError::NotFound("Donation"))?;

        info!(
            donation_id = id,
            outcome = ?eligibility.outcome,
            matched_ngo_id = ?donation.matched_ngo_id,
            "donation recorded"
        );
        Ok(RecordedDonation {
            donation,
            eligibility,
            matches,
        })
    }

    async fn assess_valid(&self, form: &ValidForm, today: NaiveDate) -> Result<Assessment, MedError> {
        let shelf_months = if form.expiry_date.is_none() {
            self.storage.shelf_months_for(&form.medicine_name).await?
        } else {
            None
        };
        let evidence = ExpiryEvidence {
            printed_expiry: form.expiry_date,
            batch_date: Some(form.batch_date),
            shelf_months,
        };
        let eligibility = eligibility::check(&evidence, today, self.threshold_days);
        let matches = self.storage.match_ngos_by_city(&form.donor_city).await?;
        Ok(Assessment {
            eligibility,
            matches,
        })
    }
}

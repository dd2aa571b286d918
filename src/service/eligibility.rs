use chrono::{Months, NaiveDate};
use serde::Serialize;

/// Minimum remaining shelf life, in days, for a donation to be accepted.
pub const DEFAULT_THRESHOLD_DAYS: i64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Eligible,
    Ineligible,
    Undetermined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirySource {
    Printed,
    ShelfLife,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityReport {
    pub outcome: Outcome,
    pub reason: String,
    pub effective_expiry: Option<NaiveDate>,
    pub expiry_source: Option<ExpirySource>,
    pub days_left: Option<i64>,
}

impl EligibilityReport {
    pub fn is_eligible(&self) -> bool {
        self.outcome == Outcome::Eligible
    }

    fn undetermined() -> Self {
        Self {
            outcome: Outcome::Undetermined,
            reason: "No shelf-life reference; cannot determine expiry.".to_string(),
            effective_expiry: None,
            expiry_source: None,
            days_left: None,
        }
    }
}

/// What the checker knows about a donation's expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryEvidence {
    pub printed_expiry: Option<NaiveDate>,
    pub batch_date: Option<NaiveDate>,
    pub shelf_months: Option<u32>,
}

impl ExpiryEvidence {
    /// Printed date wins; otherwise batch date plus shelf life in calendar months.
    pub fn effective_expiry(&self) -> Option<(NaiveDate, ExpirySource)> {
        if let Some(printed) = self.printed_expiry {
            return Some((printed, ExpirySource::Printed));
        }
        let batch = self.batch_date?;
        let months = self.shelf_months?;
        batch
            .checked_add_months(Months::new(months))
            .map(|d| (d, ExpirySource::ShelfLife))
    }
}

/// Eligible iff the effective expiry is at least `threshold_days` after `today`.
pub fn check(evidence: &ExpiryEvidence, today: NaiveDate, threshold_days: i64) -> EligibilityReport {
    let Some((expiry, source)) = evidence.effective_expiry() else {
        return EligibilityReport::undetermined();
    };

    let days_left = (expiry - today).num_days();
    let (outcome, reason) = if days_left >= threshold_days {
        let reason = match source {
            ExpirySource::Printed => "Eligible based on printed expiry.",
            ExpirySource::ShelfLife => "Eligible based on shelf life.",
        };
        (Outcome::Eligible, reason)
    } else {
        (Outcome::Ineligible, "Too close to expiry.")
    };

    EligibilityReport {
        outcome,
        reason: reason.to_string(),
        effective_expiry: Some(expiry),
        expiry_source: Some(source),
        days_left: Some(days_left),
    }
}

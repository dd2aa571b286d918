//! Reference data for a fresh database.
//!
//! Seeding is idempotent: NGOs are only written into an empty table, shelf-life
//! entries never overwrite an existing medicine, and sample donations are only
//! added to an empty donations table.

use crate::db::models::{NewDonation, NgoInput, ShelfLifeInput};
use crate::db::sqlite::Storage;
use crate::error::MedError;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::info;

const NGOS: &[(&str, &str, &str, &str)] = &[
    ("Helping Hands Trust", "Bengaluru", "+91 9000000001", "paracetamol,ibuprofen"),
    ("Care for All", "Mumbai", "+91 9000000002", "vitamins,antibiotics"),
    ("Asha Foundation", "Hyderabad", "+91 9000000003", "antibiotics,paracetamol"),
    ("Sakhi NGO", "Chennai", "+91 9000000004", "vitamins,antiacids"),
    ("Janseva", "Delhi", "+91 9000000005", "paracetamol,antibiotics"),
    ("Grameen Care", "Patna", "+91 9000000006", "vitamins,paracetamol"),
    ("Seva Samiti", "Kolkata", "+91 9000000007", "cough syrups,antibiotics"),
    ("Rural Relief", "Lucknow", "+91 9000000008", "paracetamol,vitamins"),
    ("Smile Foundation", "Pune", "+91 9000000009", "general medicines"),
    ("Udaan Welfare", "Jaipur", "+91 9000000010", "paracetamol,vitamins"),
];

const SHELF_LIFE: &[(&str, u32, &str)] = &[
    ("Paracetamol", 36, "Common painkiller"),
    ("Ibuprofen", 36, "NSAID"),
    ("Amoxicillin", 24, "Antibiotic"),
    ("Azithromycin", 24, "Antibiotic"),
    ("Cough Syrup", 12, "Liquid formulation"),
    ("Multivitamin", 24, "Supplements"),
    ("Antacid", 36, "Stomach relief"),
    ("Aspirin", 36, "Painkiller"),
    ("Metformin", 24, "Diabetes med"),
    ("Vitamin C", 36, "Supplement"),
];

#[derive(Debug, Default, Serialize)]
pub struct SeedReport {
    pub ngos: usize,
    pub shelf_life: usize,
    pub donations: usize,
}

pub async fn seed_reference_data(
    storage: &Storage,
    sample_donations: bool,
    today: NaiveDate,
) -> Result<SeedReport, MedError> {
    let mut report = SeedReport::default();

    if storage.count_ngos().await? == 0 {
        for (name, city, contact, accepts) in NGOS {
            storage
                .insert_ngo(&NgoInput {
                    name: name.to_string(),
                    city: city.to_string(),
                    contact: contact.to_string(),
                    accepts: accepts.to_string(),
                })
                .await?;
            report.ngos += 1;
        }
    }

    for (medicine_name, shelf_months, notes) in SHELF_LIFE {
        let inserted = storage
            .insert_shelf_life_if_absent(&ShelfLifeInput {
                medicine_name: medicine_name.to_string(),
                shelf_months: *shelf_months,
                notes: notes.to_string(),
            })
            .await?;
        if inserted {
            report.shelf_life += 1;
        }
    }

    if sample_donations && storage.count_donations().await? == 0 {
        report.donations = seed_sample_donations(storage, today).await?;
    }

    info!(
        ngos = report.ngos,
        shelf_life = report.shelf_life,
        donations = report.donations,
        "seeded reference data"
    );
    Ok(report)
}

async fn seed_sample_donations(storage: &Storage, today: NaiveDate) -> Result<usize, MedError> {
    let days_ago = |n: u64| today.checked_sub_days(Days::new(n)).unwrap_or(today);
    let samples = [
        (
            "Ravi",
            "Bengaluru",
            "Paracetamol",
            days_ago(90),
            today.checked_add_days(Days::new(3 * 365)),
            "Helping Hands Trust",
            None,
        ),
        ("Sita", "Mumbai", "Multivitamin", days_ago(60), None, "Care for All", None),
        (
            "Ramesh",
            "Delhi",
            "Aspirin",
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(today),
            NaiveDate::from_ymd_opt(2021, 1, 1),
            "Janseva",
            Some("rejected"),
        ),
    ];

    let mut count = 0;
    for (donor, city, medicine, batch, expiry, ngo_name, status) in samples {
        // ids depend on what was in the table before, names do not
        let ngo_id = storage.ngo_id_by_name(ngo_name).await?;
        let id = storage
            .insert_donation(&NewDonation {
                donor_name: donor.to_string(),
                donor_city: city.to_string(),
                medicine_name: medicine.to_string(),
                batch_date: batch,
                expiry_date: expiry,
                matched_ngo_id: ngo_id,
            })
            .await?;
        if let Some(status) = status {
            storage.update_donation_status(id, status).await?;
        }
        count += 1;
    }
    Ok(count)
}

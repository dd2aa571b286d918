use crate::db::models::{Donation, Ngo, ShelfLifeEntry};
use crate::error::MedError;
use csv::Writer;
use std::str::FromStr;

/// Entities that can be exported, as named in `/admin/export/{entity}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportEntity {
    Donations,
    Ngos,
    ShelfLife,
}

impl ExportEntity {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Donations => "donations.csv",
            Self::Ngos => "ngos.csv",
            Self::ShelfLife => "shelf_life.csv",
        }
    }
}

impl FromStr for ExportEntity {
    type Err = MedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end_matches(".csv") {
            "donations" => Ok(Self::Donations),
            "ngos" => Ok(Self::Ngos),
            "shelf-life" | "shelf_life" => Ok(Self::ShelfLife),
            _ => Err(MedError::NotFound("Export")),
        }
    }
}

/// A row type with a fixed CSV header.
pub trait CsvRow {
    const HEADER: &'static [&'static str];

    fn record(&self) -> Vec<String>;
}

impl CsvRow for Donation {
    const HEADER: &'static [&'static str] = &[
        "id",
        "donor_name",
        "donor_city",
        "medicine_name",
        "batch_date",
        "expiry_date",
        "status",
        "matched_ngo_id",
        "created_at",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.donor_name.clone(),
            self.donor_city.clone(),
            self.medicine_name.clone(),
            self.batch_date.to_string(),
            self.expiry_date.map(|d| d.to_string()).unwrap_or_default(),
            self.status.clone(),
            self.matched_ngo_id.map(|id| id.to_string()).unwrap_or_default(),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for Ngo {
    const HEADER: &'static [&'static str] = &["id", "name", "city", "contact", "accepts"];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.city.clone(),
            self.contact.clone(),
            self.accepts.clone(),
        ]
    }
}

impl CsvRow for ShelfLifeEntry {
    const HEADER: &'static [&'static str] = &["id", "medicine_name", "shelf_months", "notes"];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.medicine_name.clone(),
            self.shelf_months.to_string(),
            self.notes.clone(),
        ]
    }
}

/// UTF-8 CSV with the header line always present.
pub fn to_csv<T: CsvRow>(rows: &[T]) -> Result<Vec<u8>, MedError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(T::HEADER)?;
    for row in rows {
        writer.write_record(row.record())?;
    }
    writer
        .into_inner()
        .map_err(|e| MedError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ngo(id: i64, name: &str) -> Ngo {
        Ngo {
            id,
            name: name.to_string(),
            city: "Chennai".to_string(),
            contact: "+91 9000000004".to_string(),
            accepts: "vitamins,antiacids".to_string(),
        }
    }

    #[test]
    fn header_only_for_empty_table() {
        let bytes = to_csv::<Ngo>(&[]).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "id,name,city,contact,accepts\n");
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let bytes = to_csv(&[ngo(4, "Sakhi NGO")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "4,Sakhi NGO,Chennai,+91 9000000004,\"vitamins,antiacids\"");
    }

    #[test]
    fn non_ascii_survives() {
        let bytes = to_csv(&[ngo(1, "Sevā Samiti")]).unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains("Sevā Samiti"));
    }

    #[test]
    fn entity_names_parse() {
        assert_eq!("donations".parse::<ExportEntity>().unwrap(), ExportEntity::Donations);
        assert_eq!("shelf-life.csv".parse::<ExportEntity>().unwrap(), ExportEntity::ShelfLife);
        assert!("users".parse::<ExportEntity>().is_err());
    }
}

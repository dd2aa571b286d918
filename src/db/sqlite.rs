use crate::db::models::{
    AudioTranscription, Donation, DonationFilter, NewDonation, NewTranscription, Ngo,
    NgoConnection, NgoFilter, NgoInput, STATUS_PLEDGED, ShelfLifeEntry, ShelfLifeFilter,
    ShelfLifeInput,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::MedError;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, MedError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_opts)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), MedError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ---- shelf life ----

    /// Shelf life in months for `medicine_name`, compared case-insensitively.
    pub async fn shelf_months_for(&self, medicine_name: &str) -> Result<Option<u32>, MedError> {
        let rec: Option<(u32,)> =
            sqlx::query_as("SELECT shelf_months FROM shelf_life WHERE medicine_name = ?")
                .bind(medicine_name.trim())
                .fetch_optional(&self.pool)
                .await?;
        Ok(rec.map(|r| r.0))
    }

    pub async fn list_shelf_life(
        &self,
        filter: &ShelfLifeFilter,
    ) -> Result<Vec<ShelfLifeEntry>, MedError> {
        let medicine = Needle::new(filter.medicine.as_deref());
        let rows = sqlx::query_as::<_, ShelfLifeEntry>(
            "SELECT id, medicine_name, shelf_months, notes FROM shelf_life ORDER BY medicine_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .filter(|e| medicine.matches(&e.medicine_name))
            .collect())
    }

    /// Insert or replace by unique medicine name. Returns the row id.
    pub async fn upsert_shelf_life(&self, input: &ShelfLifeInput) -> Result<i64, MedError> {
        let name = input.medicine_name.trim();
        sqlx::query(
            r#"
            INSERT INTO shelf_life (medicine_name, shelf_months, notes)
            VALUES (?, ?, ?)
            ON CONFLICT(medicine_name) DO UPDATE SET
                shelf_months=excluded.shelf_months,
                notes=excluded.notes
            "#,
        )
        .bind(name)
        .bind(input.shelf_months)
        .bind(input.notes.trim())
        .execute(&self.pool)
        .await?;

        let rec: (i64,) = sqlx::query_as("SELECT id FROM shelf_life WHERE medicine_name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    /// Seed-only insert that leaves an existing entry untouched.
    pub async fn insert_shelf_life_if_absent(
        &self,
        input: &ShelfLifeInput,
    ) -> Result<bool, MedError> {
        let res = sqlx::query(
            r#"INSERT INTO shelf_life (medicine_name, shelf_months, notes)
               VALUES (?, ?, ?)
               ON CONFLICT(medicine_name) DO NOTHING"#,
        )
        .bind(input.medicine_name.trim())
        .bind(input.shelf_months)
        .bind(input.notes.trim())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn update_shelf_life(
        &self,
        id: i64,
        input: &ShelfLifeInput,
    ) -> Result<u64, MedError> {
        let res = sqlx::query(
            "UPDATE shelf_life SET medicine_name = ?, shelf_months = ?, notes = ? WHERE id = ?",
        )
        .bind(input.medicine_name.trim())
        .bind(input.shelf_months)
        .bind(input.notes.trim())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                MedError::validation("A shelf-life entry for that medicine already exists.")
            } else {
                MedError::from(e)
            }
        })?;
        Ok(res.rows_affected())
    }

    /// Without `confirmed` nothing is deleted and 0 is returned.
    pub async fn delete_shelf_life(&self, id: i64, confirmed: bool) -> Result<u64, MedError> {
        if !confirmed {
            debug!(id, "shelf-life delete skipped: not confirmed");
            return Ok(0);
        }
        let res = sqlx::query("DELETE FROM shelf_life WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn count_shelf_life(&self) -> Result<i64, MedError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shelf_life")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    // ---- NGOs ----

    /// NGOs whose city contains `city`, case-insensitively, in table order.
    /// A blank city matches every NGO.
    pub async fn match_ngos_by_city(&self, city: &str) -> Result<Vec<Ngo>, MedError> {
        self.list_ngos(&NgoFilter {
            name: None,
            city: Some(city.to_string()),
        })
        .await
    }

    pub async fn list_ngos(&self, filter: &NgoFilter) -> Result<Vec<Ngo>, MedError> {
        let name = Needle::new(filter.name.as_deref());
        let city = Needle::new(filter.city.as_deref());
        let rows = sqlx::query_as::<_, Ngo>(
            "SELECT id, name, city, contact, accepts FROM ngos ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .filter(|n| name.matches(&n.name) && city.matches(&n.city))
            .collect())
    }

    pub async fn get_ngo(&self, id: i64) -> Result<Option<Ngo>, MedError> {
        let row = sqlx::query_as::<_, Ngo>(
            "SELECT id, name, city, contact, accepts FROM ngos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Lowest id of an NGO with exactly this name, ignoring ASCII case.
    pub async fn ngo_id_by_name(&self, name: &str) -> Result<Option<i64>, MedError> {
        let rec: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM ngos WHERE name = ? COLLATE NOCASE ORDER BY id LIMIT 1",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(rec.map(|r| r.0))
    }

    pub async fn insert_ngo(&self, input: &NgoInput) -> Result<i64, MedError> {
        let res = sqlx::query("INSERT INTO ngos (name, city, contact, accepts) VALUES (?, ?, ?, ?)")
            .bind(input.name.trim())
            .bind(input.city.trim())
            .bind(input.contact.trim())
            .bind(input.accepts.trim())
            .execute(&self.pool)
            .await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn update_ngo(&self, id: i64, input: &NgoInput) -> Result<u64, MedError> {
        let res = sqlx::query(
            "UPDATE ngos SET name = ?, city = ?, contact = ?, accepts = ? WHERE id = ?",
        )
        .bind(input.name.trim())
        .bind(input.city.trim())
        .bind(input.contact.trim())
        .bind(input.accepts.trim())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    pub async fn count_ngos(&self) -> Result<i64, MedError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ngos")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    // ---- donations ----

    /// Insert with status `pledged`. Returns the row id.
    pub async fn insert_donation(&self, donation: &NewDonation) -> Result<i64, MedError> {
        let res = sqlx::query(
            r#"
            INSERT INTO donations (
                donor_name, donor_city, medicine_name, batch_date,
                expiry_date, status, matched_ngo_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(donation.donor_name.trim())
        .bind(donation.donor_city.trim())
        .bind(donation.medicine_name.trim())
        .bind(donation.batch_date.format(DATE_FORMAT).to_string())
        .bind(
            donation
                .expiry_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
        )
        .bind(STATUS_PLEDGED)
        .bind(donation.matched_ngo_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn get_donation(&self, id: i64) -> Result<Option<Donation>, MedError> {
        let row = sqlx::query(
            r#"SELECT id, donor_name, donor_city, medicine_name, batch_date,
               expiry_date, status, matched_ngo_id, created_at
               FROM donations WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_donation).transpose()
    }

    /// Newest first; every text filter is a case-insensitive substring, ANDed.
    /// `unmatched` keeps only donations no NGO has claimed yet.
    pub async fn list_donations(&self, filter: &DonationFilter) -> Result<Vec<Donation>, MedError> {
        let donor = Needle::new(filter.donor.as_deref());
        let city = Needle::new(filter.city.as_deref());
        let medicine = Needle::new(filter.medicine.as_deref());
        let status = Needle::new(filter.status.as_deref());
        let limit = usize::try_from(filter.limit()).unwrap_or(usize::MAX);

        let rows = sqlx::query(
            r#"SELECT id, donor_name, donor_city, medicine_name, batch_date,
               expiry_date, status, matched_ngo_id, created_at
               FROM donations
               WHERE (? = 0 OR matched_ngo_id IS NULL)
               ORDER BY id DESC"#,
        )
        .bind(filter.unmatched)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::new();
        for row in rows {
            if out.len() >= limit {
                break;
            }
            let d = Self::row_to_donation(row)?;
            if donor.matches(&d.donor_name)
                && city.matches(&d.donor_city)
                && medicine.matches(&d.medicine_name)
                && status.matches(&d.status)
            {
                out.push(d);
            }
        }
        Ok(out)
    }

    pub async fn count_donations(&self) -> Result<i64, MedError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM donations")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    pub async fn update_donation_status(&self, id: i64, status: &str) -> Result<u64, MedError> {
        let res = sqlx::query("UPDATE donations SET status = ? WHERE id = ?")
            .bind(status.trim())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    /// Without `confirmed` nothing is deleted and 0 is returned.
    pub async fn delete_donation(&self, id: i64, confirmed: bool) -> Result<u64, MedError> {
        if !confirmed {
            debug!(id, "donation delete skipped: not confirmed");
            return Ok(0);
        }
        let res = sqlx::query("DELETE FROM donations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    /// Record a connection and point the donation at the NGO, in one transaction.
    /// Returns the connection id.
    pub async fn connect_donation_to_ngo(
        &self,
        donation_id: i64,
        ngo_id: i64,
        message: &str,
    ) -> Result<i64, MedError> {
        let mut tx = self.pool.begin().await?;

        let ngo: Option<(i64,)> = sqlx::query_as("SELECT id FROM ngos WHERE id = ?")
            .bind(ngo_id)
            .fetch_optional(&mut *tx)
            .await?;
        if ngo.is_none() {
            return Err(MedError::NotFound("NGO"));
        }

        let updated = sqlx::query("UPDATE donations SET matched_ngo_id = ? WHERE id = ?")
            .bind(ngo_id)
            .bind(donation_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(MedError::NotFound("Donation"));
        }

        let res = sqlx::query(
            r#"INSERT INTO ngo_connections (ngo_id, donation_id, message, created_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(ngo_id)
        .bind(donation_id)
        .bind(message.trim())
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn list_connections_for_ngo(
        &self,
        ngo_id: i64,
    ) -> Result<Vec<NgoConnection>, MedError> {
        let rows = sqlx::query(
            r#"SELECT nc.id, nc.ngo_id, nc.donation_id, nc.message, nc.created_at,
               d.donor_name, d.donor_city, d.medicine_name
               FROM ngo_connections nc
               LEFT JOIN donations d ON nc.donation_id = d.id
               WHERE nc.ngo_id = ?
               ORDER BY nc.id DESC"#,
        )
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| -> Result<NgoConnection, MedError> {
                Ok(NgoConnection {
                    id: row.try_get("id")?,
                    ngo_id: row.try_get("ngo_id")?,
                    donation_id: row.try_get("donation_id")?,
                    message: row.try_get("message")?,
                    created_at: parse_timestamp(row.try_get("created_at")?)?,
                    donor_name: row.try_get("donor_name")?,
                    donor_city: row.try_get("donor_city")?,
                    medicine_name: row.try_get("medicine_name")?,
                })
            })
            .collect()
    }

    // ---- audio transcriptions ----

    pub async fn insert_transcription(&self, record: &NewTranscription) -> Result<i64, MedError> {
        let res = sqlx::query(
            r#"INSERT INTO audio_transcriptions
               (filename, filepath, uploader, uploaded_at, transcription)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&record.filename)
        .bind(&record.filepath)
        .bind(&record.uploader)
        .bind(Utc::now().to_rfc3339())
        .bind(&record.transcription)
        .execute(&self.pool)
        .await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn list_transcriptions(&self) -> Result<Vec<AudioTranscription>, MedError> {
        let rows = sqlx::query(
            r#"SELECT id, filename, filepath, uploader, uploaded_at, transcription
               FROM audio_transcriptions ORDER BY id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| -> Result<AudioTranscription, MedError> {
                Ok(AudioTranscription {
                    id: row.try_get("id")?,
                    filename: row.try_get("filename")?,
                    filepath: row.try_get("filepath")?,
                    uploader: row.try_get("uploader")?,
                    uploaded_at: parse_timestamp(row.try_get("uploaded_at")?)?,
                    transcription: row.try_get("transcription")?,
                })
            })
            .collect()
    }

    fn row_to_donation(row: SqliteRow) -> Result<Donation, MedError> {
        let batch_str: String = row.try_get("batch_date")?;
        let expiry_str: Option<String> = row.try_get("expiry_date")?;
        let created_str: String = row.try_get("created_at")?;

        let expiry_date = match expiry_str.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Some(parse_date(s)?),
            _ => None,
        };

        Ok(Donation {
            id: row.try_get("id")?,
            donor_name: row.try_get("donor_name")?,
            donor_city: row.try_get("donor_city")?,
            medicine_name: row.try_get("medicine_name")?,
            batch_date: parse_date(&batch_str)?,
            expiry_date,
            status: row.try_get("status")?,
            matched_ngo_id: row.try_get("matched_ngo_id")?,
            created_at: parse_timestamp(created_str)?,
        })
    }
}

/// Case-insensitive substring filter. Both sides are folded with Unicode
/// lowercasing here, since SQLite's `LOWER()` only folds ASCII.
/// A missing or blank term matches everything.
struct Needle(Option<String>);

impl Needle {
    fn new(term: Option<&str>) -> Self {
        Self(
            term.map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase),
        )
    }

    fn matches(&self, haystack: &str) -> bool {
        match &self.0 {
            Some(needle) => haystack.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, MedError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| MedError::DatabaseError(sqlx::Error::Decode(Box::new(e))))
}

fn parse_timestamp(s: String) -> Result<DateTime<Utc>, MedError> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| MedError::DatabaseError(sqlx::Error::Decode(Box::new(e))))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite:{}", dir.path().join("test.sqlite").display());
        let storage = Storage::connect(&url).await.expect("connect");
        storage.init_schema().await.expect("schema");
        (dir, storage)
    }

    fn ngo(name: &str, city: &str) -> NgoInput {
        NgoInput {
            name: name.to_string(),
            city: city.to_string(),
            contact: String::new(),
            accepts: String::new(),
        }
    }

    fn donation(donor: &str) -> NewDonation {
        NewDonation {
            donor_name: donor.to_string(),
            donor_city: "Pune".to_string(),
            medicine_name: "Paracetamol".to_string(),
            batch_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expiry_date: None,
            matched_ngo_id: None,
        }
    }

    #[test]
    fn needle_folds_case_and_takes_wildcards_literally() {
        assert!(Needle::new(None).matches("anything"));
        assert!(Needle::new(Some("  ")).matches(""));
        assert!(Needle::new(Some("ARI")).matches("Maria"));
        assert!(Needle::new(Some("münchen")).matches("MÜNCHEN"));
        assert!(Needle::new(Some("50%_off")).matches("now 50%_OFF"));
        assert!(!Needle::new(Some("%")).matches("Maria"));
        assert!(!Needle::new(Some("_")).matches("Maria"));
    }

    #[tokio::test]
    async fn schema_init_is_idempotent() {
        let (_dir, storage) = temp_storage().await;
        storage.insert_ngo(&ngo("Janseva", "Delhi")).await.unwrap();
        storage.init_schema().await.unwrap();
        assert_eq!(storage.count_ngos().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn city_match_ignores_case() {
        let (_dir, storage) = temp_storage().await;
        storage.insert_ngo(&ngo("Care for All", "Mumbai")).await.unwrap();
        storage.insert_ngo(&ngo("Navi Care", "Navi Mumbai")).await.unwrap();
        storage.insert_ngo(&ngo("Janseva", "Delhi")).await.unwrap();

        let lower = storage.match_ngos_by_city("mumbai").await.unwrap();
        let upper = storage.match_ngos_by_city("MUMBAI").await.unwrap();
        let title = storage.match_ngos_by_city("Mumbai").await.unwrap();
        assert_eq!(lower.len(), 2);
        assert_eq!(lower, upper);
        assert_eq!(lower, title);
        assert_eq!(lower[0].name, "Care for All");

        assert!(storage.match_ngos_by_city("Chennai").await.unwrap().is_empty());
        assert_eq!(storage.match_ngos_by_city("").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn city_match_folds_non_ascii_letters() {
        let (_dir, storage) = temp_storage().await;
        storage.insert_ngo(&ngo("Tafel", "MÜNCHEN")).await.unwrap();
        storage.insert_ngo(&ngo("Åsa Hjälp", "Örebro")).await.unwrap();
        storage.insert_ngo(&ngo("Janseva", "Delhi")).await.unwrap();

        for query in ["MÜNCHEN", "münchen", "München", "ünch"] {
            let found = storage.match_ngos_by_city(query).await.unwrap();
            assert_eq!(found.len(), 1, "query {query}");
            assert_eq!(found[0].name, "Tafel");
        }
        assert_eq!(storage.match_ngos_by_city("örebro").await.unwrap().len(), 1);

        let by_name = storage
            .list_ngos(&NgoFilter {
                name: Some("åsa".to_string()),
                city: None,
            })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].city, "Örebro");
    }

    #[tokio::test]
    async fn renaming_onto_an_existing_medicine_is_a_validation_error() {
        let (_dir, storage) = temp_storage().await;
        let input = |name: &str, months| ShelfLifeInput {
            medicine_name: name.to_string(),
            shelf_months: months,
            notes: String::new(),
        };
        storage.upsert_shelf_life(&input("Paracetamol", 36)).await.unwrap();
        let ibuprofen = storage.upsert_shelf_life(&input("Ibuprofen", 36)).await.unwrap();

        let clash = storage
            .update_shelf_life(ibuprofen, &input("PARACETAMOL", 12))
            .await;
        assert!(matches!(clash, Err(MedError::Validation(_))));
        assert_eq!(storage.shelf_months_for("Ibuprofen").await.unwrap(), Some(36));

        let renamed = storage
            .update_shelf_life(ibuprofen, &input("Ibuprofen 400mg", 24))
            .await
            .unwrap();
        assert_eq!(renamed, 1);
    }

    #[tokio::test]
    async fn unmatched_filter_hides_claimed_donations() {
        let (_dir, storage) = temp_storage().await;
        let ngo_id = storage.insert_ngo(&ngo("Smile Foundation", "Pune")).await.unwrap();
        let claimed = storage.insert_donation(&donation("Meera")).await.unwrap();
        let open = storage.insert_donation(&donation("Ravi")).await.unwrap();
        storage
            .connect_donation_to_ngo(claimed, ngo_id, "")
            .await
            .unwrap();

        let unmatched = DonationFilter {
            unmatched: true,
            ..Default::default()
        };
        let ids: Vec<i64> = storage
            .list_donations(&unmatched)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![open]);
        assert_eq!(storage.list_donations(&DonationFilter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn donation_limit_applies_after_filtering() {
        let (_dir, storage) = temp_storage().await;
        for name in ["Maria", "Bob", "Mario", "Ben", "Marianne"] {
            storage.insert_donation(&donation(name)).await.unwrap();
        }
        let filter = DonationFilter {
            donor: Some("mari".to_string()),
            limit: Some(2),
            ..Default::default()
        };
        let names: Vec<String> = storage
            .list_donations(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.donor_name)
            .collect();
        assert_eq!(names, vec!["Marianne".to_string(), "Mario".to_string()]);
    }

    #[tokio::test]
    async fn shelf_life_upsert_is_unique_by_name() {
        let (_dir, storage) = temp_storage().await;
        let first = storage
            .upsert_shelf_life(&ShelfLifeInput {
                medicine_name: "Paracetamol".to_string(),
                shelf_months: 36,
                notes: "Common painkiller".to_string(),
            })
            .await
            .unwrap();
        let second = storage
            .upsert_shelf_life(&ShelfLifeInput {
                medicine_name: "paracetamol".to_string(),
                shelf_months: 24,
                notes: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(storage.count_shelf_life().await.unwrap(), 1);
        assert_eq!(storage.shelf_months_for("PARACETAMOL").await.unwrap(), Some(24));
        assert_eq!(storage.shelf_months_for("Aspirin").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unconfirmed_delete_is_a_noop() {
        let (_dir, storage) = temp_storage().await;
        let id = storage.insert_donation(&donation("Ravi")).await.unwrap();

        assert_eq!(storage.delete_donation(id, false).await.unwrap(), 0);
        assert_eq!(storage.count_donations().await.unwrap(), 1);

        assert_eq!(storage.delete_donation(id, true).await.unwrap(), 1);
        assert_eq!(storage.count_donations().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn donor_filter_is_case_insensitive_substring() {
        let (_dir, storage) = temp_storage().await;
        for name in ["Maria", "ARICK", "Sita"] {
            storage.insert_donation(&donation(name)).await.unwrap();
        }
        let filter = DonationFilter {
            donor: Some("ari".to_string()),
            ..Default::default()
        };
        let mut names: Vec<String> = storage
            .list_donations(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.donor_name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["ARICK".to_string(), "Maria".to_string()]);

        let combined = DonationFilter {
            donor: Some("ari".to_string()),
            city: Some("delhi".to_string()),
            ..Default::default()
        };
        assert!(storage.list_donations(&combined).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn connect_links_donation_and_records_history() {
        let (_dir, storage) = temp_storage().await;
        let ngo_id = storage.insert_ngo(&ngo("Smile Foundation", "Pune")).await.unwrap();
        let donation_id = storage.insert_donation(&donation("Meera")).await.unwrap();

        storage
            .connect_donation_to_ngo(donation_id, ngo_id, "We can collect on Monday")
            .await
            .unwrap();

        let stored = storage.get_donation(donation_id).await.unwrap().unwrap();
        assert_eq!(stored.matched_ngo_id, Some(ngo_id));
        assert_eq!(stored.status, STATUS_PLEDGED);

        let history = storage.list_connections_for_ngo(ngo_id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].donor_name.as_deref(), Some("Meera"));

        let missing = storage.connect_donation_to_ngo(donation_id, 999, "").await;
        assert!(matches!(missing, Err(MedError::NotFound("NGO"))));
        let missing = storage.connect_donation_to_ngo(999, ngo_id, "").await;
        assert!(matches!(missing, Err(MedError::NotFound("Donation"))));
        assert_eq!(storage.list_connections_for_ngo(ngo_id).await.unwrap().len(), 1);
    }
}

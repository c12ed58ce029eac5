//! CSV import into the profile table

use std::path::Path;

use expertsearch_common::{Result, SearchError};
use serde::Deserialize;
use tracing::info;

use crate::database::{NewProfile, ProfileDatabase};

/// One row of the embedded profile export
///
/// Column names follow the export header. URL and embedding columns may be
/// absent altogether; empty cells read as `None`.
#[derive(Debug, Deserialize)]
struct ProfileCsvRow {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Category")]
    category: Option<String>,
    #[serde(rename = "Label")]
    label: Option<String>,
    #[serde(rename = "Profile_Chunk")]
    profile: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(rename = "Profile_Embedding", default)]
    profile_embedding: Option<String>,
    #[serde(rename = "Label_Embedding", default)]
    label_embedding: Option<String>,
}

impl From<ProfileCsvRow> for NewProfile {
    fn from(row: ProfileCsvRow) -> Self {
        Self {
            category: row.category,
            name: row.name,
            label: row.label,
            profile: row.profile,
            url: row.url,
            profile_embedding: row.profile_embedding,
            label_embedding: row.label_embedding,
        }
    }
}

/// Read every profile from a CSV export
///
/// Fails on the first malformed record, naming its line.
pub fn read_profiles_csv(path: impl AsRef<Path>) -> Result<Vec<NewProfile>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| SearchError::invalid_input(format!("Cannot read {}: {}", path.display(), e)))?;

    reader
        .deserialize::<ProfileCsvRow>()
        .map(|record| {
            record.map(NewProfile::from).map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                SearchError::invalid_input(format!("{} line {}: {}", path.display(), line, e))
            })
        })
        .collect()
}

impl ProfileDatabase {
    /// Create the database if needed and append every profile from `csv_path`
    ///
    /// The whole file is parsed before anything is written, and rows go in
    /// through a single transaction.
    pub fn import_csv(path: impl AsRef<Path>, csv_path: impl AsRef<Path>) -> Result<(Self, usize)> {
        let profiles = read_profiles_csv(&csv_path)?;
        let db = Self::create(path)?;
        let inserted = db.insert_profiles(&profiles)?;

        info!(
            "Imported {} profiles from {} into {}",
            inserted,
            csv_path.as_ref().display(),
            db.path().display()
        );
        Ok((db, inserted))
    }
}

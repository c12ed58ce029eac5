//! SQLite database layer

use std::path::{Path, PathBuf};

use expertsearch_common::{Result, SearchError};
use expertsearch_vector::{CorpusRow, CorpusSource};
use rusqlite::{params, Connection, OpenFlags};
use tracing::{debug, info, warn};

/// Table holding the expert profile corpus
pub const PROFILE_TABLE: &str = "expert_profiles";

const CREATE_PROFILE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS expert_profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT,
    name TEXT,
    label TEXT,
    profile TEXT,
    url TEXT,
    profile_embedding TEXT,
    label_embedding TEXT
);";

/// Profile row to insert; embeddings are JSON-encoded float arrays
#[derive(Debug, Clone, Default)]
pub struct NewProfile {
    pub category: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub profile: Option<String>,
    pub url: Option<String>,
    pub profile_embedding: Option<String>,
    pub label_embedding: Option<String>,
}

/// Handle to the expert profile database
///
/// Holds only the path; each operation opens its own connection so the
/// handle can be shared across blocking worker threads.
#[derive(Debug, Clone)]
pub struct ProfileDatabase {
    path: PathBuf,
}

impl ProfileDatabase {
    /// Open an existing database; fails if the file or the profile table is missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SearchError::config(format!(
                "Database not found: {}",
                path.display()
            )));
        }

        let db = Self {
            path: path.to_path_buf(),
        };

        let conn = db.connect_read_only()?;
        if !table_exists(&conn, PROFILE_TABLE).map_err(storage_error)? {
            return Err(SearchError::config(format!(
                "Database {} has no {} table",
                path.display(),
                PROFILE_TABLE
            )));
        }

        info!("Profile database opened: {}", path.display());
        Ok(db)
    }

    /// Create the database file and schema if needed
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(storage_error)?;
        conn.execute_batch(CREATE_PROFILE_TABLE).map_err(storage_error)?;

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn connect_read_only(&self) -> Result<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(storage_error)
    }

    /// Insert one profile, returning its id
    pub fn insert_profile(&self, profile: &NewProfile) -> Result<i64> {
        let conn = Connection::open(&self.path).map_err(storage_error)?;
        insert_with(&conn, profile).map_err(storage_error)?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert many profiles in one transaction; nothing is written on failure
    pub fn insert_profiles<'a, I>(&self, profiles: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a NewProfile>,
    {
        let mut conn = Connection::open(&self.path).map_err(storage_error)?;
        let tx = conn.transaction().map_err(storage_error)?;

        let mut inserted = 0;
        for profile in profiles {
            insert_with(&tx, profile).map_err(storage_error)?;
            inserted += 1;
        }

        tx.commit().map_err(storage_error)?;
        info!("Inserted {} profiles into {}", inserted, self.path.display());
        Ok(inserted)
    }

    /// Read all corpus rows in insertion (rowid) order
    ///
    /// Tables created without embedding columns load with every embedding
    /// absent.
    pub fn corpus_rows(&self) -> Result<Vec<CorpusRow>> {
        let conn = self.connect_read_only()?;

        let mut select = Vec::with_capacity(2);
        for column in ["profile_embedding", "label_embedding"] {
            if column_exists(&conn, PROFILE_TABLE, column).map_err(corpus_error)? {
                select.push(column.to_string());
            } else {
                warn!("Column {}.{} not found, treating as empty", PROFILE_TABLE, column);
                select.push(format!("NULL AS {}", column));
            }
        }

        let sql = format!(
            "SELECT rowid, category, name, label, profile, url, {}, {}
             FROM {} ORDER BY rowid",
            select[0], select[1], PROFILE_TABLE
        );

        let mut stmt = conn.prepare(&sql).map_err(corpus_error)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CorpusRow {
                    id: row.get(0)?,
                    category: row.get(1)?,
                    name: row.get(2)?,
                    label: row.get(3)?,
                    profile_text: row.get(4)?,
                    url: row.get(5)?,
                    profile_embedding: row.get(6)?,
                    label_embedding: row.get(7)?,
                })
            })
            .map_err(corpus_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(corpus_error)?;

        debug!("Read {} corpus rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

impl CorpusSource for ProfileDatabase {
    fn load_rows(&self) -> Result<Vec<CorpusRow>> {
        self.corpus_rows()
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

fn insert_with(conn: &Connection, profile: &NewProfile) -> rusqlite::Result<usize> {
    conn.prepare_cached(
        "INSERT INTO expert_profiles
            (category, name, label, profile, url, profile_embedding, label_embedding)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?
    .execute(params![
        profile.category,
        profile.name,
        profile.label,
        profile.profile,
        profile.url,
        profile.profile_embedding,
        profile.label_embedding,
    ])
}

fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names.iter().any(|name| name == column))
}

pub(crate) fn storage_error(e: rusqlite::Error) -> SearchError {
    SearchError::storage(e.to_string())
}

fn corpus_error(e: rusqlite::Error) -> SearchError {
    SearchError::corpus_load(format!("failed to read corpus: {}", e))
}

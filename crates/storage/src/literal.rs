//! Literal (substring) search over the profile table

use expertsearch_common::{Result, SearchError};
use expertsearch_vector::{truncate_for_display, LiteralRecord};
use tracing::{debug, info};

use crate::database::{storage_error, ProfileDatabase};

const LITERAL_SEARCH_SQL: &str = "
SELECT COALESCE(name, ''), COALESCE(category, ''), COALESCE(label, ''), COALESCE(profile, ''), url
FROM expert_profiles
WHERE name LIKE ?1 ESCAPE '\\'
   OR label LIKE ?1 ESCAPE '\\'
   OR profile LIKE ?1 ESCAPE '\\'
ORDER BY rowid";

impl ProfileDatabase {
    /// Case-insensitive substring search over name, label and profile
    ///
    /// Profile text is truncated to `max_chars` characters for display.
    /// SQLite work runs on the blocking thread pool.
    pub async fn literal_search(&self, query: &str, max_chars: usize) -> Result<Vec<LiteralRecord>> {
        let db = self.clone();
        let query = query.to_string();
        tokio::task::spawn_blocking(move || db.literal_search_blocking(&query, max_chars))
            .await
            .map_err(|e| SearchError::internal(format!("literal search task failed: {}", e)))?
    }

    /// Synchronous variant of [`ProfileDatabase::literal_search`]
    pub fn literal_search_blocking(&self, query: &str, max_chars: usize) -> Result<Vec<LiteralRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        debug!("Literal search: {:?}", query);

        let pattern = like_pattern(query);
        let conn = self.connect_read_only()?;
        let mut stmt = conn.prepare(LITERAL_SEARCH_SQL).map_err(storage_error)?;
        let records = stmt
            .query_map([&pattern], |row| {
                let profile: String = row.get(3)?;
                Ok(LiteralRecord {
                    name: row.get(0)?,
                    category: row.get(1)?,
                    label: row.get(2)?,
                    profile_text: truncate_for_display(&profile, max_chars),
                    url: row.get(4)?,
                })
            })
            .map_err(storage_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage_error)?;

        info!("Literal search completed - {} results", records.len());
        Ok(records)
    }
}

/// `%query%` with LIKE wildcards in the query matched literally
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

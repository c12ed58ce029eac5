use chrono::{DateTime, Utc};
use expertsearch_common::{Result, SearchError};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::types::{CorpusIntegrityWarning, CorpusRow, Document, DocumentId, StoreStats};

/// Anything that can hand over the full corpus as rows
pub trait CorpusSource {
    /// Read every corpus row, in insertion order
    fn load_rows(&self) -> Result<Vec<CorpusRow>>;

    /// Human-readable description for logs
    fn describe(&self) -> String {
        "in-memory corpus".to_string()
    }
}

impl CorpusSource for Vec<CorpusRow> {
    fn load_rows(&self) -> Result<Vec<CorpusRow>> {
        Ok(self.clone())
    }
}

/// Immutable, read-only corpus of documents and their embeddings
///
/// Built once at startup and shared between request handlers behind an
/// `Arc`; nothing mutates it after construction.
#[derive(Debug)]
pub struct EmbeddingStore {
    documents: Vec<Document>,
    positions: HashMap<DocumentId, usize>,
    dimension: Option<usize>,
    warnings: Vec<CorpusIntegrityWarning>,
    loaded_at: DateTime<Utc>,
}

impl EmbeddingStore {
    /// Load the whole corpus from `source`
    ///
    /// Either every row is accepted or the load fails; no partial store is
    /// ever returned. When `expected_dim` is set every embedding must have
    /// exactly that many components.
    pub fn load<S: CorpusSource + ?Sized>(source: &S, expected_dim: Option<usize>) -> Result<Self> {
        info!("Loading corpus from {}", source.describe());
        let rows = source.load_rows()?;
        Self::from_rows(rows, expected_dim)
    }

    /// Build a store from already fetched rows
    pub fn from_rows(rows: Vec<CorpusRow>, expected_dim: Option<usize>) -> Result<Self> {
        let mut documents = Vec::with_capacity(rows.len());
        let mut positions = HashMap::with_capacity(rows.len());
        let mut dimension = DimensionCheck::new(expected_dim);
        let mut warnings = Vec::new();

        for row in rows {
            if positions.contains_key(&row.id) {
                return Err(SearchError::corpus_load(format!("duplicate document id {}", row.id)));
            }

            let document = parse_row(row, &mut dimension)?;

            if !document.is_rankable() {
                let reason = if document.label_embedding.is_some() {
                    "missing profile embedding (label embedding only)"
                } else {
                    "missing profile embedding"
                };
                warn!(
                    "Document {} ({}) excluded from vector search: {}",
                    document.id, document.name, reason
                );
                warnings.push(CorpusIntegrityWarning {
                    document_id: document.id,
                    name: document.name.clone(),
                    reason: reason.to_string(),
                });
            }

            positions.insert(document.id, documents.len());
            documents.push(document);
        }

        let store = Self {
            documents,
            positions,
            dimension: dimension.value,
            warnings,
            loaded_at: Utc::now(),
        };

        info!(
            "Embedding store loaded - {} documents, {} ranked, dimension {:?}, {} warnings",
            store.len(),
            store.ranked_count(),
            store.dimension,
            store.warnings.len()
        );

        Ok(store)
    }

    /// Store with no documents
    pub fn empty() -> Self {
        Self {
            documents: Vec::new(),
            positions: HashMap::new(),
            dimension: None,
            warnings: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Look up a document by id
    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.positions.get(&id).map(|&pos| &self.documents[pos])
    }

    /// All documents, in source insertion order
    pub fn all_documents(&self) -> &[Document] {
        &self.documents
    }

    /// Embedding dimensionality shared by the corpus (None if no embeddings)
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of documents taking part in vector ranking
    pub fn ranked_count(&self) -> usize {
        self.documents.iter().filter(|d| d.is_rankable()).count()
    }

    /// Documents excluded from ranking at load time
    pub fn warnings(&self) -> &[CorpusIntegrityWarning] {
        &self.warnings
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            total_documents: self.len(),
            ranked_documents: self.ranked_count(),
            label_embeddings: self
                .documents
                .iter()
                .filter(|d| d.label_embedding.is_some())
                .count(),
            dimension: self.dimension,
            warnings: self.warnings.len(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Tracks the corpus-wide embedding dimensionality during a load
struct DimensionCheck {
    value: Option<usize>,
    configured: bool,
}

impl DimensionCheck {
    fn new(expected: Option<usize>) -> Self {
        Self {
            value: expected,
            configured: expected.is_some(),
        }
    }

    fn check(&mut self, id: DocumentId, field: &str, len: usize) -> Result<()> {
        match self.value {
            None => {
                self.value = Some(len);
                Ok(())
            }
            Some(expected) if expected == len => Ok(()),
            Some(expected) => Err(SearchError::corpus_load(format!(
                "document {}: {} has dimension {}, expected {} ({})",
                id,
                field,
                len,
                expected,
                if self.configured { "configured" } else { "first embedding in corpus" }
            ))),
        }
    }
}

fn parse_row(row: CorpusRow, dimension: &mut DimensionCheck) -> Result<Document> {
    let id = row.id;
    let required = |value: Option<String>, field: &str| {
        value.ok_or_else(|| {
            SearchError::corpus_load(format!("document {}: required field '{}' is missing", id, field))
        })
    };

    let name = required(row.name, "name")?;
    let category = required(row.category, "category")?;
    // NULL label/profile read as empty, as literal search does
    let label = row.label.unwrap_or_default();
    let profile_text = row.profile_text.unwrap_or_default();

    let profile_embedding = parse_embedding_field(id, "profile_embedding", row.profile_embedding.as_deref(), dimension)?;
    let label_embedding = parse_embedding_field(id, "label_embedding", row.label_embedding.as_deref(), dimension)?;

    Ok(Document {
        id,
        category,
        name,
        label,
        profile_text,
        url: row.url,
        profile_embedding,
        label_embedding,
    })
}

fn parse_embedding_field(
    id: DocumentId,
    field: &str,
    raw: Option<&str>,
    dimension: &mut DimensionCheck,
) -> Result<Option<Vec<f32>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let vector = parse_embedding(raw)
        .map_err(|e| SearchError::corpus_load(format!("document {}: invalid {}: {}", id, field, e)))?;

    if let Some(vector) = &vector {
        dimension.check(id, field, vector.len())?;
    }

    Ok(vector)
}

/// Parse a JSON-encoded float array
///
/// Blank text and JSON `null` mean "no embedding". Anything else must be a
/// non-empty array of finite numbers representable as `f32`.
pub fn parse_embedding(raw: &str) -> std::result::Result<Option<Vec<f32>>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let values: Option<Vec<f64>> =
        serde_json::from_str(trimmed).map_err(|e| format!("not a JSON number array: {}", e))?;

    let Some(values) = values else {
        return Ok(None);
    };

    if values.is_empty() {
        return Err("embedding array is empty".to_string());
    }

    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let narrowed = v as f32;
            if narrowed.is_finite() {
                Ok(narrowed)
            } else {
                Err(format!("component {} ({}) is not a finite f32", i, v))
            }
        })
        .collect::<std::result::Result<Vec<f32>, String>>()
        .map(Some)
}

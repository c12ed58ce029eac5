//! Result normalization for external consumption

use crate::types::{Document, ScoredCandidate, SemanticRecord};

/// Marker appended to text cut by [`truncate_for_display`]
pub const TRUNCATION_MARKER: &str = "...";

/// Replace a non-finite score (NaN, ±inf) with 0.0
pub fn sanitize_score(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Sanitize then clamp a similarity into [0, 1]
///
/// Cosine similarity can drift slightly past 1.0 through rounding, and
/// negative similarities carry no meaning for display; both are clamped.
pub fn normalize_similarity(raw: f32) -> f32 {
    sanitize_score(raw).clamp(0.0, 1.0)
}

/// Cut `text` to at most `max_chars` characters, appending the marker when cut
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut truncated = String::with_capacity(byte_idx + TRUNCATION_MARKER.len());
            truncated.push_str(&text[..byte_idx]);
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => text.to_string(),
    }
}

/// Build the external record for a ranked candidate
///
/// The score is the candidate's already normalized similarity; profile text
/// is returned in full on this path.
pub fn to_semantic_record(candidate: &ScoredCandidate, document: &Document) -> SemanticRecord {
    SemanticRecord {
        name: document.name.clone(),
        category: document.category.clone(),
        label: document.label.clone(),
        profile_text: document.profile_text.clone(),
        similarity: candidate.normalized_similarity,
    }
}

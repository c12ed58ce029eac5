use std::cmp::Ordering;
use tracing::debug;

use crate::normalize::normalize_similarity;
use crate::similarity::cosine_similarity;
use crate::store::EmbeddingStore;
use crate::types::{RankingPolicy, ScoredCandidate};

/// Rank every document with a profile embedding against `query`
///
/// Profile similarity is the only ranking score. Label similarity is
/// computed and attached to each candidate but not blended in. Documents
/// without a profile embedding never become candidates. The sort is stable,
/// so equal scores keep the store's insertion order.
pub fn rank(query: &[f32], store: &EmbeddingStore, policy: &RankingPolicy) -> Vec<ScoredCandidate> {
    let mut candidates: Vec<ScoredCandidate> = store
        .all_documents()
        .iter()
        .filter_map(|doc| {
            let profile = doc.profile_embedding.as_deref()?;
            let raw = cosine_similarity(query, profile);
            Some(ScoredCandidate {
                document_id: doc.id,
                raw_similarity: raw,
                normalized_similarity: normalize_similarity(raw),
                label_similarity: doc
                    .label_embedding
                    .as_deref()
                    .map(|label| cosine_similarity(query, label)),
            })
        })
        .filter(|c| match policy.min_similarity {
            Some(floor) => c.raw_similarity >= floor,
            None => true,
        })
        .collect();

    let considered = candidates.len();
    candidates.sort_by(|a, b| compare_scores(b.raw_similarity, a.raw_similarity));
    candidates.truncate(policy.top_k);

    debug!(
        "Ranked {} candidates, kept {} (top_k={}, min_similarity={:?})",
        considered,
        candidates.len(),
        policy.top_k,
        policy.min_similarity
    );

    candidates
}

/// Total order on scores with non-finite values below every finite one
fn compare_scores(a: f32, b: f32) -> Ordering {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => a.total_cmp(&b),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => Ordering::Equal,
    }
}

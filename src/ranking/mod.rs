pub mod expansion;
pub mod keyword;
pub mod similarity;

use std::cmp::Ordering;

use crate::core::{Advert, ScoredAdvert};
use crate::error::Result;

pub use expansion::{QueryExpander, SynonymTable};
pub use keyword::{rank, KeywordRanker};
pub use similarity::{similarity, Recommender, SimilarityBreakdown};

/// Queries shorter than this (after trimming) leave rankers and expanders inert
pub const MIN_QUERY_CHARS: usize = 2;

/// Trait for free-text ranking implementations
pub trait Ranker: Send + Sync {
    /// Rank candidates against query, return sorted by score (highest first)
    fn rank(&self, query: &str, candidates: &[Advert]) -> Result<Vec<ScoredAdvert>>;

    /// Query variants the ranker matches on, for reporting; empty when it does not expand
    fn expanded_terms(&self, _query: &str) -> Vec<String> {
        Vec::new()
    }

    /// Get ranker name for logging
    fn name(&self) -> &str;
}

/// True when the trimmed query is too short to rank or expand
pub(crate) fn is_trivial_query(query: &str) -> bool {
    query.trim().chars().count() < MIN_QUERY_CHARS
}

/// Stable descending sort by score; equal scores keep input order.
pub(crate) fn sort_by_score_desc(scored: &mut [ScoredAdvert]) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

use serde::{Deserialize, Serialize};
use crate::core::Advert;

/// Where the advert collection behind a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvertSource {
    /// Remote backend API
    Remote,
    /// Local demo store (fallback)
    Store,
}

/// Advert with the score it was ranked by
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredAdvert {
    pub advert: Advert,
    pub score: f64,
}

impl ScoredAdvert {
    pub fn new(advert: Advert, score: f64) -> Self {
        Self { advert, score }
    }
}

/// Search response with ranked adverts and metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Adverts in display order
    pub adverts: Vec<ScoredAdvert>,

    /// Size of the fetched collection before filtering
    pub total: usize,

    /// Adverts that survived filters and ranking, before the limit
    pub matched: usize,

    /// Query variants produced by synonym expansion
    #[serde(default)]
    pub expanded_terms: Vec<String>,

    pub source: AdvertSource,

    /// Provider name, or "store"
    pub provider: String,

    /// Search latency in milliseconds
    pub latency_ms: f64,

    /// Ranking method used
    pub ranking_method: String,
}

impl SearchResponse {
    /// Create a new search response
    pub fn new(adverts: Vec<ScoredAdvert>, total: usize, source: AdvertSource, provider: impl Into<String>) -> Self {
        let matched = adverts.len();
        Self {
            adverts,
            total,
            matched,
            expanded_terms: Vec::new(),
            source,
            provider: provider.into(),
            latency_ms: 0.0,
            ranking_method: String::from("unknown"),
        }
    }

    /// Set ranking method
    pub fn with_ranking_method(mut self, method: impl Into<String>) -> Self {
        self.ranking_method = method.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.adverts.is_empty()
    }

    /// Names of the returned adverts, in order
    pub fn names(&self) -> Vec<&str> {
        self.adverts.iter().map(|a| a.advert.name.as_str()).collect()
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        format!(
            "{} of {} adverts ({}) [{}] {:.2}ms",
            self.adverts.len(),
            self.total,
            self.provider,
            self.ranking_method,
            self.latency_ms
        )
    }
}

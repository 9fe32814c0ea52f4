//! # BiteBridge Advert Engine
//!
//! Search and recommendation engine for the BiteBridge food marketplace:
//! - Pairwise advert similarity for "related" / "recommended" panels
//! - Synonym-expanded keyword ranking for free-text search
//! - Browse filters and sort orders
//! - Backend API provider with a SQLite demo store as fallback
//! - Multiple interfaces: Rust library, HTTP API, CLI
//!
//! ## Example Usage
//!
//! ```rust
//! use bitebridge_engine::{rank, similarity, Advert};
//!
//! let mut jollof = Advert::new("a1", "Spicy Jollof");
//! jollof.description = "affordable party jollof".to_string();
//! jollof.category = "Main Course".to_string();
//! let waakye = Advert::new("a2", "Waakye Special");
//!
//! let results = rank("cheap jollof", &[jollof.clone(), waakye]);
//! assert_eq!(results[0].name, "Spicy Jollof");
//! assert!(similarity(&jollof, &jollof) > 0.0);
//! ```
//!
//! ```rust,no_run
//! use bitebridge_engine::{Marketplace, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let market = Marketplace::new("bitebridge.db").await?;
//!     let response = market.search(SearchQuery::new("waakye")).await?;
//!
//!     for hit in &response.adverts {
//!         println!("{} - {:.1}", hit.advert.name, hit.score);
//!     }
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod config;
pub mod filter;
pub mod store;
pub mod ranking;
pub mod providers;
pub mod engine;
pub mod error;

// Re-export primary types
pub use self::core::{Advert, AdvertCollection, AdvertSource, ScoredAdvert, SearchResponse, SpicinessLevel};
pub use config::MarketConfig;
pub use engine::{Marketplace, SearchQuery, VendorStats};
pub use error::{MarketError, Result};
pub use filter::{AdvertFilter, SortOrder, StatusFilter};
pub use ranking::{rank, similarity, KeywordRanker, QueryExpander, Recommender, SynonymTable};
pub use store::{AdvertStore, SqliteStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::config::MarketConfig;
use crate::core::{Advert, AdvertSource, ScoredAdvert, SearchResponse};
use crate::filter::{AdvertFilter, SortOrder};
use crate::providers::{AdvertProvider, BackendProvider};
use crate::ranking::{KeywordRanker, QueryExpander, Ranker, Recommender, SynonymTable};
use crate::store::{AdvertStore, AdvertUpdate, NewAdvert, SqliteStore, StoreStats};
use crate::error::{Result, MarketError};

/// Marketplace orchestrator: remote providers first, local store as fallback
pub struct Marketplace {
    store: Arc<dyn AdvertStore>,
    ranker: Arc<dyn Ranker>,
    recommender: Recommender,
    providers: Vec<Arc<dyn AdvertProvider>>,
}

/// Search query parameters
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub query: String,
    pub filter: AdvertFilter,
    pub sort: SortOrder,
    /// `None` returns every match
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

/// Advert collection together with where it came from
#[derive(Debug, Clone)]
pub struct FetchedAdverts {
    pub adverts: Vec<Advert>,
    pub source: AdvertSource,
    pub provider: String,
}

/// Per-vendor dashboard numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorStats {
    pub owner_id: String,
    pub total_adverts: usize,
    pub active_adverts: usize,
    /// Mean price over active adverts, 0 when there are none
    pub average_price: f64,
    pub categories: BTreeMap<String, usize>,
}

impl Marketplace {
    /// Create new marketplace backed by a SQLite demo store
    pub async fn new(db_path: impl AsRef<str>) -> Result<Self> {
        let store = Arc::new(SqliteStore::new(db_path.as_ref()).await?);
        Ok(Self::with_store(store))
    }

    /// Build the store and, when a backend URL is configured, the backend provider
    pub async fn from_config(config: &MarketConfig) -> Result<Self> {
        let mut market = Self::new(&config.db_path)
            .await?
            .with_recommender(Recommender::new(config.recommendation_limit));

        if let Some(url) = &config.backend_url {
            let backend = BackendProvider::new(url.as_str(), config.request_timeout(), config.api_token.clone())?;
            tracing::info!("Backend provider configured at {}", backend.base_url());
            market.add_provider(Arc::new(backend));
        } else {
            tracing::info!("No backend URL configured, serving the local demo store");
        }

        Ok(market)
    }

    pub fn with_store(store: Arc<dyn AdvertStore>) -> Self {
        Self {
            store,
            ranker: Arc::new(KeywordRanker::new()),
            recommender: Recommender::default(),
            providers: Vec::new(),
        }
    }

    /// Keyword ranking with a custom synonym table
    pub fn with_synonyms(mut self, table: SynonymTable) -> Self {
        self.ranker = Arc::new(KeywordRanker::with_expander(QueryExpander::new(table)));
        self
    }

    /// Replace the ranker; reported expansions come from the new ranker
    pub fn with_ranker(mut self, ranker: Arc<dyn Ranker>) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn with_recommender(mut self, recommender: Recommender) -> Self {
        self.recommender = recommender;
        self
    }

    /// Add an advert provider; providers are tried in insertion order
    pub fn add_provider(&mut self, provider: Arc<dyn AdvertProvider>) {
        self.providers.push(provider);
    }

    /// Fetch the advert collection from the first provider that answers,
    /// falling back to the local store.
    pub async fn fetch_adverts(&self) -> Result<FetchedAdverts> {
        for provider in &self.providers {
            match provider.list_adverts().await {
                Ok(adverts) => {
                    tracing::debug!("Provider {} returned {} adverts", provider.name(), adverts.len());
                    return Ok(FetchedAdverts {
                        adverts,
                        source: AdvertSource::Remote,
                        provider: provider.name().to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Provider {} failed, trying next source: {}", provider.name(), e);
                }
            }
        }

        let adverts = self.store.list().await?;
        tracing::debug!("Local store returned {} adverts", adverts.len());

        Ok(FetchedAdverts {
            adverts,
            source: AdvertSource::Store,
            provider: "store".to_string(),
        })
    }

    /// Search adverts: fetch, filter, rank, sort, limit
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResponse> {
        let start = Instant::now();

        let fetched = self.fetch_adverts().await?;
        let total = fetched.adverts.len();

        let candidates = query.filter.apply(fetched.adverts);
        let mut ranked = self.ranker.rank(&query.query, &candidates)?;
        query.sort.sort(&mut ranked);

        let matched = ranked.len();
        if let Some(limit) = query.limit {
            ranked.truncate(limit);
        }

        let expanded_terms = self.ranker.expanded_terms(&query.query);

        let mut response = SearchResponse::new(ranked, total, fetched.source, fetched.provider)
            .with_ranking_method(self.ranker.name());
        response.matched = matched;
        response.expanded_terms = expanded_terms;
        response.latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        tracing::debug!("Search '{}': {}", query.query, response.display());

        Ok(response)
    }

    /// Get a single advert, providers first
    pub async fn get_advert(&self, id: &str) -> Result<Advert> {
        for provider in &self.providers {
            match provider.get_by_id(id).await {
                Ok(advert) => return Ok(advert),
                Err(e) => {
                    tracing::warn!("Provider {} could not load advert {}: {}", provider.name(), id, e);
                }
            }
        }

        self.store
            .get(id)
            .await?
            .ok_or_else(|| MarketError::NotFound(id.to_string()))
    }

    /// Adverts most similar to advert `id`
    pub async fn recommendations(&self, id: &str, limit: Option<usize>) -> Result<Vec<ScoredAdvert>> {
        let fetched = self.fetch_adverts().await?;

        let target = fetched
            .adverts
            .iter()
            .find(|ad| ad.id == id)
            .cloned()
            .ok_or_else(|| MarketError::NotFound(id.to_string()))?;

        let recommender = limit.map(Recommender::new).unwrap_or(self.recommender);
        Ok(recommender.recommend(&target, &fetched.adverts))
    }

    /// Dashboard statistics for one vendor
    pub async fn vendor_stats(&self, owner_id: &str) -> Result<VendorStats> {
        let fetched = self.fetch_adverts().await?;
        let owned = AdvertFilter::new().with_owner(owner_id).apply(fetched.adverts);

        let active: Vec<&Advert> = owned.iter().filter(|ad| ad.is_available).collect();
        let average_price = if active.is_empty() {
            0.0
        } else {
            active.iter().map(|ad| ad.price).sum::<f64>() / active.len() as f64
        };

        let mut categories = BTreeMap::new();
        for advert in owned.iter().filter(|ad| !ad.category.is_empty()) {
            *categories.entry(advert.category.clone()).or_insert(0) += 1;
        }

        Ok(VendorStats {
            owner_id: owner_id.to_string(),
            total_adverts: owned.len(),
            active_adverts: active.len(),
            average_price,
            categories,
        })
    }

    /// Validate and publish an advert, providers first, local store as fallback
    pub async fn create_advert(&self, advert: NewAdvert) -> Result<Advert> {
        advert.validate()?;

        for provider in &self.providers {
            match provider.create_advert(&advert).await {
                Ok(created) => {
                    tracing::info!("Provider {} created advert {}", provider.name(), created.id);
                    return Ok(created);
                }
                Err(e) => {
                    tracing::warn!("Provider {} could not create advert, trying next source: {}", provider.name(), e);
                }
            }
        }

        self.store.create(advert).await
    }

    /// Validate and apply a partial update, providers first, local store as fallback
    pub async fn update_advert(&self, id: &str, changes: AdvertUpdate) -> Result<Advert> {
        changes.validate()?;

        for provider in &self.providers {
            match provider.update_advert(id, &changes).await {
                Ok(updated) => return Ok(updated),
                Err(e) => {
                    tracing::warn!("Provider {} could not update advert {}: {}", provider.name(), id, e);
                }
            }
        }

        self.store.update(id, changes).await
    }

    /// Delete from the first source that has the advert
    pub async fn delete_advert(&self, id: &str) -> Result<bool> {
        for provider in &self.providers {
            match provider.delete_advert(id).await {
                Ok(true) => return Ok(true),
                Ok(false) => {
                    tracing::debug!("Provider {} has no advert {}", provider.name(), id);
                }
                Err(e) => {
                    tracing::warn!("Provider {} could not delete advert {}: {}", provider.name(), id, e);
                }
            }
        }

        self.store.delete(id).await
    }

    /// Get local store statistics
    pub async fn store_stats(&self) -> Result<StoreStats> {
        self.store.stats().await
    }
}

pub mod backend;

use async_trait::async_trait;
use crate::core::Advert;
use crate::error::Result;
use crate::store::{AdvertUpdate, NewAdvert};

pub use backend::BackendProvider;

/// Trait for remote advert sources (the BiteBridge backend API)
#[async_trait]
pub trait AdvertProvider: Send + Sync {
    /// Fetch the full advert collection
    async fn list_adverts(&self) -> Result<Vec<Advert>>;

    /// Get advert by ID
    async fn get_by_id(&self, id: &str) -> Result<Advert>;

    /// Publish a new advert
    async fn create_advert(&self, advert: &NewAdvert) -> Result<Advert>;

    /// Apply a partial update; unknown ids are `NotFound`
    async fn update_advert(&self, id: &str, changes: &AdvertUpdate) -> Result<Advert>;

    /// Remove an advert, returning whether the provider had it
    async fn delete_advert(&self, id: &str) -> Result<bool>;

    /// Get provider name
    fn name(&self) -> &str;

    /// Check if provider is reachable
    async fn is_available(&self) -> bool;
}

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::core::{Advert, AdvertCollection};
use crate::providers::AdvertProvider;
use crate::store::{AdvertUpdate, NewAdvert};
use crate::error::{Result, MarketError};

const PROVIDER_NAME: &str = "backend";

/// BiteBridge backend API provider
pub struct BackendProvider {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl BackendProvider {
    /// Create new backend provider
    pub fn new(base_url: impl Into<String>, timeout: Duration, api_token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url, api_token })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/api/advertisements", self.base_url)
    }

    fn advert_url(&self, id: &str) -> String {
        format!("{}/api/advertisements/{}", self.base_url, urlencoding::encode(id))
    }

    fn food_url(&self) -> String {
        format!("{}/food", self.base_url)
    }

    fn food_item_url(&self, id: &str) -> String {
        format!("{}/food/{}", self.base_url, urlencoding::encode(id))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn provider_error(message: String) -> MarketError {
        MarketError::Provider {
            provider: PROVIDER_NAME.to_string(),
            message,
        }
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
        self.authorized(request)
            .send()
            .await
            .map_err(|e| Self::provider_error(format!("{} request failed: {}", action, e)))
    }
}

/// Advert echoed back by a write endpoint, bare or under `data`.
/// Bodies without a usable id yield `None`.
fn returned_advert(body: Value) -> Option<Advert> {
    let record = match body {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => map.remove("data")?,
        other => other,
    };

    serde_json::from_value::<Advert>(record)
        .ok()
        .filter(|advert| !advert.id.is_empty())
}

#[async_trait]
impl AdvertProvider for BackendProvider {
    async fn list_adverts(&self) -> Result<Vec<Advert>> {
        let response = self
            .authorized(self.client.get(self.collection_url()))
            .send()
            .await
            .map_err(|e| Self::provider_error(format!("List request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::provider_error(format!("HTTP {}", response.status())));
        }

        let collection: AdvertCollection = response
            .json()
            .await
            .map_err(|e| Self::provider_error(format!("Invalid JSON: {}", e)))?;

        tracing::debug!("Backend returned {} adverts", collection.len());

        Ok(collection.into_adverts())
    }

    async fn get_by_id(&self, id: &str) -> Result<Advert> {
        let response = self
            .authorized(self.client.get(self.advert_url(id)))
            .send()
            .await
            .map_err(|e| Self::provider_error(format!("Details request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(MarketError::NotFound(id.to_string()));
        }

        if !response.status().is_success() {
            return Err(Self::provider_error(format!("HTTP {}", response.status())));
        }

        response
            .json::<Advert>()
            .await
            .map_err(|e| Self::provider_error(format!("Invalid JSON: {}", e)))
    }

    async fn create_advert(&self, advert: &NewAdvert) -> Result<Advert> {
        let response = self
            .send(self.client.post(self.food_url()).json(advert), "Create")
            .await?;

        if !response.status().is_success() {
            return Err(Self::provider_error(format!("HTTP {}", response.status())));
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(returned_advert(body).unwrap_or_else(|| {
            tracing::debug!("Backend accepted '{}' without echoing the advert", advert.name);
            advert.clone().into_advert(String::new(), Utc::now())
        }))
    }

    async fn update_advert(&self, id: &str, changes: &AdvertUpdate) -> Result<Advert> {
        let response = self
            .send(self.client.put(self.food_item_url(id)).json(changes), "Update")
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(MarketError::NotFound(id.to_string()));
        }

        if !response.status().is_success() {
            return Err(Self::provider_error(format!("HTTP {}", response.status())));
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        match returned_advert(body) {
            Some(advert) => Ok(advert),
            None => self.get_by_id(id).await,
        }
    }

    async fn delete_advert(&self, id: &str) -> Result<bool> {
        let response = self
            .send(self.client.delete(self.food_item_url(id)), "Delete")
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(Self::provider_error(format!("HTTP {}", status))),
        }
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn is_available(&self) -> bool {
        match self.authorized(self.client.get(self.collection_url())).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Backend health check failed: {}", e);
                false
            }
        }
    }
}

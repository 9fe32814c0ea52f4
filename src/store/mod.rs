pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Advert, SpicinessLevel};
use crate::error::{MarketError, Result};

pub use sqlite::SqliteStore;

/// Trait for local advert stores (demo fallback when the backend is unreachable)
#[async_trait]
pub trait AdvertStore: Send + Sync {
    /// All adverts in insertion order
    async fn list(&self) -> Result<Vec<Advert>>;

    /// Get advert by id
    async fn get(&self, id: &str) -> Result<Option<Advert>>;

    /// Insert a new advert, returning it with its generated id
    async fn create(&self, advert: NewAdvert) -> Result<Advert>;

    /// Apply a partial update; unknown ids are `NotFound`
    async fn update(&self, id: &str, changes: AdvertUpdate) -> Result<Advert>;

    /// Remove an advert, returning whether it existed
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Get store statistics
    async fn stats(&self) -> Result<StoreStats>;
}

pub const MIN_TITLE_CHARS: usize = 3;
pub const MIN_DESCRIPTION_CHARS: usize = 10;
/// Upper price bound (GHS)
pub const MAX_PRICE: f64 = 10_000.0;

fn check_title(title: &str, errors: &mut Vec<String>) {
    let title = title.trim();
    if title.is_empty() {
        errors.push("Advert title is required".to_string());
    } else if title.chars().count() < MIN_TITLE_CHARS {
        errors.push(format!("Advert title must be at least {} characters", MIN_TITLE_CHARS));
    }
}

fn check_description(description: &str, errors: &mut Vec<String>) {
    let description = description.trim();
    if description.is_empty() {
        errors.push("Description is required".to_string());
    } else if description.chars().count() < MIN_DESCRIPTION_CHARS {
        errors.push(format!("Description must be at least {} characters", MIN_DESCRIPTION_CHARS));
    }
}

fn check_price(price: f64, errors: &mut Vec<String>) {
    if !price.is_finite() || price <= 0.0 {
        errors.push("Price must be greater than 0".to_string());
    } else if price > MAX_PRICE {
        errors.push(format!("Price cannot exceed {}", MAX_PRICE));
    }
}

fn check_category(category: &str, errors: &mut Vec<String>) {
    if category.trim().is_empty() {
        errors.push("Please select a category".to_string());
    }
}

fn into_result(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(MarketError::Validation(errors.join("; ")))
    }
}

/// Fields a vendor fills in when posting an advert
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdvert {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub dietary_information: String,
    #[serde(default)]
    pub spiciness_level: Option<SpicinessLevel>,
    #[serde(default)]
    pub preparation_time: Option<u32>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub image: String,
}

fn default_available() -> bool {
    true
}

impl NewAdvert {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: String::new(),
            price,
            dietary_information: String::new(),
            spiciness_level: None,
            preparation_time: None,
            is_available: true,
            owner_id: None,
            image: String::new(),
        }
    }

    /// Reject adverts the vendor form would not accept; all problems are reported together
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        check_title(&self.name, &mut errors);
        check_description(&self.description, &mut errors);
        check_price(self.price, &mut errors);
        check_category(&self.category, &mut errors);
        into_result(errors)
    }

    pub(crate) fn into_advert(self, id: String, created_at: DateTime<Utc>) -> Advert {
        Advert {
            id,
            name: self.name,
            description: self.description,
            category: self.category,
            price: self.price.max(0.0),
            dietary_information: self.dietary_information,
            spiciness_level: self.spiciness_level,
            preparation_time: self.preparation_time,
            is_available: self.is_available,
            owner_id: self.owner_id,
            created_at: Some(created_at),
            image: self.image,
        }
    }
}

/// Partial advert update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvertUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dietary_information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spiciness_level: Option<SpicinessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preparation_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl AdvertUpdate {
    /// Same rules as [`NewAdvert::validate`], applied to the fields being changed
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            check_title(name, &mut errors);
        }
        if let Some(description) = &self.description {
            check_description(description, &mut errors);
        }
        if let Some(price) = self.price {
            check_price(price, &mut errors);
        }
        if let Some(category) = &self.category {
            check_category(category, &mut errors);
        }
        into_result(errors)
    }

    pub(crate) fn apply_to(self, advert: &mut Advert) {
        if let Some(name) = self.name {
            advert.name = name;
        }
        if let Some(description) = self.description {
            advert.description = description;
        }
        if let Some(category) = self.category {
            advert.category = category;
        }
        if let Some(price) = self.price {
            advert.price = price.max(0.0);
        }
        if let Some(dietary) = self.dietary_information {
            advert.dietary_information = dietary;
        }
        if self.spiciness_level.is_some() {
            advert.spiciness_level = self.spiciness_level;
        }
        if self.preparation_time.is_some() {
            advert.preparation_time = self.preparation_time;
        }
        if let Some(available) = self.is_available {
            advert.is_available = available;
        }
        if let Some(image) = self.image {
            advert.image = image;
        }
    }
}

/// Store statistics
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_adverts: u64,
    pub available_adverts: u64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

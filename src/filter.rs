//! Browse-page filters and sort orders.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::core::{Advert, ScoredAdvert, SpicinessLevel};

/// Availability filter used on vendor dashboards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    fn matches(&self, advert: &Advert) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => advert.is_available,
            StatusFilter::Inactive => !advert.is_available,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "active" | "available" => Ok(StatusFilter::Active),
            "inactive" | "unavailable" => Ok(StatusFilter::Inactive),
            other => Err(format!("Unknown status filter: {}", other)),
        }
    }
}

/// AND-combined advert filters; `None` fields don't filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvertFilter {
    pub category: Option<String>,
    pub dietary: Option<String>,
    pub spiciness: Option<SpicinessLevel>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub status: StatusFilter,
    pub owner_id: Option<String>,
}

impl AdvertFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// "All" / "All Categories" clear the filter
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = match category.trim() {
            "" | "All" | "All Categories" => None,
            _ => Some(category),
        };
        self
    }

    /// "Any" clears the filter
    pub fn with_dietary(mut self, dietary: impl Into<String>) -> Self {
        let dietary = dietary.into();
        self.dietary = match dietary.trim() {
            "" | "Any" => None,
            _ => Some(dietary),
        };
        self
    }

    pub fn with_spiciness(mut self, level: SpicinessLevel) -> Self {
        self.spiciness = Some(level);
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, advert: &Advert) -> bool {
        if let Some(category) = &self.category {
            if advert.category != *category {
                return false;
            }
        }

        if let Some(dietary) = &self.dietary {
            let wanted = dietary.to_lowercase();
            if !advert.dietary_information.to_lowercase().contains(&wanted) {
                return false;
            }
        }

        if let Some(level) = self.spiciness {
            if advert.spiciness_level != Some(level) {
                return false;
            }
        }

        if let Some(min) = self.min_price {
            if advert.price < min {
                return false;
            }
        }

        if let Some(max) = self.max_price {
            if advert.price > max {
                return false;
            }
        }

        if let Some(owner) = &self.owner_id {
            if advert.owner_id.as_deref() != Some(owner.as_str()) {
                return false;
            }
        }

        self.status.matches(advert)
    }

    /// Keep matching adverts, preserving order
    pub fn apply(&self, adverts: Vec<Advert>) -> Vec<Advert> {
        adverts.into_iter().filter(|ad| self.matches(ad)).collect()
    }
}

/// Result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Keep ranker order (fetch order for trivial queries)
    #[default]
    Relevance,
    NewestFirst,
    OldestFirst,
    PriceLowToHigh,
    PriceHighToLow,
    NameAsc,
}

impl SortOrder {
    /// Stable sort; adverts without a timestamp go last for both date orders
    pub fn sort(&self, adverts: &mut [ScoredAdvert]) {
        match self {
            SortOrder::Relevance => {}
            SortOrder::NewestFirst => adverts.sort_by(|a, b| {
                match (a.advert.created_at, b.advert.created_at) {
                    (Some(x), Some(y)) => y.cmp(&x),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }),
            SortOrder::OldestFirst => adverts.sort_by(|a, b| {
                match (a.advert.created_at, b.advert.created_at) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }),
            SortOrder::PriceLowToHigh => adverts.sort_by(|a, b| {
                a.advert.price.partial_cmp(&b.advert.price).unwrap_or(Ordering::Equal)
            }),
            SortOrder::PriceHighToLow => adverts.sort_by(|a, b| {
                b.advert.price.partial_cmp(&a.advert.price).unwrap_or(Ordering::Equal)
            }),
            SortOrder::NameAsc => {
                adverts.sort_by_cached_key(|a| a.advert.name.to_lowercase())
            }
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(|c: char| matches!(c, '-' | ' ' | ':'), "_").as_str() {
            "relevance" => Ok(SortOrder::Relevance),
            "newest" | "newest_first" => Ok(SortOrder::NewestFirst),
            "oldest" | "oldest_first" => Ok(SortOrder::OldestFirst),
            "price" | "price_asc" | "price_low_to_high" | "price__low_to_high" => Ok(SortOrder::PriceLowToHigh),
            "price_desc" | "price_high_to_low" | "price__high_to_low" => Ok(SortOrder::PriceHighToLow),
            "name" | "name_asc" | "name_a_z" | "name__a_z" => Ok(SortOrder::NameAsc),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw scalar as sent by the backend: ids, prices and minutes show up as
/// numbers, numeric strings or null depending on the endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Null,
    /// Objects and arrays carry nothing a scalar field can use
    Nested(IgnoredAny),
}

impl ScalarValue {
    fn into_text(self) -> Option<String> {
        match self {
            ScalarValue::Int(i) => Some(i.to_string()),
            ScalarValue::Float(f) => Some(f.to_string()),
            ScalarValue::Bool(b) => Some(b.to_string()),
            ScalarValue::Text(s) => Some(s),
            ScalarValue::Null | ScalarValue::Nested(_) => None,
        }
    }

    fn into_number(self) -> Option<f64> {
        match self {
            ScalarValue::Int(i) => Some(i as f64),
            ScalarValue::Float(f) => Some(f),
            ScalarValue::Text(s) => s.trim().parse::<f64>().ok(),
            ScalarValue::Bool(_) | ScalarValue::Null | ScalarValue::Nested(_) => None,
        }
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ScalarValue::deserialize(deserializer)?
        .into_text()
        .unwrap_or_default())
}

fn deserialize_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ScalarValue::deserialize(deserializer)?
        .into_text()
        .filter(|s| !s.is_empty()))
}

/// Negative or unparseable prices are treated as "no price".
fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ScalarValue::deserialize(deserializer)?
        .into_number()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .unwrap_or(0.0))
}

fn deserialize_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ScalarValue::deserialize(deserializer)?
        .into_number()
        .filter(|m| m.is_finite() && *m >= 0.0)
        .map(|m| m as u32))
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ScalarValue::deserialize(deserializer)? {
        ScalarValue::Bool(b) => b,
        ScalarValue::Int(i) => i != 0,
        ScalarValue::Text(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        ScalarValue::Float(_) | ScalarValue::Null | ScalarValue::Nested(_) => false,
    })
}

fn deserialize_spiciness<'de, D>(deserializer: D) -> Result<Option<SpicinessLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ScalarValue::deserialize(deserializer)?
        .into_text()
        .and_then(|s| SpicinessLevel::from_label(&s)))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ScalarValue::deserialize(deserializer)?
        .into_text()
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

/// Heat level a vendor attaches to a dish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SpicinessLevel {
    #[serde(rename = "Not Spicy")]
    NotSpicy,
    Mild,
    Medium,
    Hot,
    #[serde(rename = "Very Hot")]
    VeryHot,
}

impl SpicinessLevel {
    pub const ALL: [SpicinessLevel; 5] = [
        SpicinessLevel::NotSpicy,
        SpicinessLevel::Mild,
        SpicinessLevel::Medium,
        SpicinessLevel::Hot,
        SpicinessLevel::VeryHot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpicinessLevel::NotSpicy => "Not Spicy",
            SpicinessLevel::Mild => "Mild",
            SpicinessLevel::Medium => "Medium",
            SpicinessLevel::Hot => "Hot",
            SpicinessLevel::VeryHot => "Very Hot",
        }
    }

    /// Exact, case-sensitive match on one of the five labels
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == label)
    }
}

impl fmt::Display for SpicinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpicinessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(|c: char| c == '-' || c == '_', " ");
        SpicinessLevel::ALL
            .into_iter()
            .find(|level| level.as_str().to_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown spiciness level: {}", s))
    }
}

impl<'de> Deserialize<'de> for SpicinessLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A vendor-posted food advert.
///
/// Every field is optional on the wire; anything missing or malformed
/// degrades to empty/zero instead of failing the whole collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "AdvertRecord")]
pub struct Advert {
    /// Opaque identifier, unique within a collection
    pub id: String,

    /// Display title
    pub name: String,

    pub description: String,

    /// e.g. "Main Course", "Desserts"
    pub category: String,

    /// Currency-agnostic, never negative
    pub price: f64,

    /// Comma-separated free text ("Vegetarian, Gluten-Free")
    pub dietary_information: String,

    pub spiciness_level: Option<SpicinessLevel>,

    /// Minutes
    pub preparation_time: Option<u32>,

    pub is_available: bool,

    /// Vendor that owns the advert
    pub owner_id: Option<String>,

    pub created_at: Option<DateTime<Utc>>,

    pub image: String,
}

/// Wire shape of an advert. Id and owner spellings are separate fields so a
/// record carrying both `id` and `_id` still decodes.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdvertRecord {
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "deserialize_opt_text")]
    document_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    name: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    description: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    category: String,
    #[serde(default, deserialize_with = "deserialize_price")]
    price: f64,
    #[serde(default, deserialize_with = "deserialize_text")]
    dietary_information: String,
    #[serde(default, deserialize_with = "deserialize_spiciness")]
    spiciness_level: Option<SpicinessLevel>,
    #[serde(default, deserialize_with = "deserialize_minutes")]
    preparation_time: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    is_available: bool,
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    owner_id: Option<String>,
    #[serde(default, rename = "owner_id", deserialize_with = "deserialize_opt_text")]
    owner_id_snake: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_text")]
    vendor_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_text")]
    image: String,
}

impl From<AdvertRecord> for Advert {
    fn from(record: AdvertRecord) -> Self {
        Self {
            id: record.id.or(record.document_id).unwrap_or_default(),
            name: record.name,
            description: record.description,
            category: record.category,
            price: record.price,
            dietary_information: record.dietary_information,
            spiciness_level: record.spiciness_level,
            preparation_time: record.preparation_time,
            is_available: record.is_available,
            owner_id: record.owner_id.or(record.owner_id_snake).or(record.vendor_id),
            created_at: record.created_at,
            image: record.image,
        }
    }
}

impl Advert {
    /// Create a new advert with only id and name set
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            price: 0.0,
            dietary_information: String::new(),
            spiciness_level: None,
            preparation_time: None,
            is_available: false,
            owner_id: None,
            created_at: None,
            image: String::new(),
        }
    }

    /// Lowercased `name + " " + description`, the text the keyword ranker matches against
    pub fn search_text(&self) -> String {
        format!("{} {}", self.name.to_lowercase(), self.description.to_lowercase())
    }

    /// Get display name (for logging/CLI)
    pub fn display_name(&self) -> String {
        if self.price > 0.0 {
            format!("{} (GHS {:.2})", self.name, self.price)
        } else {
            self.name.clone()
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Default for Advert {
    fn default() -> Self {
        Self::new("", "")
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::Advert;

/// Advert collection as returned by the backend.
///
/// Some endpoints answer with a bare array, others wrap it as `{ "data": [...] }`.
/// Records are decoded one by one; a record that is not an advert object is
/// skipped instead of failing the collection.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AdvertCollection {
    Bare(Vec<Advert>),
    Wrapped {
        #[serde(default)]
        data: Vec<Advert>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCollection {
    Bare(Vec<Value>),
    Wrapped {
        #[serde(default)]
        data: Option<Vec<Value>>,
    },
}

impl<'de> Deserialize<'de> for AdvertCollection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawCollection::deserialize(deserializer)? {
            RawCollection::Bare(records) => AdvertCollection::Bare(decode_records(records)),
            RawCollection::Wrapped { data } => AdvertCollection::Wrapped {
                data: decode_records(data.unwrap_or_default()),
            },
        })
    }
}

fn decode_records(records: Vec<Value>) -> Vec<Advert> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Advert>(record) {
            Ok(advert) => Some(advert),
            Err(e) => {
                tracing::debug!("Skipping undecodable advert record: {}", e);
                None
            }
        })
        .collect()
}

impl AdvertCollection {
    pub fn into_adverts(self) -> Vec<Advert> {
        match self {
            AdvertCollection::Bare(adverts) => adverts,
            AdvertCollection::Wrapped { data } => data,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AdvertCollection::Bare(adverts) => adverts.len(),
            AdvertCollection::Wrapped { data } => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse either envelope shape from a JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl From<AdvertCollection> for Vec<Advert> {
    fn from(collection: AdvertCollection) -> Self {
        collection.into_adverts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array() {
        let json = r#"[{"id": "a1", "name": "Jollof"}, {"id": "a2", "name": "Waakye"}]"#;
        let adverts = AdvertCollection::from_json(json).unwrap().into_adverts();
        assert_eq!(adverts.len(), 2);
        assert_eq!(adverts[1].name, "Waakye");
    }

    #[test]
    fn test_data_envelope() {
        let json = r#"{"message": "ok", "data": [{"id": 1, "name": "Banku", "price": 30}]}"#;
        let collection = AdvertCollection::from_json(json).unwrap();
        assert_eq!(collection.len(), 1);
        let adverts: Vec<Advert> = collection.into();
        assert_eq!(adverts[0].id, "1");
        assert_eq!(adverts[0].price, 30.0);
    }

    #[test]
    fn test_duplicate_id_spellings_decode() {
        let json = r#"[
            {"_id": "x1", "id": "x1", "name": "Jollof"},
            {"id": "x2", "name": "Waakye"}
        ]"#;
        let adverts = AdvertCollection::from_json(json).unwrap().into_adverts();
        assert_eq!(adverts.len(), 2);
        assert_eq!(adverts[0].id, "x1");
        assert_eq!(adverts[1].name, "Waakye");
    }

    #[test]
    fn test_nested_fields_decode() {
        let json = r#"{"data": [
            {"id": "x1", "image": {"url": "http://x"}},
            {"id": "x2", "vendorId": {"id": "v1"}}
        ]}"#;
        let adverts = AdvertCollection::from_json(json).unwrap().into_adverts();
        assert_eq!(adverts.len(), 2);
        assert_eq!(adverts[0].image, "");
        assert_eq!(adverts[1].owner_id, None);
    }

    #[test]
    fn test_non_object_records_are_skipped() {
        let json = r#"{"data": [{"id": "x1", "name": "Banku"}, "oops", 42, null]}"#;
        let adverts = AdvertCollection::from_json(json).unwrap().into_adverts();
        assert_eq!(adverts.len(), 1);
        assert_eq!(adverts[0].name, "Banku");
    }

    #[test]
    fn test_null_data_is_empty() {
        let collection = AdvertCollection::from_json(r#"{"data": null}"#).unwrap();
        assert!(collection.is_empty());
    }

    #[test]
    fn test_envelope_without_data() {
        let collection = AdvertCollection::from_json(r#"{"message": "empty"}"#).unwrap();
        assert!(collection.is_empty());
    }
}

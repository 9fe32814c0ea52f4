use rusqlite::{Connection, params, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::store::{AdvertStore, AdvertUpdate, NewAdvert, StoreStats};
use crate::core::Advert;
use crate::error::{Result, MarketError};

/// SQLite-backed key-value advert store.
///
/// Adverts are kept as JSON documents keyed by id:
/// ```sql
/// CREATE TABLE adverts (
///     id TEXT PRIMARY KEY,
///     owner_id TEXT,
///     is_available INTEGER NOT NULL DEFAULT 0,
///     advert_data TEXT NOT NULL,
///     created_at TEXT NOT NULL,
///     updated_at TEXT NOT NULL
/// );
/// ```
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a store, seeding the demo adverts if it is empty
    pub async fn new(db_path: &str) -> Result<Self> {
        let store = Self::without_seed(db_path).await?;
        store.seed_if_empty()?;
        Ok(store)
    }

    /// Open a store without demo data
    pub async fn without_seed(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS adverts (
                id TEXT PRIMARY KEY,
                owner_id TEXT,
                is_available INTEGER NOT NULL DEFAULT 0,
                advert_data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_adverts_owner ON adverts(owner_id)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MarketError::Store("connection lock poisoned".to_string()))
    }

    fn seed_if_empty(&self) -> Result<()> {
        let conn = self.conn()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM adverts", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let adverts = demo_adverts();
        for advert in &adverts {
            Self::write(&conn, advert)?;
        }
        tracing::info!("Seeded demo store with {} adverts", adverts.len());

        Ok(())
    }

    fn write(conn: &Connection, advert: &Advert) -> Result<()> {
        let advert_json = serde_json::to_string(advert)?;
        let created_at = advert.created_at.unwrap_or_else(Utc::now).to_rfc3339();

        conn.execute(
            "INSERT INTO adverts (id, owner_id, is_available, advert_data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                owner_id = excluded.owner_id,
                is_available = excluded.is_available,
                advert_data = excluded.advert_data,
                updated_at = excluded.updated_at",
            params![
                advert.id,
                advert.owner_id,
                advert.is_available,
                advert_json,
                created_at,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn read(conn: &Connection, id: &str) -> Result<Option<Advert>> {
        let json: Option<String> = conn
            .query_row(
                "SELECT advert_data FROM adverts WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|j| serde_json::from_str(&j).map_err(MarketError::from))
            .transpose()
    }
}

/// Adverts a fresh demo store starts with
fn demo_adverts() -> Vec<Advert> {
    let mut jollof = Advert::new("a1", "Spicy Jollof");
    jollof.description = "Delicious Ghanaian jollof".to_string();
    jollof.category = "Main Course".to_string();
    jollof.price = 50.0;
    jollof.is_available = true;
    jollof.owner_id = Some("v1".to_string());
    jollof.created_at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).single();

    let mut waakye = Advert::new("a2", "Waakye Special");
    waakye.description = "Beans and rice combo".to_string();
    waakye.category = "Main Course".to_string();
    waakye.price = 35.0;
    waakye.is_available = true;
    waakye.owner_id = Some("v1".to_string());
    waakye.created_at = Utc.with_ymd_and_hms(2024, 1, 16, 12, 0, 0).single();

    vec![jollof, waakye]
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl AdvertStore for SqliteStore {
    async fn list(&self) -> Result<Vec<Advert>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare("SELECT advert_data FROM adverts ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        rows.iter()
            .map(|json| serde_json::from_str(json).map_err(MarketError::from))
            .collect()
    }

    async fn get(&self, id: &str) -> Result<Option<Advert>> {
        let conn = self.conn()?;
        Self::read(&conn, id)
    }

    async fn create(&self, advert: NewAdvert) -> Result<Advert> {
        let advert = advert.into_advert(uuid::Uuid::new_v4().to_string(), Utc::now());
        let conn = self.conn()?;
        Self::write(&conn, &advert)?;

        tracing::debug!("Created advert {} ({})", advert.id, advert.name);
        Ok(advert)
    }

    async fn update(&self, id: &str, changes: AdvertUpdate) -> Result<Advert> {
        let conn = self.conn()?;
        let mut advert = Self::read(&conn, id)?
            .ok_or_else(|| MarketError::NotFound(id.to_string()))?;

        changes.apply_to(&mut advert);
        Self::write(&conn, &advert)?;

        Ok(advert)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM adverts WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn()?;

        let total_adverts: u64 = conn.query_row(
            "SELECT COUNT(*) FROM adverts",
            [],
            |row| row.get(0),
        )?;

        let available_adverts: u64 = conn.query_row(
            "SELECT COUNT(*) FROM adverts WHERE is_available = 1",
            [],
            |row| row.get(0),
        )?;

        let (oldest, newest): (Option<String>, Option<String>) = conn.query_row(
            "SELECT MIN(created_at), MAX(created_at) FROM adverts",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StoreStats {
            total_adverts,
            available_adverts,
            oldest_entry: oldest.as_deref().and_then(parse_timestamp),
            newest_entry: newest.as_deref().and_then(parse_timestamp),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_seeds_demo_adverts() {
        let store = SqliteStore::new(":memory:").await.unwrap();
        let adverts = store.list().await.unwrap();

        assert_eq!(adverts.len(), 2);
        assert_eq!(adverts[0].name, "Spicy Jollof");
        assert_eq!(adverts[1].name, "Waakye Special");
        assert_eq!(adverts[1].owner_id.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_seed_timestamps_match_records() {
        let store = SqliteStore::new(":memory:").await.unwrap();
        let adverts = store.list().await.unwrap();
        let stats = store.stats().await.unwrap();

        assert!(adverts.iter().all(|a| a.created_at.is_some()));
        assert_eq!(stats.oldest_entry, adverts[0].created_at);
        assert_eq!(stats.newest_entry, adverts[1].created_at);

        store.create(NewAdvert::new("Kelewele", 15.0)).await.unwrap();
        let mut scored: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|a| crate::core::ScoredAdvert::new(a, 0.0))
            .collect();
        crate::filter::SortOrder::NewestFirst.sort(&mut scored);
        let names: Vec<&str> = scored.iter().map(|s| s.advert.name.as_str()).collect();
        assert_eq!(names, vec!["Kelewele", "Waakye Special", "Spicy Jollof"]);
    }

    #[tokio::test]
    async fn test_store_without_seed_is_empty() {
        let store = SqliteStore::without_seed(":memory:").await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_adverts, 0);
        assert!(stats.oldest_entry.is_none());
    }

    #[tokio::test]
    async fn test_store_create_and_get() {
        let store = SqliteStore::without_seed(":memory:").await.unwrap();

        let mut new_ad = NewAdvert::new("Kelewele", 15.0);
        new_ad.owner_id = Some("v9".to_string());
        let created = store.create(new_ad).await.unwrap();

        assert!(!created.id.is_empty());
        assert!(created.created_at.is_some());
        assert!(created.is_available);

        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_store_update() {
        let store = SqliteStore::new(":memory:").await.unwrap();

        let changes = AdvertUpdate {
            name: Some("Jollof Deluxe".to_string()),
            price: Some(65.0),
            ..Default::default()
        };
        let updated = store.update("a1", changes).await.unwrap();
        assert_eq!(updated.name, "Jollof Deluxe");
        assert_eq!(updated.price, 65.0);
        assert_eq!(updated.description, "Delicious Ghanaian jollof");

        let adverts = store.list().await.unwrap();
        assert_eq!(adverts[0].name, "Jollof Deluxe");
    }

    #[tokio::test]
    async fn test_store_update_missing_is_not_found() {
        let store = SqliteStore::new(":memory:").await.unwrap();
        let err = store.update("nope", AdvertUpdate::default()).await.unwrap_err();
        assert!(matches!(err, MarketError::NotFound(id) if id == "nope"));
    }

    #[tokio::test]
    async fn test_store_delete() {
        let store = SqliteStore::new(":memory:").await.unwrap();

        assert!(store.delete("a2").await.unwrap());
        assert!(!store.delete("a2").await.unwrap());
        assert!(store.get("a2").await.unwrap().is_none());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_stats() {
        let store = SqliteStore::new(":memory:").await.unwrap();
        store
            .update("a2", AdvertUpdate { is_available: Some(false), ..Default::default() })
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_adverts, 2);
        assert_eq!(stats.available_adverts, 1);
        assert!(stats.oldest_entry.is_some());
        assert!(stats.newest_entry.is_some());
    }

    #[test]
    fn test_store_blocking_usage() {
        let store = tokio_test::block_on(SqliteStore::new(":memory:")).unwrap();
        let jollof = tokio_test::block_on(store.get("a1")).unwrap();
        assert_eq!(jollof.map(|a| a.price), Some(50.0));
    }
}

//! Redis-backed target registry and traffic counters
//!
//! Targets are stored as JSON strings under `{prefix}target:{id}` and indexed
//! in the set `{prefix}targets`. Counters are hashes under
//! `{prefix}traffic:{id}` with the fields `count` and `date`.

use std::collections::HashMap;

use ::redis::{aio::ConnectionManager, AsyncCommands, Client, Script};
use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;

use super::{TargetRepository, TrafficCounterStore};
use crate::{
    error::{AppError, AppResult},
    models::{Target, TrafficCounter},
};

/// KEYS[1] counter hash, ARGV[1] today, ARGV[2] cap.
/// Returns the new count, or -1 when the cap is already reached.
static INCREMENT_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local date = redis.call('HGET', KEYS[1], 'date')
        if date ~= ARGV[1] then
            redis.call('HSET', KEYS[1], 'count', 0, 'date', ARGV[1])
        end
        local count = tonumber(redis.call('HGET', KEYS[1], 'count') or '0')
        if count >= tonumber(ARGV[2]) then
            return -1
        end
        return redis.call('HINCRBY', KEYS[1], 'count', 1)
        "#,
    )
});

/// KEYS[1] counter hash, ARGV[1] today
static INITIALIZE_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        if redis.call('EXISTS', KEYS[1]) == 0 then
            redis.call('HSET', KEYS[1], 'count', 0, 'date', ARGV[1])
        end
        return 1
        "#,
    )
});

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    /// Connect to Redis and verify the connection
    pub async fn connect(url: &str, prefix: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::StoreUnavailable(format!("Failed to create Redis client: {}", e)))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Failed to connect to Redis: {}", e)))?;

        let store = Self {
            conn,
            prefix: prefix.to_string(),
        };
        store.ping().await?;
        Ok(store)
    }

    fn target_key(&self, id: &str) -> String {
        format!("{}target:{}", self.prefix, id)
    }

    fn index_key(&self) -> String {
        format!("{}targets", self.prefix)
    }

    fn traffic_key(&self, id: &str) -> String {
        format!("{}traffic:{}", self.prefix, id)
    }
}

fn parse_counter(id: &str, fields: HashMap<String, String>) -> AppResult<Option<TrafficCounter>> {
    if fields.is_empty() {
        return Ok(None);
    }
    let count = fields
        .get("count")
        .and_then(|c| c.parse::<u64>().ok())
        .ok_or_else(|| AppError::Internal(format!("Corrupt traffic count for target {}", id)))?;
    let date = fields
        .get("date")
        .and_then(|d| d.parse::<NaiveDate>().ok())
        .ok_or_else(|| AppError::Internal(format!("Corrupt traffic date for target {}", id)))?;
    Ok(Some(TrafficCounter { count, date }))
}

#[async_trait]
impl TargetRepository for RedisStore {
    async fn get(&self, id: &str) -> AppResult<Option<Target>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.target_key(id)).await?;
        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(AppError::from)
    }

    async fn get_all(&self) -> AppResult<Vec<Target>> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.smembers(self.index_key()).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| self.target_key(id)).collect();
        let raw: Vec<Option<String>> = ::redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        // Index entries whose record vanished are skipped
        raw.into_iter()
            .flatten()
            .map(|json| serde_json::from_str(&json).map_err(AppError::from))
            .collect()
    }

    async fn put(&self, target: &Target) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(target)?;
        ::redis::pipe()
            .atomic()
            .set(self.target_key(&target.id), json)
            .ignore()
            .sadd(self.index_key(), &target.id)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        let (removed, _): (u32, u32) = ::redis::pipe()
            .atomic()
            .del(self.target_key(id))
            .srem(self.index_key(), id)
            .query_async(&mut conn)
            .await?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn.clone();
        ::redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("Redis connection test failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl TrafficCounterStore for RedisStore {
    async fn get(&self, id: &str) -> AppResult<Option<TrafficCounter>> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(self.traffic_key(id)).await?;
        parse_counter(id, fields)
    }

    async fn put(&self, id: &str, counter: &TrafficCounter) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.hset_multiple::<_, _, _, ()>(
            self.traffic_key(id),
            &[
                ("count", counter.count.to_string()),
                ("date", counter.date.to_string()),
            ],
        )
        .await?;
        Ok(())
    }

    async fn initialize(&self, id: &str, today: NaiveDate) -> AppResult<()> {
        let mut conn = self.conn.clone();
        INITIALIZE_SCRIPT
            .key(self.traffic_key(id))
            .arg(today.to_string())
            .invoke_async::<_, i64>(&mut conn)
            .await?;
        Ok(())
    }

    async fn try_increment(&self, id: &str, today: NaiveDate, cap: u32) -> AppResult<Option<u64>> {
        let mut conn = self.conn.clone();
        let count: i64 = INCREMENT_SCRIPT
            .key(self.traffic_key(id))
            .arg(today.to_string())
            .arg(cap)
            .invoke_async(&mut conn)
            .await?;
        Ok(u64::try_from(count).ok())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.traffic_key(id)).await?;
        Ok(())
    }
}

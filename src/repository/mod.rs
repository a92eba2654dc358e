//! Repository layer: target registry and traffic counter stores

pub mod memory;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
#[cfg(test)]
use mockall::automock;

use crate::{
    error::AppResult,
    models::{Target, TrafficCounter},
};

/// Durable mapping from target id to target definition
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TargetRepository: Send + Sync {
    async fn get(&self, id: &str) -> AppResult<Option<Target>>;

    /// All registered targets, in no particular order
    async fn get_all(&self) -> AppResult<Vec<Target>>;

    /// Upsert; the last write for an id wins
    async fn put(&self, target: &Target) -> AppResult<()>;

    /// Returns whether a target was removed
    async fn delete(&self, id: &str) -> AppResult<bool>;

    /// Round-trip to the backing store
    async fn ping(&self) -> AppResult<()>;
}

/// Durable mapping from target id to its daily acceptance counter
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TrafficCounterStore: Send + Sync {
    async fn get(&self, id: &str) -> AppResult<Option<TrafficCounter>>;

    async fn put(&self, id: &str, counter: &TrafficCounter) -> AppResult<()>;

    /// Create `{count: 0, date: today}` unless a counter already exists
    async fn initialize(&self, id: &str, today: NaiveDate) -> AppResult<()>;

    /// Atomically roll the counter over to `today` if stale, then increment it
    /// unless it already reached `cap`. Returns the new count, or `None` when
    /// the cap left no room.
    async fn try_increment(&self, id: &str, today: NaiveDate, cap: u32) -> AppResult<Option<u64>>;

    async fn delete(&self, id: &str) -> AppResult<()>;
}

/// Main repository struct holding both stores
#[derive(Clone)]
pub struct Repository {
    pub targets: Arc<dyn TargetRepository>,
    pub traffic: Arc<dyn TrafficCounterStore>,
}

impl Repository {
    pub fn new(targets: Arc<dyn TargetRepository>, traffic: Arc<dyn TrafficCounterStore>) -> Self {
        Self { targets, traffic }
    }

    /// Both stores backed by one Redis connection
    pub fn redis(store: redis::RedisStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store)
    }

    /// Both stores held in process memory
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self::new(store.clone(), store)
    }
}

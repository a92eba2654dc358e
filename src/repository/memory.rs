//! In-process target registry and traffic counters

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::{TargetRepository, TrafficCounterStore};
use crate::{
    error::AppResult,
    models::{Target, TrafficCounter},
};

#[derive(Default)]
pub struct MemoryStore {
    targets: RwLock<HashMap<String, Target>>,
    traffic: RwLock<HashMap<String, TrafficCounter>>,
}

#[async_trait]
impl TargetRepository for MemoryStore {
    async fn get(&self, id: &str) -> AppResult<Option<Target>> {
        Ok(self.targets.read().await.get(id).cloned())
    }

    async fn get_all(&self) -> AppResult<Vec<Target>> {
        Ok(self.targets.read().await.values().cloned().collect())
    }

    async fn put(&self, target: &Target) -> AppResult<()> {
        self.targets
            .write()
            .await
            .insert(target.id.clone(), target.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.targets.write().await.remove(id).is_some())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TrafficCounterStore for MemoryStore {
    async fn get(&self, id: &str) -> AppResult<Option<TrafficCounter>> {
        Ok(self.traffic.read().await.get(id).copied())
    }

    async fn put(&self, id: &str, counter: &TrafficCounter) -> AppResult<()> {
        self.traffic.write().await.insert(id.to_string(), *counter);
        Ok(())
    }

    async fn initialize(&self, id: &str, today: NaiveDate) -> AppResult<()> {
        self.traffic
            .write()
            .await
            .entry(id.to_string())
            .or_insert_with(|| TrafficCounter::fresh(today));
        Ok(())
    }

    async fn try_increment(&self, id: &str, today: NaiveDate, cap: u32) -> AppResult<Option<u64>> {
        let mut traffic = self.traffic.write().await;
        let counter = traffic
            .entry(id.to_string())
            .or_insert_with(|| TrafficCounter::fresh(today));
        *counter = counter.rolled_over(today);

        if counter.count >= u64::from(cap) {
            return Ok(None);
        }
        counter.count += 1;
        Ok(Some(counter.count))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.traffic.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 7, d).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_keeps_existing_counter() {
        let store = MemoryStore::default();
        TrafficCounterStore::put(&store, "1", &TrafficCounter { count: 2, date: day(19) })
            .await
            .unwrap();
        store.initialize("1", day(19)).await.unwrap();
        assert_eq!(TrafficCounterStore::get(&store, "1").await.unwrap().unwrap().count, 2);

        store.initialize("2", day(19)).await.unwrap();
        assert_eq!(
            TrafficCounterStore::get(&store, "2").await.unwrap(),
            Some(TrafficCounter::fresh(day(19)))
        );
    }

    #[tokio::test]
    async fn test_try_increment_respects_cap_and_rollover() {
        let store = MemoryStore::default();
        assert_eq!(store.try_increment("1", day(19), 2).await.unwrap(), Some(1));
        assert_eq!(store.try_increment("1", day(19), 2).await.unwrap(), Some(2));
        assert_eq!(store.try_increment("1", day(19), 2).await.unwrap(), None);
        assert_eq!(store.try_increment("1", day(20), 2).await.unwrap(), Some(1));
        assert_eq!(store.try_increment("2", day(20), 0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_increments_never_exceed_cap() {
        let store = Arc::new(MemoryStore::default());
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.try_increment("1", day(19), 5).await.unwrap() })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 5);
        assert_eq!(TrafficCounterStore::get(store.as_ref(), "1").await.unwrap().unwrap().count, 5);
    }

    #[tokio::test]
    async fn test_targets_last_write_wins() {
        let store = MemoryStore::default();
        let mut target = Target {
            id: "1002".into(),
            url: "http://wy-mn.com".into(),
            value: 5.0,
            max_accepts_per_day: 10,
            accept: None,
        };
        TargetRepository::put(&store, &target).await.unwrap();
        target.url = "http://wy.com".into();
        TargetRepository::put(&store, &target).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].url, "http://wy.com");
        assert!(TargetRepository::delete(&store, "1002").await.unwrap());
        assert!(!TargetRepository::delete(&store, "1002").await.unwrap());
    }
}

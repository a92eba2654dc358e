//! Accounting service: daily counters with lazy rollover and cap enforcement

use std::sync::Arc;

use crate::{
    clock::Clock,
    error::AppResult,
    models::{Target, TrafficCounter},
    repository::TrafficCounterStore,
};

#[derive(Clone)]
pub struct AccountingService {
    store: Arc<dyn TrafficCounterStore>,
    clock: Arc<dyn Clock>,
}

impl AccountingService {
    pub fn new(store: Arc<dyn TrafficCounterStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The counter as it stands today. A missing or stale counter reads as
    /// `{count: 0, date: today}`; nothing is written.
    pub async fn counter(&self, target_id: &str) -> AppResult<TrafficCounter> {
        let today = self.clock.today();
        Ok(self
            .store
            .get(target_id)
            .await?
            .map(|counter| counter.rolled_over(today))
            .unwrap_or_else(|| TrafficCounter::fresh(today)))
    }

    /// Whether the target may still be accepted today
    pub async fn has_quota(&self, target_id: &str, cap: u32) -> AppResult<bool> {
        if cap == 0 {
            return Ok(false);
        }
        let counter = self.counter(target_id).await?;
        Ok(counter.count < u64::from(cap))
    }

    /// Record one acceptance for `target`. Rollover, cap check and increment
    /// happen atomically in the store; returns `false` if a concurrent commit
    /// used up the remaining quota first.
    pub async fn commit_accept(&self, target: &Target) -> AppResult<bool> {
        let today = self.clock.today();
        let committed = self
            .store
            .try_increment(&target.id, today, target.max_accepts_per_day)
            .await?;

        match committed {
            Some(count) => {
                tracing::debug!(
                    target_id = %target.id,
                    count,
                    cap = target.max_accepts_per_day,
                    "Acceptance committed"
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Create today's counter for a newly registered target unless one exists
    pub async fn initialize(&self, target_id: &str) -> AppResult<()> {
        self.store.initialize(target_id, self.clock.today()).await
    }

    pub async fn remove(&self, target_id: &str) -> AppResult<()> {
        self.store.delete(target_id).await
    }
}

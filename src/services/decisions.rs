//! Decision service: routes one visitor event to a target or rejects it

use std::sync::Arc;

use super::{accounting::AccountingService, matching::MatchingEngine};
use crate::{
    error::AppResult,
    models::{Outcome, VisitorEvent},
    repository::TargetRepository,
};

#[derive(Clone)]
pub struct DecisionService {
    targets: Arc<dyn TargetRepository>,
    matching: MatchingEngine,
    accounting: AccountingService,
}

impl DecisionService {
    pub fn new(
        targets: Arc<dyn TargetRepository>,
        matching: MatchingEngine,
        accounting: AccountingService,
    ) -> Self {
        Self {
            targets,
            matching,
            accounting,
        }
    }

    /// Select a target for the event and commit exactly one acceptance for it.
    ///
    /// When the commit finds the cap already used up by a concurrent request,
    /// that target is dropped and selection runs again over the rest.
    pub async fn decide(&self, event: &VisitorEvent) -> AppResult<Outcome> {
        let mut targets = self.targets.get_all().await?;
        if targets.is_empty() {
            tracing::debug!(publisher = ?event.publisher, "No targets registered, rejecting");
            return Ok(Outcome::Reject);
        }

        loop {
            let Some(candidate) = self.matching.select_target(event, &targets).await? else {
                tracing::info!(
                    publisher = ?event.publisher,
                    geo_state = ?event.geo_state,
                    "Rejected visitor"
                );
                return Ok(Outcome::Reject);
            };

            if self.accounting.commit_accept(candidate).await? {
                tracing::info!(
                    publisher = ?event.publisher,
                    target_id = %candidate.id,
                    "Accepted visitor"
                );
                return Ok(Outcome::Accept {
                    target_id: candidate.id.clone(),
                    url: candidate.url.clone(),
                });
            }

            let lost = candidate.id.clone();
            tracing::warn!(target_id = %lost, "Daily cap reached by a concurrent request, reselecting");
            targets.retain(|target| target.id != lost);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{AcceptRules, InSet, Target, TrafficCounter},
        repository::{
            memory::MemoryStore, MockTargetRepository, MockTrafficCounterStore, TrafficCounterStore,
        },
        services::accounting::tests::{today, FixedClock},
    };

    fn target(id: &str, value: f64, cap: u32, states: &[&str], hours: &[&str]) -> Target {
        Target {
            id: id.into(),
            url: format!("http://{}.com", id),
            value,
            max_accepts_per_day: cap,
            accept: Some(AcceptRules {
                geo_state: Some(InSet::new(states.iter().copied())),
                hour: Some(InSet::new(hours.iter().copied())),
            }),
        }
    }

    fn service_with(
        targets: Arc<dyn TargetRepository>,
        traffic: Arc<dyn TrafficCounterStore>,
    ) -> DecisionService {
        let accounting = AccountingService::new(traffic, Arc::new(FixedClock(today())));
        DecisionService::new(targets, MatchingEngine::new(accounting.clone()), accounting)
    }

    async fn service(targets: Vec<Target>) -> (DecisionService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        for target in &targets {
            TargetRepository::put(store.as_ref(), target).await.unwrap();
        }
        (service_with(store.clone(), store.clone()), store)
    }

    fn accept(id: &str) -> Outcome {
        Outcome::Accept {
            target_id: id.into(),
            url: format!("http://{}.com", id),
        }
    }

    #[tokio::test]
    async fn test_empty_registry_rejects() {
        let (service, _) = service(vec![]).await;
        let event = VisitorEvent::new("ri", "2018-07-19T13:28:59.513Z");
        assert_eq!(service.decide(&event).await.unwrap(), Outcome::Reject);
    }

    #[tokio::test]
    async fn test_cap_of_one_accepts_once() {
        let (service, _) = service(vec![target("wy", 10.0, 1, &["wy"], &["1", "2", "3"])]).await;
        let event = VisitorEvent::new("wy", "2018-07-19T03:28:59.513Z");
        assert_eq!(service.decide(&event).await.unwrap(), accept("wy"));
        assert_eq!(service.decide(&event).await.unwrap(), Outcome::Reject);
    }

    #[tokio::test]
    async fn test_zero_cap_target_is_never_selected() {
        let (service, store) = service(vec![target("sc", 10.0, 0, &["sc"], &["13"])]).await;
        let event = VisitorEvent::new("sc", "2018-07-19T13:28:59.513Z");
        assert_eq!(service.decide(&event).await.unwrap(), Outcome::Reject);
        assert_eq!(TrafficCounterStore::get(store.as_ref(), "sc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rollover_restores_quota() {
        let (service, store) = service(vec![target("wy", 10.0, 1, &["wy"], &["03"])]).await;
        let event = VisitorEvent::new("wy", "2018-07-19T03:28:59.513Z");
        assert_eq!(service.decide(&event).await.unwrap(), accept("wy"));

        let yesterday = today().pred_opt().unwrap();
        TrafficCounterStore::put(store.as_ref(), "wy", &TrafficCounter { count: 1, date: yesterday })
            .await
            .unwrap();
        assert_eq!(service.decide(&event).await.unwrap(), accept("wy"));
    }

    #[tokio::test]
    async fn test_falls_back_to_next_target_once_capped() {
        let (service, _) = service(vec![
            target("high", 10.0, 1, &["tx"], &["12"]),
            target("low", 5.0, 2, &["tx"], &["12"]),
        ])
        .await;
        let event = VisitorEvent::new("tx", "2018-07-19T12:00:00Z");
        assert_eq!(service.decide(&event).await.unwrap(), accept("high"));
        assert_eq!(service.decide(&event).await.unwrap(), accept("low"));
        assert_eq!(service.decide(&event).await.unwrap(), accept("low"));
        assert_eq!(service.decide(&event).await.unwrap(), Outcome::Reject);
    }

    #[tokio::test]
    async fn test_lost_commit_reselects() {
        let targets = vec![
            target("high", 10.0, 1, &["tx"], &["12"]),
            target("low", 5.0, 1, &["tx"], &["12"]),
        ];
        let mut repository = MockTargetRepository::new();
        repository
            .expect_get_all()
            .times(1)
            .returning(move || Ok(targets.clone()));

        // Both look free on read, but "high" is taken by the time we commit.
        let mut traffic = MockTrafficCounterStore::new();
        traffic.expect_get().returning(|_| Ok(None));
        traffic
            .expect_try_increment()
            .withf(|id, _, _| id.to_string() == "high")
            .times(1)
            .returning(|_, _, _| Ok(None));
        traffic
            .expect_try_increment()
            .withf(|id, _, _| id.to_string() == "low")
            .times(1)
            .returning(|_, _, _| Ok(Some(1)));

        let service = service_with(Arc::new(repository), Arc::new(traffic));
        let event = VisitorEvent::new("tx", "2018-07-19T12:00:00Z");
        assert_eq!(service.decide(&event).await.unwrap(), accept("low"));
    }

    #[tokio::test]
    async fn test_concurrent_decisions_respect_cap() {
        let (service, store) = service(vec![target("tx", 10.0, 3, &["tx"], &["12"])]).await;
        let event = VisitorEvent::new("tx", "2018-07-19T12:00:00Z");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                let event = event.clone();
                tokio::spawn(async move { service.decide(&event).await.unwrap() })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() != Outcome::Reject {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 3);
        assert_eq!(
            TrafficCounterStore::get(store.as_ref(), "tx").await.unwrap().unwrap().count,
            3
        );
    }

    #[tokio::test]
    async fn test_invalid_event_is_an_error() {
        let (service, _) = service(vec![target("tx", 10.0, 3, &["tx"], &["12"])]).await;
        let event = VisitorEvent::new("tx", "19/07/2018 12:00");
        assert!(matches!(service.decide(&event).await, Err(AppError::InvalidEvent(_))));
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated() {
        let mut repository = MockTargetRepository::new();
        repository
            .expect_get_all()
            .returning(|| Err(AppError::StoreUnavailable("connection refused".into())));
        let service = service_with(Arc::new(repository), Arc::new(MemoryStore::default()));
        let event = VisitorEvent::new("tx", "2018-07-19T12:00:00Z");
        assert!(matches!(
            service.decide(&event).await,
            Err(AppError::StoreUnavailable(_))
        ));
    }
}

//! Business logic services

pub mod accounting;
pub mod decisions;
pub mod matching;
pub mod targets;

use std::sync::Arc;

use crate::{clock::Clock, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub accounting: accounting::AccountingService,
    pub decisions: decisions::DecisionService,
    pub targets: targets::TargetsService,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        let accounting = accounting::AccountingService::new(repository.traffic.clone(), clock);
        let matching = matching::MatchingEngine::new(accounting.clone());

        Self {
            decisions: decisions::DecisionService::new(
                repository.targets.clone(),
                matching,
                accounting.clone(),
            ),
            targets: targets::TargetsService::new(repository.targets.clone(), accounting.clone()),
            accounting,
            repository,
        }
    }
}

//! Target registration service

use std::sync::Arc;

use validator::Validate;

use super::accounting::AccountingService;
use crate::{
    error::{AppError, AppResult},
    models::{target::TargetPayload, traffic::TrafficView, Target},
    repository::TargetRepository,
};

#[derive(Clone)]
pub struct TargetsService {
    repository: Arc<dyn TargetRepository>,
    accounting: AccountingService,
}

fn validate(payload: &TargetPayload) -> AppResult<()> {
    payload.validate()?;
    if !payload.value.is_finite() {
        return Err(AppError::Validation("value must be a finite number".to_string()));
    }
    Ok(())
}

impl TargetsService {
    pub fn new(repository: Arc<dyn TargetRepository>, accounting: AccountingService) -> Self {
        Self {
            repository,
            accounting,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Target>> {
        self.repository.get_all().await
    }

    /// Unknown ids are not an error
    pub async fn get(&self, id: &str) -> AppResult<Option<Target>> {
        self.repository.get(id).await
    }

    /// Register a target (id taken from the body) and open its counter
    pub async fn create(&self, payload: TargetPayload) -> AppResult<Target> {
        validate(&payload)?;
        let id = match payload.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(AppError::BadRequest("Target id is required".to_string())),
        };

        let target = payload.into_target(id);
        self.repository.put(&target).await?;
        self.accounting.initialize(&target.id).await?;
        tracing::info!(target_id = %target.id, url = %target.url, "Target registered");
        Ok(target)
    }

    /// Replace the target stored under `id`; any id in the body is ignored
    pub async fn update(&self, id: &str, payload: TargetPayload) -> AppResult<Target> {
        validate(&payload)?;
        let target = payload.into_target(id.to_string());
        self.repository.put(&target).await?;
        tracing::info!(target_id = %target.id, "Target updated");
        Ok(target)
    }

    /// Remove a target together with its counter
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.repository.delete(id).await? {
            return Err(AppError::NotFound(format!("Target {} not found", id)));
        }
        self.accounting.remove(id).await?;
        tracing::info!(target_id = %id, "Target deleted");
        Ok(())
    }

    /// Today's traffic for a target
    pub async fn traffic(&self, id: &str) -> AppResult<TrafficView> {
        let target = self
            .repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Target {} not found", id)))?;
        let counter = self.accounting.counter(id).await?;
        let cap = u64::from(target.max_accepts_per_day);

        Ok(TrafficView {
            target_id: target.id,
            count: counter.count,
            date: counter.date,
            max_accepts_per_day: target.max_accepts_per_day,
            remaining: cap.saturating_sub(counter.count),
        })
    }
}

//! Matching engine: picks the best target for a visitor event
//!
//! Eligible targets are those whose accept rules list both the visitor's geo
//! state and the UTC hour of the event. They are ranked by `value` descending;
//! equal values are ordered by ascending id so the ranking never depends on
//! the order the registry returned them in.

use std::cmp::Ordering;

use super::accounting::AccountingService;
use crate::{
    error::AppResult,
    models::{Target, VisitorEvent},
};

#[derive(Clone)]
pub struct MatchingEngine {
    accounting: AccountingService,
}

fn rank(a: &Target, b: &Target) -> Ordering {
    b.value
        .total_cmp(&a.value)
        .then_with(|| a.id.cmp(&b.id))
}

/// Targets covering `geo_state` at `hour`, best first
pub fn eligible<'a>(targets: &'a [Target], geo_state: &str, hour: u32) -> Vec<&'a Target> {
    let mut eligible: Vec<&Target> = targets
        .iter()
        .filter(|target| target.accepts(geo_state, hour))
        .collect();
    eligible.sort_by(|a, b| rank(a, b));
    eligible
}

impl MatchingEngine {
    pub fn new(accounting: AccountingService) -> Self {
        Self { accounting }
    }

    /// Highest ranked eligible target with quota left today, if any.
    /// Fails with `InvalidEvent` before looking at any target when the event
    /// has no usable geo state or timestamp.
    pub async fn select_target<'a>(
        &self,
        event: &VisitorEvent,
        targets: &'a [Target],
    ) -> AppResult<Option<&'a Target>> {
        let geo_state = event.geo_state()?;
        let hour = event.hour()?;

        for candidate in eligible(targets, geo_state, hour) {
            if self
                .accounting
                .has_quota(&candidate.id, candidate.max_accepts_per_day)
                .await?
            {
                return Ok(Some(candidate));
            }
            tracing::debug!(target_id = %candidate.id, "Target matched but is at its daily cap");
        }
        Ok(None)
    }
}

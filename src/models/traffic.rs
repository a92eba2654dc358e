//! Traffic counter model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-target daily acceptance ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrafficCounter {
    /// Accepted events on `date`
    pub count: u64,
    /// UTC calendar day this counter accrues against
    pub date: NaiveDate,
}

impl TrafficCounter {
    pub fn fresh(today: NaiveDate) -> Self {
        Self { count: 0, date: today }
    }

    /// The counter as seen on `today`: a counter from another day is reset
    pub fn rolled_over(self, today: NaiveDate) -> Self {
        if self.date == today {
            self
        } else {
            Self::fresh(today)
        }
    }
}

/// Response for `GET /api/target/{id}/traffic`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrafficView {
    pub target_id: String,
    pub count: u64,
    pub date: NaiveDate,
    pub max_accepts_per_day: u32,
    pub remaining: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollover() {
        let today = NaiveDate::from_ymd_opt(2018, 7, 19).unwrap();
        let yesterday = today.pred_opt().unwrap();

        let current = TrafficCounter { count: 4, date: today };
        assert_eq!(current.rolled_over(today), current);

        let stale = TrafficCounter { count: 4, date: yesterday };
        assert_eq!(stale.rolled_over(today), TrafficCounter::fresh(today));
    }
}

//! Source of the current calendar day for counter rollover

use chrono::{NaiveDate, Utc};

/// Supplies "today" (UTC) at request-processing time
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

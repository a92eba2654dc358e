//! Visitor event and decision outcome models

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Event timestamp: RFC 3339 text or epoch milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum EventTimestamp {
    Millis(i64),
    Text(String),
}

impl EventTimestamp {
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            EventTimestamp::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            EventTimestamp::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Visitor event submitted by a publisher
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitorEvent {
    pub geo_state: Option<String>,
    pub timestamp: Option<EventTimestamp>,
    /// Carried through for logging only
    pub publisher: Option<String>,
}

impl VisitorEvent {
    pub fn new(geo_state: &str, timestamp: &str) -> Self {
        Self {
            geo_state: Some(geo_state.to_string()),
            timestamp: Some(EventTimestamp::Text(timestamp.to_string())),
            publisher: None,
        }
    }

    pub fn geo_state(&self) -> AppResult<&str> {
        match self.geo_state.as_deref().map(str::trim) {
            Some(state) if !state.is_empty() => Ok(state),
            _ => Err(AppError::InvalidEvent("geoState is required".to_string())),
        }
    }

    /// UTC hour-of-day of the event
    pub fn hour(&self) -> AppResult<u32> {
        let timestamp = self
            .timestamp
            .as_ref()
            .ok_or_else(|| AppError::InvalidEvent("timestamp is required".to_string()))?;
        timestamp
            .to_utc()
            .map(|dt| dt.hour())
            .ok_or_else(|| AppError::InvalidEvent(format!("unparseable timestamp {:?}", timestamp)))
    }
}

/// Result of a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accept { target_id: String, url: String },
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

/// Wire form of an [`Outcome`]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DecisionResponse {
    pub decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<Outcome> for DecisionResponse {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Accept { url, .. } => Self {
                decision: Decision::Accept,
                url: Some(url),
            },
            Outcome::Reject => Self {
                decision: Decision::Reject,
                url: None,
            },
        }
    }
}

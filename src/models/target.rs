//! Target model

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use utoipa::ToSchema;
use validator::Validate;

/// Set of accepted values, written as `{ "$in": [...] }` on the wire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InSet {
    #[serde(rename = "$in", default)]
    pub values: Vec<String>,
}

impl InSet {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Whether `hour` (0..=23) is listed; `"3"` and `"03"` are the same hour
    pub fn contains_hour(&self, hour: u32) -> bool {
        self.values
            .iter()
            .filter_map(|v| v.trim().parse::<u32>().ok())
            .any(|h| h < 24 && h == hour)
    }
}

/// Geo-state / hour combination a target is willing to receive traffic for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_state: Option<InSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<InSet>,
}

/// An advertiser's standing offer
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: String,
    /// Destination reported on acceptance
    pub url: String,
    /// Bid amount, compared numerically
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub value: f64,
    /// Daily acceptance cap; 0 means never accepted
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub max_accepts_per_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<AcceptRules>,
}

impl Target {
    /// Whether the accept rules cover the visitor. Missing or empty rule sets
    /// match nothing.
    pub fn accepts(&self, geo_state: &str, hour: u32) -> bool {
        let Some(accept) = &self.accept else {
            return false;
        };
        match (&accept.geo_state, &accept.hour) {
            (Some(states), Some(hours)) => states.contains(geo_state) && hours.contains_hour(hour),
            _ => false,
        }
    }
}

/// Create / update target request
#[serde_as]
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TargetPayload {
    /// Required on create; ignored on update in favour of the path id
    pub id: Option<String>,
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[validate(range(min = 0.0, message = "value must be a non-negative number"))]
    pub value: f64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub max_accepts_per_day: u32,
    #[serde(default)]
    pub accept: Option<AcceptRules>,
}

impl TargetPayload {
    pub fn into_target(self, id: String) -> Target {
        Target {
            id,
            url: self.url,
            value: self.value,
            max_accepts_per_day: self.max_accepts_per_day,
            accept: self.accept,
        }
    }
}

/// Response for `GET /api/target/{id}`; an unknown id yields `null`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TargetEnvelope {
    pub target: Option<Target>,
}

/// Response for `GET /api/targets`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TargetList {
    pub targets: Vec<Target>,
}

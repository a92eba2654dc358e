//! Data models for the target router

pub mod decision;
pub mod target;
pub mod traffic;

// Re-export commonly used types
pub use decision::{DecisionResponse, Outcome, VisitorEvent};
pub use target::{AcceptRules, InSet, Target, TargetPayload};
pub use traffic::TrafficCounter;

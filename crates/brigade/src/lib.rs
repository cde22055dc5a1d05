//! Membership console core for a brigade company: badge catalog, advancement
//! eligibility, badge selection, parade attendance, and the HTTP surface over them.

pub mod attendance;
pub mod badges;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod members;
pub mod parades;
pub mod router;
pub mod service;
pub mod store;
pub mod telemetry;

pub use router::brigade_router;
pub use service::{BrigadeService, ServiceError};

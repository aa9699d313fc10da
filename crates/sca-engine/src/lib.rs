//! # Submission Compliance Engine
//!
//! Rule evaluation and audit aggregation for insurance submissions. The
//! crate stacks four layers:
//!
//! - [`local`] / [`remote`] — the two rule engines: an in-process evaluator
//!   over the rule catalog, and an HTTP client for an external rule service.
//! - [`gateway`] — routing between them, with local fallback, the
//!   restricted-industry overlay, and cache invalidation.
//! - [`aggregate`] / [`impact`] — the check → question → stage → submission
//!   roll-up and the before/after simulation of rule changes.
//! - [`service`] — the cached evaluation pipeline consumers talk to.

pub mod aggregate;
pub mod condition;
pub mod config;
pub mod error;
pub mod gateway;
pub mod impact;
pub mod local;
pub mod remote;
pub mod retry;
pub mod service;

pub use aggregate::{determine_question_status, generate_audit_compliance_status};
pub use condition::ConditionError;
pub use config::{ConfigError, GatewayConfig};
pub use error::EngineError;
pub use gateway::{EngineGateway, EngineMode, RESTRICTION_CHECK_ID};
pub use impact::analyze_impact;
pub use local::LocalEngine;
pub use remote::RemoteEngine;
pub use retry::RetryPolicy;
pub use service::{ComplianceMetrics, ComplianceService, QuestionMetrics, StageMetrics};

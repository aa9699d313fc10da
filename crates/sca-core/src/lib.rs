//! # sca-core — Foundational types for the Submission Compliance Audit Stack
//!
//! Defines the domain vocabulary shared by every crate in the workspace:
//!
//! - **Rules**: declarative condition + action pairs evaluated against an
//!   insurance submission ([`Rule`], [`RuleCondition`], [`RuleAction`]).
//! - **Checks**: the outcome of evaluating one rule against one submission
//!   ([`ComplianceCheck`], [`CheckStatus`], [`SubmissionVerdict`]).
//! - **Audit hierarchy**: the three-level compliance roll-up of question →
//!   lifecycle stage → submission ([`AuditQuestionResult`],
//!   [`StageComplianceResult`], [`AuditComplianceStatus`]).
//! - **Submissions**: the records supplied by an upstream submission source
//!   ([`Submission`], [`SubmissionDetail`], [`SubmissionSource`]).
//!
//! All wire-facing structs serialize with camelCase field names; status
//! enums use their kebab-case string forms. Enums that are deserialized from
//! a remote rule service carry a `#[serde(other)]` catch-all variant so that
//! a newer service cannot break an older client.

pub mod check;
pub mod question;
pub mod rule;
pub mod status;
pub mod submission;

pub use check::{
    ComplianceCheck, CheckStatus, EvaluationOutcome, EvaluationResult, RuleFire, SubmissionVerdict,
};
pub use question::{AuditQuestion, LifecycleStage, StageDefinition};
pub use rule::{ConditionOperator, Rule, RuleAction, RuleCondition, Severity};
pub use status::{
    AffectedSubmission, AuditComplianceStatus, AuditQuestionImpact, AuditQuestionResult,
    ComplianceStatus, RuleImpactAnalysis, StageComplianceResult, StatusCounts,
};
pub use submission::{
    Address, Broker, Coverage, DocumentRef, Industry, Insured, Submission, SubmissionDetail,
    SubmissionSource,
};

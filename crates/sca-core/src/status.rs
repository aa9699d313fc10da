//! # Compliance Status Hierarchy
//!
//! Defines [`ComplianceStatus`] with its severity ordering, and the derived
//! result types for the question → stage → submission roll-up plus the
//! rule impact-analysis report.
//!
//! ## Severity Ordering
//!
//! ```text
//! Ordering (worst → best): NonCompliant > AtRisk > NotEvaluated > Compliant
//!
//! worst(a, b) = the more severe of the two — pessimistic composition
//! ```
//!
//! `NonCompliant` is absorbing under `worst`: a single non-compliant result
//! dominates every aggregate it participates in.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::question::LifecycleStage;

// ---------------------------------------------------------------------------
// ComplianceStatus
// ---------------------------------------------------------------------------

/// The compliance verdict for one audit question, stage, or submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceStatus {
    /// All applicable checks passed.
    Compliant,
    /// At least one check flagged a warning-level concern.
    AtRisk,
    /// At least one check found a violation.
    NonCompliant,
    /// No applicable checks were performed.
    NotEvaluated,
}

impl ComplianceStatus {
    /// Severity rank. Higher is worse.
    fn severity(self) -> u8 {
        match self {
            Self::Compliant => 0,
            Self::NotEvaluated => 1,
            Self::AtRisk => 2,
            Self::NonCompliant => 3,
        }
    }

    /// Pessimistic composition: the more severe of the two statuses.
    ///
    /// `NonCompliant` is absorbing: `worst(x, NonCompliant) == NonCompliant`
    /// for all x, so a single violation dominates any aggregate.
    pub fn worst(self, other: Self) -> Self {
        if self.severity() >= other.severity() {
            self
        } else {
            other
        }
    }

    /// All four statuses in ascending severity order.
    pub fn all() -> [Self; 4] {
        [
            Self::Compliant,
            Self::NotEvaluated,
            Self::AtRisk,
            Self::NonCompliant,
        ]
    }
}

impl PartialOrd for ComplianceStatus {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComplianceStatus {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.severity().cmp(&other.severity())
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compliant => write!(f, "compliant"),
            Self::AtRisk => write!(f, "at-risk"),
            Self::NonCompliant => write!(f, "non-compliant"),
            Self::NotEvaluated => write!(f, "not-evaluated"),
        }
    }
}

// ---------------------------------------------------------------------------
// Roll-up result types
// ---------------------------------------------------------------------------

/// Derived compliance result for one audit question. Recomputed on every
/// evaluation; never persisted by this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuestionResult {
    pub question_id: String,
    pub status: ComplianceStatus,
    /// Check ids of every rule that matched this question's categories.
    pub triggered_rules: Vec<String>,
    pub findings: String,
    pub updated_at: DateTime<Utc>,
}

/// Derived compliance result for one lifecycle stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageComplianceResult {
    pub stage_id: LifecycleStage,
    pub question_results: Vec<AuditQuestionResult>,
    pub overall_status: ComplianceStatus,
}

/// Root aggregate of one submission's audit compliance evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditComplianceStatus {
    pub submission_id: String,
    pub timestamp: DateTime<Utc>,
    pub stage_results: Vec<StageComplianceResult>,
    pub overall_status: ComplianceStatus,
}

impl AuditComplianceStatus {
    /// Look up one question's result across all stages.
    pub fn question_result(&self, question_id: &str) -> Option<&AuditQuestionResult> {
        self.stage_results
            .iter()
            .flat_map(|s| s.question_results.iter())
            .find(|q| q.question_id == question_id)
    }
}

// ---------------------------------------------------------------------------
// Impact analysis report
// ---------------------------------------------------------------------------

/// Per-status counters used by the impact analysis report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    #[serde(rename = "compliant")]
    pub compliant: u32,
    #[serde(rename = "at-risk")]
    pub at_risk: u32,
    #[serde(rename = "non-compliant")]
    pub non_compliant: u32,
    #[serde(rename = "not-evaluated")]
    pub not_evaluated: u32,
}

impl StatusCounts {
    /// Increment the counter for `status`.
    pub fn record(&mut self, status: ComplianceStatus) {
        match status {
            ComplianceStatus::Compliant => self.compliant += 1,
            ComplianceStatus::AtRisk => self.at_risk += 1,
            ComplianceStatus::NonCompliant => self.non_compliant += 1,
            ComplianceStatus::NotEvaluated => self.not_evaluated += 1,
        }
    }

    /// Read the counter for `status`.
    pub fn get(&self, status: ComplianceStatus) -> u32 {
        match status {
            ComplianceStatus::Compliant => self.compliant,
            ComplianceStatus::AtRisk => self.at_risk,
            ComplianceStatus::NonCompliant => self.non_compliant,
            ComplianceStatus::NotEvaluated => self.not_evaluated,
        }
    }

    /// Sum of all counters.
    pub fn total(&self) -> u32 {
        self.compliant + self.at_risk + self.non_compliant + self.not_evaluated
    }
}

/// One submission whose overall status changed under a candidate rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedSubmission {
    pub submission_id: String,
    pub insured_name: String,
    pub before: ComplianceStatus,
    pub after: ComplianceStatus,
}

/// Per-question change counter in an impact analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuestionImpact {
    pub question_id: String,
    pub question_text: String,
    pub affected_count: u32,
}

/// Report produced by one impact-analysis run: the before/after simulation
/// of a rule change across a batch of submissions. Discarded after
/// consumption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleImpactAnalysis {
    /// Number of submissions whose overall status differs before vs. after.
    pub affected_submissions: u32,
    pub before_status_counts: StatusCounts,
    pub after_status_counts: StatusCounts,
    /// First affected submissions in batch order, capped at 10.
    pub sample_affected: Vec<AffectedSubmission>,
    /// Questions whose own status changed, in catalog order.
    pub audit_question_impact: Vec<AuditQuestionImpact>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! # Compliance Checks
//!
//! A [`ComplianceCheck`] is the outcome of evaluating one rule against one
//! submission. One evaluation call yields an [`EvaluationOutcome`]: the list
//! of checks produced plus the worst-case [`SubmissionVerdict`] across them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rule::Severity;

/// Status of a single compliance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckStatus {
    Compliant,
    AtRisk,
    NonCompliant,
    /// The check's rule did not apply to this submission.
    NotEvaluated,
    /// Evaluating the rule itself failed; the rule's verdict is unknown.
    Error,
}

impl CheckStatus {
    /// Check status produced when a rule fires with the given action
    /// severity. A firing info-level action still records a compliant check.
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Warning => Self::AtRisk,
            Severity::Error => Self::NonCompliant,
            Severity::Info => Self::Compliant,
        }
    }
}

/// Result of evaluating one rule against one submission.
///
/// `check_id` echoes the rule id for catalog-backed checks; overlay checks
/// (such as the restricted-industry screen) carry synthetic ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCheck {
    pub check_id: String,
    pub category: String,
    pub status: CheckStatus,
    pub findings: String,
    pub timestamp: DateTime<Utc>,
    /// Field-level evidence backing the finding, e.g. the resolved value of
    /// the condition's field.
    #[serde(default)]
    pub data_points: serde_json::Map<String, serde_json::Value>,
}

/// Overall verdict of one evaluation call.
///
/// Distinct from [`ComplianceStatus`](crate::status::ComplianceStatus):
/// this is the per-call summary a rule engine reports, before the audit
/// roll-up reinterprets individual checks per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionVerdict {
    Compliant,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Non-Compliant")]
    NonCompliant,
    /// Forward-compatible catch-all for verdict strings this client does
    /// not know.
    #[serde(other)]
    Unknown,
}

impl SubmissionVerdict {
    /// Worst-case verdict across a check set.
    ///
    /// An `Error`-status check means that rule's verdict is unknowable, so
    /// it is treated as pessimistically as a violation.
    pub fn from_checks(checks: &[ComplianceCheck]) -> Self {
        let mut verdict = Self::Compliant;
        for check in checks {
            match check.status {
                CheckStatus::NonCompliant | CheckStatus::Error => return Self::NonCompliant,
                CheckStatus::AtRisk => verdict = Self::AtRisk,
                CheckStatus::Compliant | CheckStatus::NotEvaluated => {}
            }
        }
        verdict
    }
}

impl std::fmt::Display for SubmissionVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compliant => write!(f, "Compliant"),
            Self::AtRisk => write!(f, "At Risk"),
            Self::NonCompliant => write!(f, "Non-Compliant"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// The checks produced by one evaluation call plus their summary verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationOutcome {
    pub checks: Vec<ComplianceCheck>,
    pub overall_status: SubmissionVerdict,
}

impl EvaluationOutcome {
    /// Build an outcome from a check set, deriving the verdict.
    pub fn from_checks(checks: Vec<ComplianceCheck>) -> Self {
        let overall_status = SubmissionVerdict::from_checks(&checks);
        Self {
            checks,
            overall_status,
        }
    }
}

/// Wire-level evaluation response of a remote rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub submission_id: String,
    pub timestamp: DateTime<Utc>,
    pub overall_status: SubmissionVerdict,
    #[serde(default)]
    pub checks: Vec<ComplianceCheck>,
}

impl From<EvaluationResult> for EvaluationOutcome {
    fn from(result: EvaluationResult) -> Self {
        Self {
            checks: result.checks,
            overall_status: result.overall_status,
        }
    }
}

/// Result of testing one rule in isolation: the action that fired plus the
/// data points resolved from the submission. `None` means the condition did
/// not match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFire {
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub data_points: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(id: &str, status: CheckStatus) -> ComplianceCheck {
        ComplianceCheck {
            check_id: id.to_owned(),
            category: "Risk Appetite".to_owned(),
            status,
            findings: String::new(),
            timestamp: Utc::now(),
            data_points: serde_json::Map::new(),
        }
    }

    #[test]
    fn severity_maps_to_check_status() {
        assert_eq!(
            CheckStatus::from_severity(Severity::Warning),
            CheckStatus::AtRisk
        );
        assert_eq!(
            CheckStatus::from_severity(Severity::Error),
            CheckStatus::NonCompliant
        );
        assert_eq!(
            CheckStatus::from_severity(Severity::Info),
            CheckStatus::Compliant
        );
    }

    #[test]
    fn verdict_of_empty_check_set_is_compliant() {
        assert_eq!(
            SubmissionVerdict::from_checks(&[]),
            SubmissionVerdict::Compliant
        );
    }

    #[test]
    fn verdict_takes_worst_check() {
        let checks = vec![
            check("a", CheckStatus::Compliant),
            check("b", CheckStatus::AtRisk),
        ];
        assert_eq!(
            SubmissionVerdict::from_checks(&checks),
            SubmissionVerdict::AtRisk
        );

        let checks = vec![
            check("a", CheckStatus::AtRisk),
            check("b", CheckStatus::NonCompliant),
        ];
        assert_eq!(
            SubmissionVerdict::from_checks(&checks),
            SubmissionVerdict::NonCompliant
        );
    }

    #[test]
    fn error_check_is_treated_as_non_compliant() {
        let checks = vec![
            check("a", CheckStatus::Compliant),
            check("b", CheckStatus::Error),
        ];
        assert_eq!(
            SubmissionVerdict::from_checks(&checks),
            SubmissionVerdict::NonCompliant
        );
    }

    #[test]
    fn verdict_serializes_to_display_strings() {
        assert_eq!(
            serde_json::to_string(&SubmissionVerdict::NonCompliant).unwrap(),
            "\"Non-Compliant\""
        );
        assert_eq!(
            serde_json::to_string(&SubmissionVerdict::AtRisk).unwrap(),
            "\"At Risk\""
        );
        let parsed: SubmissionVerdict = serde_json::from_str("\"Pending Review\"").unwrap();
        assert_eq!(parsed, SubmissionVerdict::Unknown);
    }

    #[test]
    fn check_serializes_camel_case() {
        let json = serde_json::to_value(check("risk_appetite_001", CheckStatus::AtRisk)).unwrap();
        assert_eq!(json["checkId"], "risk_appetite_001");
        assert_eq!(json["status"], "at-risk");
        assert!(json["dataPoints"].is_object());
    }

    #[test]
    fn evaluation_result_converts_to_outcome() {
        let result = EvaluationResult {
            submission_id: "SUB-001".to_owned(),
            timestamp: Utc::now(),
            overall_status: SubmissionVerdict::AtRisk,
            checks: vec![check("a", CheckStatus::AtRisk)],
        };
        let outcome = EvaluationOutcome::from(result);
        assert_eq!(outcome.overall_status, SubmissionVerdict::AtRisk);
        assert_eq!(outcome.checks.len(), 1);
    }
}

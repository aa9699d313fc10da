//! # Submission Records
//!
//! Submission data arrives from an upstream source system; this crate only
//! consumes it. Nearly every field is optional: rule conditions resolve
//! dotted paths into whatever the source provided and treat missing data as
//! an unresolved value rather than an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::check::ComplianceCheck;

/// Industry classification of the insured (SIC/NAICS).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Industry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Postal address of the insured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

/// The party seeking coverage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insured {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<Industry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_in_business: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u32>,
}

/// The broker who placed the submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Broker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Requested coverage terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
}

/// A document attached to the submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// A submission as listed by the upstream source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub submission_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insured: Option<Insured>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<Broker>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Submission {
    /// Insured name, or "Unknown" when the source did not provide one.
    pub fn insured_name(&self) -> &str {
        self.insured
            .as_ref()
            .and_then(|i| i.name.as_deref())
            .unwrap_or("Unknown")
    }
}

/// Full submission record used by the detail views and the evaluation
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetail {
    #[serde(flatten)]
    pub submission: Submission,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Coverage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<DocumentRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_checks: Option<Vec<ComplianceCheck>>,
}

/// Upstream source of submission records.
///
/// The compliance stack consumes submissions; it never creates or mutates
/// them. Implementations wrap whatever transport the deployment uses.
#[allow(async_fn_in_trait)]
pub trait SubmissionSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// List all submissions known to the source.
    async fn submissions(&self) -> Result<Vec<Submission>, Self::Error>;

    /// Fetch one submission's full record.
    async fn submission_detail(&self, id: &str) -> Result<SubmissionDetail, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_deserializes_with_sparse_fields() {
        let submission: Submission = serde_json::from_value(serde_json::json!({
            "submissionId": "SUB-001",
            "timestamp": "2026-03-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(submission.submission_id, "SUB-001");
        assert!(submission.insured.is_none());
        assert_eq!(submission.insured_name(), "Unknown");
    }

    #[test]
    fn insured_name_falls_back_when_name_missing() {
        let submission: Submission = serde_json::from_value(serde_json::json!({
            "submissionId": "SUB-002",
            "timestamp": "2026-03-01T12:00:00Z",
            "insured": { "industry": { "code": "6531" } }
        }))
        .unwrap();
        assert_eq!(submission.insured_name(), "Unknown");
    }

    #[test]
    fn detail_flattens_base_submission_fields() {
        let detail: SubmissionDetail = serde_json::from_value(serde_json::json!({
            "submissionId": "SUB-003",
            "timestamp": "2026-03-01T12:00:00Z",
            "insured": { "name": "Acme Logistics" },
            "coverage": { "lines": ["property"], "effectiveDate": "2026-04-01" },
            "documents": [{ "id": "doc-1", "type": "application" }]
        }))
        .unwrap();
        assert_eq!(detail.submission.submission_id, "SUB-003");
        assert_eq!(detail.submission.insured_name(), "Acme Logistics");
        assert_eq!(
            detail.documents.as_ref().unwrap()[0].kind.as_deref(),
            Some("application")
        );
    }

    #[test]
    fn detail_serializes_flat_camel_case() {
        let detail = SubmissionDetail {
            submission: Submission {
                submission_id: "SUB-004".to_owned(),
                insured: None,
                broker: None,
                timestamp: Utc::now(),
                status: Some("In Review".to_owned()),
            },
            coverage: None,
            documents: None,
            compliance_checks: None,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["submissionId"], "SUB-004");
        assert!(json.get("coverage").is_none());
    }
}

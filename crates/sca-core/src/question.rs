//! # Audit Questions
//!
//! Audit questions are the fixed reference vocabulary of the compliance
//! roll-up: every question belongs to one underwriting [`LifecycleStage`]
//! and names the rule categories whose checks answer it.

use serde::{Deserialize, Serialize};

/// The five stages of the underwriting lifecycle, in process order.
///
/// Serialized as its numeric id (1–5) for wire parity with the audit
/// reporting format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum LifecycleStage {
    SubmissionRiskAssessment = 1,
    RiskEngineeringTechnical = 2,
    PricingQuoting = 3,
    Binding = 4,
    PolicyIssuance = 5,
}

impl LifecycleStage {
    /// All stages in process order.
    pub fn all() -> [Self; 5] {
        [
            Self::SubmissionRiskAssessment,
            Self::RiskEngineeringTechnical,
            Self::PricingQuoting,
            Self::Binding,
            Self::PolicyIssuance,
        ]
    }

    /// Numeric stage id (1-based process position).
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Human-readable stage name.
    pub fn name(self) -> &'static str {
        match self {
            Self::SubmissionRiskAssessment => "Submission and Risk Assessment",
            Self::RiskEngineeringTechnical => "Risk Engineering and Technical Assessment",
            Self::PricingQuoting => "Pricing and Quoting",
            Self::Binding => "Binding",
            Self::PolicyIssuance => "Policy Issuance",
        }
    }
}

impl From<LifecycleStage> for u8 {
    fn from(stage: LifecycleStage) -> Self {
        stage.id()
    }
}

impl TryFrom<u8> for LifecycleStage {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        LifecycleStage::all()
            .into_iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| format!("unknown lifecycle stage id: {id}"))
    }
}

/// One audit question: what an underwriting audit asks about a submission
/// at a given lifecycle stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuestion {
    pub id: String,
    pub text: String,
    pub description: String,
    pub stage: LifecycleStage,
    /// Structured data sources an auditor would consult.
    #[serde(default)]
    pub structured_data_inputs: Vec<String>,
    /// Documents and narratives an auditor would consult.
    #[serde(default)]
    pub unstructured_data_inputs: Vec<String>,
    /// Where in the lifecycle the evidence is first captured.
    pub capture_point: String,
    /// Where in the lifecycle the question must be answered.
    pub validation_point: String,
    /// Rule categories whose checks answer this question.
    #[serde(default)]
    pub relevant_rule_categories: Vec<String>,
}

/// A lifecycle stage together with its audit questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDefinition {
    pub id: LifecycleStage,
    pub name: String,
    pub description: String,
    pub audit_questions: Vec<AuditQuestion>,
}

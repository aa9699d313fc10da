//! # Audit Question Catalog
//!
//! Reference data: the underwriting audit questions of each lifecycle
//! stage. Fixed at construction; stages 3–5 carry no questions yet and roll
//! up as not-evaluated until their audit programs are defined.

use std::collections::HashMap;

use sca_core::{AuditQuestion, LifecycleStage, StageDefinition};

/// The audit questions of every lifecycle stage, in stage and catalog order.
#[derive(Debug, Clone)]
pub struct AuditQuestionCatalog {
    stages: Vec<StageDefinition>,
}

impl Default for AuditQuestionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditQuestionCatalog {
    /// Catalog with the standard underwriting audit program.
    pub fn new() -> Self {
        Self {
            stages: standard_stages(),
        }
    }

    /// Stage definitions in process order. Only stages with questions are
    /// listed.
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Every question across all stages, in catalog order.
    pub fn all(&self) -> impl Iterator<Item = &AuditQuestion> {
        self.stages.iter().flat_map(|s| s.audit_questions.iter())
    }

    /// Questions of one stage, empty for stages without an audit program.
    pub fn stage(&self, stage: LifecycleStage) -> &[AuditQuestion] {
        self.stages
            .iter()
            .find(|s| s.id == stage)
            .map(|s| s.audit_questions.as_slice())
            .unwrap_or(&[])
    }

    /// Look up one question by id.
    pub fn get(&self, id: &str) -> Option<&AuditQuestion> {
        self.all().find(|q| q.id == id)
    }

    /// Rule category → question ids, each list in catalog order without
    /// duplicates.
    pub fn categories_to_questions(&self) -> HashMap<String, Vec<String>> {
        let mut mapping: HashMap<String, Vec<String>> = HashMap::new();
        for question in self.all() {
            for category in &question.relevant_rule_categories {
                let ids = mapping.entry(category.clone()).or_default();
                if !ids.iter().any(|id| id == &question.id) {
                    ids.push(question.id.clone());
                }
            }
        }
        mapping
    }
}

fn question(
    id: &str,
    text: &str,
    description: &str,
    stage: LifecycleStage,
    structured: &[&str],
    unstructured: &[&str],
    capture_point: &str,
    validation_point: &str,
    categories: &[&str],
) -> AuditQuestion {
    AuditQuestion {
        id: id.to_owned(),
        text: text.to_owned(),
        description: description.to_owned(),
        stage,
        structured_data_inputs: structured.iter().map(|s| (*s).to_owned()).collect(),
        unstructured_data_inputs: unstructured.iter().map(|s| (*s).to_owned()).collect(),
        capture_point: capture_point.to_owned(),
        validation_point: validation_point.to_owned(),
        relevant_rule_categories: categories.iter().map(|s| (*s).to_owned()).collect(),
    }
}

fn standard_stages() -> Vec<StageDefinition> {
    use LifecycleStage::{RiskEngineeringTechnical, SubmissionRiskAssessment};

    let stage1 = vec![
        question(
            "doc-completeness",
            "Were submissions, applications and supplemental apps received?",
            "Verifies that all required submission documents have been received and are complete",
            SubmissionRiskAssessment,
            &[
                "Document receipt timestamps",
                "Document type classifications",
                "Document repository index",
                "Application checklist status",
            ],
            &[
                "Actual submission documents",
                "Application forms",
                "Supplemental application documents",
                "Email correspondence",
            ],
            "Initial submission receipt",
            "Submission review completion",
            &["Document Completeness"],
        ),
        question(
            "risk-appetite",
            "Does risk selection reflect product line / portfolio management strategy and underwriting appetite?",
            "Ensures the submission aligns with defined risk appetite and underwriting strategy",
            SubmissionRiskAssessment,
            &[
                "Prohibited business classes list",
                "Excluded perils list",
                "Product line strategy metrics",
                "Risk appetite thresholds",
                "Industry codes (SIC/NAICS)",
            ],
            &[
                "Underwriting guidelines documents",
                "Portfolio management strategy documents",
                "Underwriter notes on risk selection rationale",
                "Exception approval documentation",
            ],
            "Initial risk triage",
            "Before quote generation",
            &["Risk Appetite"],
        ),
        question(
            "industry-classification",
            "Was industry and occupational classification adequately assessed?",
            "Validates that the industry classification is accurate and properly evaluated",
            SubmissionRiskAssessment,
            &[
                "SIC/NAICS codes in submission",
                "SIC/NAICS codes in rating model",
                "Industry classification data",
                "Occupational hazard ratings",
            ],
            &[
                "Industry assessment documentation",
                "Occupational risk evaluation notes",
                "Underwriter's industry-specific analysis",
            ],
            "Initial submission review",
            "Rating/pricing stage",
            &["Industry Classification"],
        ),
        question(
            "financial-strength",
            "Has the Insured's financial strength been analyzed?",
            "Confirms that financial analysis has been performed and meets guidelines",
            SubmissionRiskAssessment,
            &[
                "Financial ratings (D&B, etc.)",
                "Financial ratio calculations",
                "Balance sheet metrics",
                "Income statement data points",
                "Financial guideline thresholds",
            ],
            &[
                "Financial statements",
                "D&B reports",
                "Credit rating agency reports",
                "Financial analysis documentation",
                "Approval documentation for exceptions",
            ],
            "Financial documentation review",
            "Prior to quoting",
            &["Financial Strength"],
        ),
        question(
            "loss-history",
            "Was an up-to-date loss history received and adequately analyzed?",
            "Verifies that loss history has been properly reviewed and assessed",
            SubmissionRiskAssessment,
            &[
                "Loss history date stamps",
                "Loss run data points",
                "Loss ratio calculations",
                "Industry average loss benchmarks",
            ],
            &[
                "Loss run reports",
                "Loss analysis documentation",
                "Underwriter's notes on loss trends",
                "Claim details narratives",
            ],
            "Loss documentation review",
            "Prior to quoting",
            &["Loss History"],
        ),
    ];

    let stage2 = vec![
        question(
            "risk-engineering",
            "Were Risk Engineering reviews ordered & received in a timely manner per guidelines?",
            "Confirms that required risk engineering assessments were completed appropriately",
            RiskEngineeringTechnical,
            &[
                "Risk engineering request timestamps",
                "Risk engineering report receipt timestamps",
                "Risk engineering requirement flags",
                "Timeliness metrics vs. guidelines",
            ],
            &[
                "Risk engineering reports",
                "Risk mitigation recommendations",
                "Underwriter notes on engineering findings",
                "Risk improvement plans",
            ],
            "Risk engineering request",
            "Prior to final pricing",
            &["Risk Engineering"],
        ),
        question(
            "cat-exposure",
            "Has natural CAT exposure been underwritten per line of business guidelines?",
            "Ensures catastrophe exposure has been evaluated against established guidelines",
            RiskEngineeringTechnical,
            &[
                "CAT model inputs",
                "CAT exposure calculations",
                "CAT exposure vs. thresholds",
                "Natural CAT premium adequacy metrics",
            ],
            &[
                "CAT modeling reports",
                "Reinsurance guidelines for CAT exposures",
                "Underwriter notes on CAT risks",
                "Exception documentation for CAT exposures",
            ],
            "CAT modeling stage",
            "Prior to binding",
            &["Natural CAT Exposure"],
        ),
    ];

    vec![
        StageDefinition {
            id: SubmissionRiskAssessment,
            name: "Submission and Risk Assessment".to_owned(),
            description: "Initial evaluation of submission and risk assessment".to_owned(),
            audit_questions: stage1,
        },
        StageDefinition {
            id: RiskEngineeringTechnical,
            name: "Risk Engineering and Technical Assessment".to_owned(),
            description: "Technical risk assessment and engineering evaluation".to_owned(),
            audit_questions: stage2,
        },
    ]
}

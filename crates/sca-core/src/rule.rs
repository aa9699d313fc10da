//! # Rule Definitions
//!
//! A [`Rule`] is a declarative condition + action pair evaluated against a
//! submission. Rules are long-lived configuration data, mutated only through
//! the rule catalog's CRUD operations or a remote rule service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comparison operator of a rule condition.
///
/// Closed enumeration with exhaustive-match evaluation. The `Unknown`
/// catch-all absorbs any operator string introduced by a newer rule service;
/// it always evaluates to false rather than failing the evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    /// Resolved field value strictly equals `values[0]`.
    Equals,
    /// Resolved field value strictly differs from `values[0]`.
    NotEquals,
    /// Resolved field value is a member of `values`.
    In,
    /// Resolved field value is not a member of `values`.
    NotIn,
    /// Forward-compatible catch-all for operators this client does not know.
    #[serde(other)]
    Unknown,
}

/// Condition of a rule: a dotted field path, an operator, and the operand
/// values. Pure value object, no identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    /// Condition kind tag (e.g. "expression"). Carried for wire parity.
    #[serde(rename = "type")]
    pub kind: String,
    pub operator: ConditionOperator,
    /// Dotted path into the submission record, e.g. `insured.industry.code`.
    pub field: String,
    #[serde(default)]
    pub values: Vec<serde_json::Value>,
}

/// Severity of a rule action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Action attached to a rule. A rule carries at least one action; evaluation
/// consumes only the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    /// Action kind tag (e.g. "flag"). Carried for wire parity.
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub message: String,
}

fn default_enabled() -> bool {
    true
}

/// A compliance rule: condition + actions, plus catalog metadata.
///
/// Invariants: `id` is unique within a rule catalog; disabled rules are
/// never evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub version: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub condition: RuleCondition,
    pub actions: Vec<RuleAction>,
    /// Explicit question mapping; when present it short-circuits the
    /// category/keyword mapper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_question_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulatory_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_impact: Option<String>,
}

impl Rule {
    /// The action consumed by evaluation. Only `actions[0]` is ever applied;
    /// any further actions are carried but ignored.
    pub fn primary_action(&self) -> Option<&RuleAction> {
        self.actions.first()
    }
}

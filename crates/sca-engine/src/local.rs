//! # Local Rule Engine
//!
//! Evaluates the rule catalog against submissions in-process. This is both
//! the default engine and the mandatory fallback when a remote engine
//! misbehaves, so it must never fail a whole batch: a rule that cannot be
//! evaluated yields one `Error`-status check and the batch continues.

use std::sync::Arc;

use chrono::Utc;
use sca_catalog::RuleCatalog;
use sca_core::{
    CheckStatus, ComplianceCheck, EvaluationOutcome, Rule, RuleFire,
};
use serde::Serialize;
use serde_json::Value;

use crate::condition::{self, ConditionError};

/// In-process rule engine over a shared catalog.
#[derive(Debug, Clone)]
pub struct LocalEngine {
    catalog: Arc<RuleCatalog>,
}

impl LocalEngine {
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self { catalog }
    }

    /// The catalog backing this engine. CRUD goes straight through it.
    pub fn catalog(&self) -> &Arc<RuleCatalog> {
        &self.catalog
    }

    /// Evaluate every enabled rule against a submission.
    ///
    /// Only fails when the submission itself cannot be serialized; per-rule
    /// failures become `Error`-status checks and the batch continues.
    pub fn evaluate_submission<T: Serialize>(
        &self,
        submission: &T,
    ) -> Result<EvaluationOutcome, ConditionError> {
        let root = serde_json::to_value(submission)?;
        let mut checks = Vec::new();

        for rule in self.catalog.enabled() {
            match check_for_rule(&rule, &root) {
                Ok(Some(check)) => checks.push(check),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(rule_id = %rule.id, error = %e, "rule evaluation failed");
                    checks.push(error_check(&rule));
                }
            }
        }

        Ok(EvaluationOutcome::from_checks(checks))
    }

    /// Evaluate one rule in isolation. `None` means the condition did not
    /// match. Disabled rules are tested like any other; the caller asked
    /// about this rule explicitly.
    pub fn test_rule<T: Serialize>(
        &self,
        rule: &Rule,
        data: &T,
    ) -> Result<Option<RuleFire>, ConditionError> {
        let root = serde_json::to_value(data)?;
        fire_for_rule(rule, &root)
    }
}

/// The action fired by `rule` against an already-serialized submission.
pub(crate) fn fire_for_rule(rule: &Rule, root: &Value) -> Result<Option<RuleFire>, ConditionError> {
    if !condition::evaluate(&rule.condition, root)? {
        return Ok(None);
    }
    let Some(action) = rule.primary_action() else {
        return Ok(None);
    };
    Ok(Some(RuleFire {
        severity: action.severity,
        message: action.message.clone(),
        data_points: extract_data_points(rule, root),
    }))
}

/// The check produced by `rule`, or `None` when its condition did not match.
pub(crate) fn check_for_rule(
    rule: &Rule,
    root: &Value,
) -> Result<Option<ComplianceCheck>, ConditionError> {
    Ok(fire_for_rule(rule, root)?.map(|fire| ComplianceCheck {
        check_id: rule.id.clone(),
        category: rule.category.clone(),
        status: CheckStatus::from_severity(fire.severity),
        findings: fire.message,
        timestamp: Utc::now(),
        data_points: fire.data_points,
    }))
}

/// Data points recorded alongside a firing rule: the condition field's leaf
/// name mapped to its resolved value, when there is one.
fn extract_data_points(rule: &Rule, root: &Value) -> serde_json::Map<String, Value> {
    let mut points = serde_json::Map::new();
    if let Some(value) = condition::resolve_path(root, &rule.condition.field) {
        points.insert(
            condition::leaf_field(&rule.condition.field).to_owned(),
            value.clone(),
        );
    }
    points
}

fn error_check(rule: &Rule) -> ComplianceCheck {
    let mut data_points = serde_json::Map::new();
    data_points.insert("error".to_owned(), "Rule evaluation failed".into());
    ComplianceCheck {
        check_id: rule.id.clone(),
        category: rule.category.clone(),
        status: CheckStatus::Error,
        findings: "Error evaluating this rule".to_owned(),
        timestamp: Utc::now(),
        data_points,
    }
}

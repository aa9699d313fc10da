//! # Rule Catalog
//!
//! In-memory rule store with CRUD semantics. The catalog is the single
//! source of truth for local evaluation; a remote rule service maintains its
//! own store and is reached through the engine gateway instead.

use chrono::Utc;
use parking_lot::RwLock;
use sca_core::{ConditionOperator, Rule, RuleAction, RuleCondition, Severity};

use crate::error::CatalogError;

/// Thread-safe rule store. Construct one per deployment and share it behind
/// an `Arc`.
#[derive(Debug, Default)]
pub struct RuleCatalog {
    rules: RwLock<Vec<Rule>>,
}

impl RuleCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with the stock risk-appetite rule.
    pub fn with_default_rules() -> Self {
        let catalog = Self::new();
        catalog.rules.write().push(industry_risk_rule());
        catalog
    }

    /// Look up one rule by id.
    pub fn get(&self, id: &str) -> Option<Rule> {
        self.rules.read().iter().find(|r| r.id == id).cloned()
    }

    /// List rules, optionally restricted to one category. Disabled rules are
    /// included; evaluation filters them out, catalog listings do not.
    pub fn list(&self, category: Option<&str>) -> Vec<Rule> {
        let rules = self.rules.read();
        match category {
            Some(category) => rules
                .iter()
                .filter(|r| r.category == category)
                .cloned()
                .collect(),
            None => rules.clone(),
        }
    }

    /// Enabled rules only, in catalog order. This is the evaluation set.
    pub fn enabled(&self) -> Vec<Rule> {
        self.rules.read().iter().filter(|r| r.enabled).cloned().collect()
    }

    /// Add a new rule. The id must not already exist. An empty version
    /// defaults to "1.0".
    pub fn create(&self, mut rule: Rule) -> Result<Rule, CatalogError> {
        let mut rules = self.rules.write();
        if rules.iter().any(|r| r.id == rule.id) {
            return Err(CatalogError::DuplicateRule { id: rule.id });
        }
        if rule.version.is_empty() {
            rule.version = "1.0".to_owned();
        }
        rule.last_updated = Utc::now();
        rules.push(rule.clone());
        tracing::debug!(rule_id = %rule.id, category = %rule.category, "rule created");
        Ok(rule)
    }

    /// Replace an existing rule, stamping `last_updated`.
    pub fn update(&self, mut rule: Rule) -> Result<Rule, CatalogError> {
        let mut rules = self.rules.write();
        let slot = rules
            .iter_mut()
            .find(|r| r.id == rule.id)
            .ok_or_else(|| CatalogError::NotFound {
                id: rule.id.clone(),
            })?;
        rule.last_updated = Utc::now();
        *slot = rule.clone();
        tracing::debug!(rule_id = %rule.id, "rule updated");
        Ok(rule)
    }

    /// Remove a rule. Returns whether a rule with that id existed.
    pub fn delete(&self, id: &str) -> bool {
        let mut rules = self.rules.write();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        let deleted = rules.len() < before;
        if deleted {
            tracing::debug!(rule_id = %id, "rule deleted");
        }
        deleted
    }
}

/// The stock "Industry Risk Classification" rule: flags submissions whose
/// NAICS industry code falls in the standing restricted set.
fn industry_risk_rule() -> Rule {
    Rule {
        id: "risk_appetite_001".to_owned(),
        name: "Industry Risk Classification".to_owned(),
        description: "Validates if the industry is within acceptable risk appetite".to_owned(),
        category: "Risk Appetite".to_owned(),
        version: "1.0".to_owned(),
        last_updated: Utc::now(),
        enabled: true,
        condition: RuleCondition {
            kind: "expression".to_owned(),
            operator: ConditionOperator::In,
            field: "insured.industry.code".to_owned(),
            values: vec!["5812".into(), "7371".into(), "6531".into()],
        },
        actions: vec![RuleAction {
            kind: "flag".to_owned(),
            severity: Severity::Warning,
            message: "Industry is in restricted list".to_owned(),
        }],
        audit_question_ids: None,
        regulatory_reference: None,
        business_impact: None,
    }
}

//! # Engine Gateway
//!
//! Routes every engine operation to the local or remote engine and owns the
//! cross-cutting policy around them:
//!
//! - **Fallback**: any remote transport or protocol failure is logged and
//!   recovered through the local engine. Callers of `evaluate_submission`
//!   and the CRUD passthroughs never see a transport error.
//! - **Restriction overlay**: a standing screen of restricted NAICS codes
//!   applied after whichever engine ran. It always runs last and always
//!   wins; no check set can suppress it.
//! - **Cache hygiene**: configuration and rule changes invalidate the
//!   affected caches so stale evaluations cannot leak across a change.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use sca_catalog::{AuditQuestionCatalog, ComplianceCaches};
use sca_core::{
    AuditComplianceStatus, CheckStatus, ComplianceCheck, EvaluationOutcome, Rule, RuleFire,
    RuleImpactAnalysis, Submission, SubmissionVerdict,
};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::aggregate::generate_audit_compliance_status;
use crate::config::GatewayConfig;
use crate::error::EngineError;
use crate::impact;
use crate::local::LocalEngine;
use crate::remote::RemoteEngine;
use crate::retry::RetryPolicy;

/// Check id of the restriction overlay's synthetic check.
pub const RESTRICTION_CHECK_ID: &str = "NAICS-RESTRICT-001";

/// Where the gateway routes remote-capable operations.
///
/// Demo mode pins everything to the local engine even when a remote engine
/// is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    Demo,
    Live,
}

impl std::fmt::Display for EngineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Demo => write!(f, "demo"),
            Self::Live => write!(f, "live"),
        }
    }
}

#[derive(Debug)]
struct GatewayState {
    use_remote: bool,
    remote: Option<RemoteEngine>,
    mode: EngineMode,
    timeout_secs: u64,
    retry: RetryPolicy,
    restricted_codes: Vec<String>,
    restriction_enabled: bool,
}

/// The engine facade the rest of the stack talks to.
#[derive(Debug)]
pub struct EngineGateway {
    local: LocalEngine,
    questions: Arc<AuditQuestionCatalog>,
    caches: Arc<ComplianceCaches>,
    state: RwLock<GatewayState>,
}

impl EngineGateway {
    pub fn new(
        local: LocalEngine,
        questions: Arc<AuditQuestionCatalog>,
        caches: Arc<ComplianceCaches>,
        config: GatewayConfig,
    ) -> Result<Self, EngineError> {
        let retry = RetryPolicy::new(config.max_retries);
        let remote = config
            .remote_url
            .as_ref()
            .map(|url| build_remote(url, config.timeout_secs, retry))
            .transpose()?;
        Ok(Self {
            local,
            questions,
            caches,
            state: RwLock::new(GatewayState {
                use_remote: config.use_remote,
                remote,
                mode: EngineMode::Live,
                timeout_secs: config.timeout_secs,
                retry,
                restricted_codes: config.restricted_codes,
                restriction_enabled: config.restriction_enabled,
            }),
        })
    }

    /// Point the gateway at a remote engine (or back to local-only).
    /// Idempotent; an actual change drops every cache.
    pub fn configure(&self, use_remote: bool, url: Option<&Url>) -> Result<(), EngineError> {
        let mut state = self.state.write();
        let new_base = url.map(|u| u.as_str().trim_end_matches('/').to_owned());
        let old_base = state.remote.as_ref().map(|r| r.base_url().to_owned());
        if state.use_remote == use_remote && old_base == new_base {
            return Ok(());
        }

        state.remote = url
            .map(|u| build_remote(u, state.timeout_secs, state.retry))
            .transpose()?;
        state.use_remote = use_remote;
        tracing::info!(use_remote, url = ?new_base, "rule engine reconfigured");
        drop(state);
        self.caches.clear_all();
        Ok(())
    }

    /// Switch between demo and live routing. Idempotent; an actual change
    /// drops every cache.
    pub fn set_mode(&self, mode: EngineMode) {
        let mut state = self.state.write();
        if state.mode == mode {
            return;
        }
        state.mode = mode;
        tracing::info!(%mode, "rule engine mode changed");
        drop(state);
        self.caches.clear_all();
    }

    pub fn mode(&self) -> EngineMode {
        self.state.read().mode
    }

    /// Replace the restricted-code set. Cached evaluations predate the new
    /// set and are dropped.
    pub fn set_restricted_codes(&self, codes: Vec<String>) {
        self.state.write().restricted_codes = codes;
        self.caches.clear_evaluations();
    }

    pub fn restricted_codes(&self) -> Vec<String> {
        self.state.read().restricted_codes.clone()
    }

    /// Toggle the restriction overlay. Cached evaluations are dropped.
    pub fn set_restriction_enabled(&self, enabled: bool) {
        self.state.write().restriction_enabled = enabled;
        self.caches.clear_evaluations();
    }

    pub fn restriction_enabled(&self) -> bool {
        self.state.read().restriction_enabled
    }

    /// The remote engine, when remote routing is both configured and
    /// currently selected.
    fn active_remote(&self) -> Option<RemoteEngine> {
        let state = self.state.read();
        if state.use_remote && state.mode == EngineMode::Live {
            state.remote.clone()
        } else {
            None
        }
    }

    /// Evaluate a submission through the selected engine, then apply the
    /// restriction overlay. Remote failures fall back to the local engine;
    /// this method only errors when the submission itself is unusable.
    pub async fn evaluate_submission<T: Serialize>(
        &self,
        submission: &T,
    ) -> Result<EvaluationOutcome, EngineError> {
        let root = serde_json::to_value(submission)
            .map_err(crate::condition::ConditionError::from)?;

        let outcome = match self.active_remote() {
            Some(remote) => match remote.evaluate_submission(&root).await {
                Ok(result) => EvaluationOutcome::from(result),
                Err(e) => {
                    tracing::warn!(error = %e, "remote evaluation failed, falling back to local engine");
                    self.local.evaluate_submission(&root)?
                }
            },
            None => self.local.evaluate_submission(&root)?,
        };

        Ok(self.apply_restriction_overlay(&root, outcome))
    }

    /// Append the restricted-industry check when it applies. Runs after
    /// either engine and forces the overall verdict.
    fn apply_restriction_overlay(
        &self,
        root: &Value,
        mut outcome: EvaluationOutcome,
    ) -> EvaluationOutcome {
        let state = self.state.read();
        if !state.restriction_enabled {
            return outcome;
        }
        let Some(code) = root
            .pointer("/insured/industry/code")
            .and_then(Value::as_str)
        else {
            return outcome;
        };
        if !state.restricted_codes.iter().any(|c| c == code) {
            return outcome;
        }

        let description = root
            .pointer("/insured/industry/description")
            .and_then(Value::as_str)
            .unwrap_or("");
        let mut data_points = serde_json::Map::new();
        data_points.insert("industryCode".to_owned(), code.into());
        data_points.insert("industryDescription".to_owned(), description.into());
        data_points.insert(
            "restrictedCodes".to_owned(),
            state.restricted_codes.join(", ").into(),
        );

        outcome.checks.push(ComplianceCheck {
            check_id: RESTRICTION_CHECK_ID.to_owned(),
            category: "Risk Appetite".to_owned(),
            status: CheckStatus::NonCompliant,
            findings: format!("Industry code {code} is in the restricted list"),
            timestamp: Utc::now(),
            data_points,
        });
        outcome.overall_status = SubmissionVerdict::NonCompliant;
        outcome
    }

    /// Fetch one rule, remote-first with local fallback.
    pub async fn rule(&self, id: &str) -> Result<Rule, EngineError> {
        if let Some(remote) = self.active_remote() {
            match remote.rule(id).await {
                Ok(rule) => return Ok(rule),
                Err(e) => {
                    tracing::warn!(rule_id = %id, error = %e, "remote rule fetch failed, using local catalog");
                }
            }
        }
        self.local
            .catalog()
            .get(id)
            .ok_or_else(|| sca_catalog::CatalogError::NotFound { id: id.to_owned() }.into())
    }

    /// List rules, remote-first with local fallback.
    pub async fn list_rules(&self, category: Option<&str>) -> Result<Vec<Rule>, EngineError> {
        if let Some(remote) = self.active_remote() {
            match remote.rules(category).await {
                Ok(rules) => return Ok(rules),
                Err(e) => {
                    tracing::warn!(error = %e, "remote rule listing failed, using local catalog");
                }
            }
        }
        Ok(self.local.catalog().list(category))
    }

    /// Create a rule on the selected engine. Catalog errors surface; the
    /// affected caches are dropped on success.
    pub async fn create_rule(&self, rule: Rule) -> Result<Rule, EngineError> {
        let created = match self.active_remote() {
            Some(remote) => match remote.create_rule(&rule).await {
                Ok(created) => created,
                Err(e) => {
                    tracing::warn!(rule_id = %rule.id, error = %e, "remote rule create failed, using local catalog");
                    self.local.catalog().create(rule)?
                }
            },
            None => self.local.catalog().create(rule)?,
        };
        self.invalidate_after_rule_change(Some(&created.category));
        Ok(created)
    }

    /// Update a rule on the selected engine.
    pub async fn update_rule(&self, rule: Rule) -> Result<Rule, EngineError> {
        let updated = match self.active_remote() {
            Some(remote) => match remote.update_rule(&rule).await {
                Ok(updated) => updated,
                Err(e) => {
                    tracing::warn!(rule_id = %rule.id, error = %e, "remote rule update failed, using local catalog");
                    self.local.catalog().update(rule)?
                }
            },
            None => self.local.catalog().update(rule)?,
        };
        // The category may have changed; drop every category listing.
        self.invalidate_after_rule_change(None);
        Ok(updated)
    }

    /// Delete a rule on the selected engine. Returns whether it existed.
    pub async fn delete_rule(&self, id: &str) -> Result<bool, EngineError> {
        let deleted = match self.active_remote() {
            Some(remote) => match remote.delete_rule(id).await {
                Ok(deleted) => deleted,
                Err(e) => {
                    tracing::warn!(rule_id = %id, error = %e, "remote rule delete failed, using local catalog");
                    self.local.catalog().delete(id)
                }
            },
            None => self.local.catalog().delete(id),
        };
        if deleted {
            self.invalidate_after_rule_change(None);
        }
        Ok(deleted)
    }

    /// Evaluate one rule in isolation through the selected engine.
    pub async fn test_rule<T: Serialize>(
        &self,
        rule: &Rule,
        data: &T,
    ) -> Result<Option<RuleFire>, EngineError> {
        if let Some(remote) = self.active_remote() {
            match remote.test_rule(rule, data).await {
                Ok(fire) => return Ok(fire),
                Err(e) => {
                    tracing::warn!(rule_id = %rule.id, error = %e, "remote rule test failed, using local engine");
                }
            }
        }
        Ok(self.local.test_rule(rule, data)?)
    }

    /// Rules mapped to one audit question. The remote endpoint is optional;
    /// when it is missing or failing, the rule list is filtered client-side
    /// by each rule's explicit question ids.
    pub async fn rules_for_audit_question(
        &self,
        question_id: &str,
    ) -> Result<Vec<Rule>, EngineError> {
        if let Some(remote) = self.active_remote() {
            match remote.rules_for_audit_question(question_id).await {
                Ok(rules) => return Ok(rules),
                Err(e) => {
                    tracing::warn!(question_id, error = %e, "remote audit-question listing failed, filtering locally");
                }
            }
        }
        let rules = self.list_rules(None).await?;
        Ok(rules
            .into_iter()
            .filter(|rule| {
                rule.audit_question_ids
                    .as_ref()
                    .is_some_and(|ids| ids.iter().any(|id| id == question_id))
            })
            .collect())
    }

    /// Full audit roll-up for a submission. The remote endpoint is
    /// optional; the fallback evaluates locally and aggregates in-process.
    pub async fn audit_compliance_status<T: Serialize>(
        &self,
        submission_id: &str,
        submission: &T,
    ) -> Result<AuditComplianceStatus, EngineError> {
        if let Some(remote) = self.active_remote() {
            match remote.audit_compliance(submission_id).await {
                Ok(status) => return Ok(status),
                Err(e) => {
                    tracing::warn!(submission_id, error = %e, "remote audit roll-up failed, aggregating locally");
                }
            }
        }
        let outcome = self.evaluate_submission(submission).await?;
        Ok(generate_audit_compliance_status(
            submission_id,
            &outcome.checks,
            &self.questions,
        ))
    }

    /// Impact analysis for a rule change. The remote endpoint is optional;
    /// the fallback simulates against the local engine.
    pub async fn analyze_impact(
        &self,
        candidate: &Rule,
        original: Option<&Rule>,
        submissions: &[Submission],
    ) -> Result<RuleImpactAnalysis, EngineError> {
        if let Some(remote) = self.active_remote() {
            let ids: Vec<String> = submissions
                .iter()
                .take(impact::MAX_BATCH)
                .map(|s| s.submission_id.clone())
                .collect();
            match remote.analyze_impact(candidate, original, &ids).await {
                Ok(report) => return Ok(report),
                Err(e) => {
                    tracing::warn!(rule_id = %candidate.id, error = %e, "remote impact analysis failed, simulating locally");
                }
            }
        }
        Ok(impact::analyze_impact(
            candidate,
            original,
            submissions,
            &self.questions,
        ))
    }

    /// Probe the configured remote engine. Errors when none is configured;
    /// this is the one operation with nothing to fall back to.
    pub async fn health(&self) -> Result<(), EngineError> {
        let remote = self.state.read().remote.clone();
        match remote {
            Some(remote) => remote.health().await,
            None => Err(EngineError::NotConfigured),
        }
    }

    fn invalidate_after_rule_change(&self, category: Option<&str>) {
        self.caches.clear_rules(category);
        self.caches.clear_mappings();
        self.caches.clear_evaluations();
    }
}

fn build_remote(
    url: &Url,
    timeout_secs: u64,
    retry: RetryPolicy,
) -> Result<RemoteEngine, EngineError> {
    Ok(RemoteEngine::new(url, timeout_secs)?.with_retry_policy(retry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sca_catalog::RuleCatalog;
    use serde_json::json;

    fn gateway() -> EngineGateway {
        EngineGateway::new(
            LocalEngine::new(Arc::new(RuleCatalog::with_default_rules())),
            Arc::new(AuditQuestionCatalog::new()),
            Arc::new(ComplianceCaches::new()),
            GatewayConfig::default(),
        )
        .unwrap()
    }

    fn submission(code: &str) -> Value {
        json!({
            "submissionId": "SUB-001",
            "timestamp": "2026-03-01T12:00:00Z",
            "insured": {
                "name": "Acme Logistics",
                "industry": { "code": code, "description": "Real estate" }
            }
        })
    }

    #[tokio::test]
    async fn overlay_forces_non_compliance_for_restricted_code() {
        let gateway = gateway();
        let outcome = gateway.evaluate_submission(&submission("6531")).await.unwrap();

        assert_eq!(outcome.overall_status, SubmissionVerdict::NonCompliant);
        let overlay = outcome
            .checks
            .iter()
            .find(|c| c.check_id == RESTRICTION_CHECK_ID)
            .unwrap();
        assert_eq!(overlay.status, CheckStatus::NonCompliant);
        assert_eq!(
            overlay.findings,
            "Industry code 6531 is in the restricted list"
        );
        assert_eq!(overlay.data_points["industryCode"], json!("6531"));
        assert_eq!(
            overlay.data_points["restrictedCodes"],
            json!("6531, 7371, 3579")
        );
        // The overlay is appended last.
        assert_eq!(outcome.checks.last().unwrap().check_id, RESTRICTION_CHECK_ID);
    }

    #[tokio::test]
    async fn overlay_leaves_clean_codes_alone() {
        let gateway = gateway();
        let outcome = gateway.evaluate_submission(&submission("1111")).await.unwrap();
        assert_eq!(outcome.overall_status, SubmissionVerdict::Compliant);
        assert!(outcome
            .checks
            .iter()
            .all(|c| c.check_id != RESTRICTION_CHECK_ID));
    }

    #[tokio::test]
    async fn disabling_the_overlay_suppresses_the_check() {
        let gateway = gateway();
        gateway.set_restriction_enabled(false);
        // 3579 is restricted but not in the stock rule's value set.
        let outcome = gateway.evaluate_submission(&submission("3579")).await.unwrap();
        assert_eq!(outcome.overall_status, SubmissionVerdict::Compliant);
        assert!(outcome.checks.is_empty());
    }

    #[tokio::test]
    async fn updated_restricted_codes_take_effect() {
        let gateway = gateway();
        gateway.set_restricted_codes(vec!["1111".to_owned()]);
        let outcome = gateway.evaluate_submission(&submission("1111")).await.unwrap();
        assert_eq!(outcome.overall_status, SubmissionVerdict::NonCompliant);
    }

    #[tokio::test]
    async fn demo_mode_pins_to_local_engine() {
        let gateway = gateway();
        gateway
            .configure(true, Some(&Url::parse("http://127.0.0.1:1/").unwrap()))
            .unwrap();
        gateway.set_mode(EngineMode::Demo);
        assert!(gateway.active_remote().is_none());
        assert_eq!(gateway.mode(), EngineMode::Demo);
    }

    #[tokio::test]
    async fn crud_passthrough_reaches_local_catalog() {
        let gateway = gateway();
        let mut rule = gateway.rule("risk_appetite_001").await.unwrap();
        rule.name = "Renamed".to_owned();
        let updated = gateway.update_rule(rule).await.unwrap();
        assert_eq!(updated.name, "Renamed");

        assert!(gateway.delete_rule("risk_appetite_001").await.unwrap());
        assert!(!gateway.delete_rule("risk_appetite_001").await.unwrap());
        assert!(gateway.list_rules(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn audit_question_listing_filters_by_explicit_ids() {
        let gateway = gateway();
        let mut rule = gateway.rule("risk_appetite_001").await.unwrap();
        rule.id = "explicit_rule".to_owned();
        rule.audit_question_ids = Some(vec!["doc-completeness".to_owned()]);
        gateway.create_rule(rule).await.unwrap();

        let mapped = gateway
            .rules_for_audit_question("doc-completeness")
            .await
            .unwrap();
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].id, "explicit_rule");
        assert!(gateway
            .rules_for_audit_question("risk-appetite")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn health_requires_a_configured_remote() {
        let gateway = gateway();
        assert!(matches!(
            gateway.health().await,
            Err(EngineError::NotConfigured)
        ));
    }
}

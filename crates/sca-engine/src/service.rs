//! # Compliance Evaluation Service
//!
//! The top of the stack: a cached pipeline over the engine gateway and the
//! compliance aggregator. Consumers ask it for audit compliance and it
//! decides what to recompute, what to serve from cache, and how to degrade
//! when evaluation fails.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sca_catalog::{mapping, AuditQuestionCatalog, ComplianceCaches};
use sca_core::{
    AuditComplianceStatus, AuditQuestionResult, CheckStatus, ComplianceCheck, ComplianceStatus,
    LifecycleStage, Rule, StageComplianceResult, StatusCounts, SubmissionDetail,
};
use serde::Serialize;

use crate::aggregate::{determine_question_status, generate_audit_compliance_status};
use crate::error::EngineError;
use crate::gateway::EngineGateway;

/// Findings text on the degraded status returned when evaluation fails.
pub const EVALUATION_FAILED_FINDINGS: &str = "Evaluation failed due to an error";

/// Per-stage status counts across a batch of submissions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageMetrics {
    pub stage: LifecycleStage,
    pub counts: StatusCounts,
}

/// Per-question status counts across a batch of submissions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionMetrics {
    pub question_id: String,
    pub counts: StatusCounts,
}

/// Batch compliance metrics, stages and questions in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceMetrics {
    pub stage_metrics: Vec<StageMetrics>,
    pub question_metrics: Vec<QuestionMetrics>,
}

/// Cached evaluation pipeline over gateway + aggregator.
#[derive(Debug)]
pub struct ComplianceService {
    gateway: Arc<EngineGateway>,
    questions: Arc<AuditQuestionCatalog>,
    caches: Arc<ComplianceCaches>,
}

impl ComplianceService {
    pub fn new(
        gateway: Arc<EngineGateway>,
        questions: Arc<AuditQuestionCatalog>,
        caches: Arc<ComplianceCaches>,
    ) -> Self {
        Self {
            gateway,
            questions,
            caches,
        }
    }

    pub fn gateway(&self) -> &Arc<EngineGateway> {
        &self.gateway
    }

    /// Evaluate a submission and roll the checks up the audit hierarchy.
    ///
    /// Results are cached per submission; `force_refresh` bypasses the
    /// cache. This method never fails: when evaluation errors out it
    /// returns an uncached all-stages not-evaluated status so a caller
    /// always has something well-formed to present.
    pub async fn evaluate_audit_compliance(
        &self,
        submission: &SubmissionDetail,
        force_refresh: bool,
    ) -> AuditComplianceStatus {
        let submission_id = submission.submission.submission_id.clone();

        if !force_refresh {
            if let Some(cached) = self.caches.evaluation(&submission_id) {
                return cached;
            }
        }

        match self.gateway.evaluate_submission(submission).await {
            Ok(outcome) => {
                let status = generate_audit_compliance_status(
                    &submission_id,
                    &outcome.checks,
                    &self.questions,
                );
                self.caches.store_evaluation(status.clone());
                status
            }
            Err(e) => {
                tracing::error!(
                    submission_id = %submission_id,
                    error = %e,
                    "audit compliance evaluation failed"
                );
                self.not_evaluated_status(&submission_id)
            }
        }
    }

    /// Evaluate a submission and log the roll-up. The logging variant of
    /// [`evaluate_audit_compliance`](Self::evaluate_audit_compliance) used
    /// by batch tooling.
    pub async fn process_submission(&self, submission: &SubmissionDetail) -> AuditComplianceStatus {
        let status = self.evaluate_audit_compliance(submission, false).await;
        log_compliance_results(&status);
        status
    }

    /// Evaluate one audit question in isolation: test only the rules mapped
    /// to the question and aggregate their checks.
    pub async fn evaluate_audit_question(
        &self,
        submission: &SubmissionDetail,
        question_id: &str,
    ) -> Result<AuditQuestionResult, EngineError> {
        let rules = self.rules_for_question(question_id).await?;
        let mut checks = Vec::new();

        for rule in rules.iter().filter(|r| r.enabled) {
            if let Some(fire) = self.gateway.test_rule(rule, submission).await? {
                checks.push(ComplianceCheck {
                    check_id: rule.id.clone(),
                    category: rule.category.clone(),
                    status: CheckStatus::from_severity(fire.severity),
                    findings: fire.message,
                    timestamp: Utc::now(),
                    data_points: fire.data_points,
                });
            }
        }

        Ok(determine_question_status(question_id, &checks, &self.questions))
    }

    /// Rules applicable to one lifecycle stage: the union of the rules in
    /// its questions' categories, de-duplicated by id, through the rule
    /// cache.
    pub async fn rules_for_stage(&self, stage: LifecycleStage) -> Result<Vec<Rule>, EngineError> {
        let mut rules: Vec<Rule> = Vec::new();
        for question in self.questions.stage(stage) {
            for category in &question.relevant_rule_categories {
                for rule in self.cached_rules(category).await? {
                    if !rules.iter().any(|r| r.id == rule.id) {
                        rules.push(rule);
                    }
                }
            }
        }
        Ok(rules)
    }

    /// Map rules to their audit questions through the mapping cache. A
    /// rule's explicit question ids win over the inferred mapping.
    pub fn map_rules_with_cache(&self, rules: &[Rule]) -> HashMap<String, Vec<String>> {
        rules
            .iter()
            .map(|rule| {
                let ids = match self.caches.mapping(&rule.id) {
                    Some(ids) => ids,
                    None => {
                        let ids = mapping::map_rule_to_questions(rule, &self.questions);
                        self.caches.store_mapping(&rule.id, ids.clone());
                        ids
                    }
                };
                (rule.id.clone(), ids)
            })
            .collect()
    }

    /// Per-stage and per-question status counts across a batch. Every
    /// submission contributes; a failed evaluation contributes its degraded
    /// not-evaluated status rather than being dropped.
    pub async fn compliance_metrics(&self, submissions: &[SubmissionDetail]) -> ComplianceMetrics {
        let mut stage_counts: Vec<(LifecycleStage, StatusCounts)> = LifecycleStage::all()
            .into_iter()
            .map(|s| (s, StatusCounts::default()))
            .collect();
        let mut question_counts: Vec<(String, StatusCounts)> = self
            .questions
            .all()
            .map(|q| (q.id.clone(), StatusCounts::default()))
            .collect();

        for submission in submissions {
            let status = self.evaluate_audit_compliance(submission, false).await;
            for stage_result in &status.stage_results {
                if let Some((_, counts)) = stage_counts
                    .iter_mut()
                    .find(|(stage, _)| *stage == stage_result.stage_id)
                {
                    counts.record(stage_result.overall_status);
                }
                for question_result in &stage_result.question_results {
                    if let Some((_, counts)) = question_counts
                        .iter_mut()
                        .find(|(id, _)| *id == question_result.question_id)
                    {
                        counts.record(question_result.status);
                    }
                }
            }
        }

        ComplianceMetrics {
            stage_metrics: stage_counts
                .into_iter()
                .map(|(stage, counts)| StageMetrics { stage, counts })
                .collect(),
            question_metrics: question_counts
                .into_iter()
                .map(|(question_id, counts)| QuestionMetrics {
                    question_id,
                    counts,
                })
                .collect(),
        }
    }

    /// Drop cached evaluations, one submission or all.
    pub fn clear_evaluation_cache(&self, submission_id: Option<&str>) {
        match submission_id {
            Some(id) => self.caches.clear_evaluation(id),
            None => self.caches.clear_evaluations(),
        }
    }

    async fn cached_rules(&self, category: &str) -> Result<Vec<Rule>, EngineError> {
        if let Some(rules) = self.caches.rules(Some(category)) {
            return Ok(rules);
        }
        let rules = self.gateway.list_rules(Some(category)).await?;
        self.caches.store_rules(Some(category), rules.clone());
        Ok(rules)
    }

    /// Rules mapped to one question: the rules in its relevant categories
    /// plus any rule that names the question explicitly.
    async fn rules_for_question(&self, question_id: &str) -> Result<Vec<Rule>, EngineError> {
        let mut rules: Vec<Rule> = Vec::new();
        if let Some(question) = self.questions.get(question_id) {
            for category in &question.relevant_rule_categories {
                for rule in self.cached_rules(category).await? {
                    if !rules.iter().any(|r| r.id == rule.id) {
                        rules.push(rule);
                    }
                }
            }
        }
        for rule in self.gateway.rules_for_audit_question(question_id).await? {
            if !rules.iter().any(|r| r.id == rule.id) {
                rules.push(rule);
            }
        }
        Ok(rules)
    }

    /// Degraded status when evaluation itself fails: every stage and
    /// question not-evaluated. Never cached; the next call retries.
    fn not_evaluated_status(&self, submission_id: &str) -> AuditComplianceStatus {
        let timestamp = Utc::now();
        let stage_results = LifecycleStage::all()
            .into_iter()
            .map(|stage| StageComplianceResult {
                stage_id: stage,
                question_results: self
                    .questions
                    .stage(stage)
                    .iter()
                    .map(|q| AuditQuestionResult {
                        question_id: q.id.clone(),
                        status: ComplianceStatus::NotEvaluated,
                        triggered_rules: Vec::new(),
                        findings: EVALUATION_FAILED_FINDINGS.to_owned(),
                        updated_at: timestamp,
                    })
                    .collect(),
                overall_status: ComplianceStatus::NotEvaluated,
            })
            .collect();

        AuditComplianceStatus {
            submission_id: submission_id.to_owned(),
            timestamp,
            stage_results,
            overall_status: ComplianceStatus::NotEvaluated,
        }
    }
}

fn log_compliance_results(status: &AuditComplianceStatus) {
    tracing::info!(
        submission_id = %status.submission_id,
        overall_status = %status.overall_status,
        "submission processed"
    );
    for stage_result in &status.stage_results {
        for question in stage_result
            .question_results
            .iter()
            .filter(|q| q.status != ComplianceStatus::Compliant)
        {
            tracing::debug!(
                stage = stage_result.stage_id.id(),
                question_id = %question.question_id,
                status = %question.status,
                findings = %question.findings,
                "question not compliant"
            );
        }
    }
}

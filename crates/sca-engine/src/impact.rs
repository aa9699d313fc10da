//! # Rule Impact Analysis
//!
//! Before/after simulation of a rule change across a batch of submissions.
//! Each submission is audited twice — once with the original rule, once
//! with the candidate — and the two roll-ups are compared. The report is a
//! point-in-time simulation; it is never persisted.

use sca_catalog::AuditQuestionCatalog;
use sca_core::{
    AffectedSubmission, AuditComplianceStatus, AuditQuestionImpact, ComplianceCheck, Rule,
    RuleImpactAnalysis, Submission,
};
use serde_json::Value;

use crate::aggregate::generate_audit_compliance_status;
use crate::local;

/// Bounded cost: submissions beyond this are ignored, deterministically.
pub const MAX_BATCH: usize = 100;

/// At most this many affected submissions are reported verbatim.
pub const SAMPLE_LIMIT: usize = 10;

/// Simulate a rule change across `submissions`.
///
/// The batch is truncated at [`MAX_BATCH`] and processed sequentially. A
/// submission counts as affected when its overall status differs before vs.
/// after; the first [`SAMPLE_LIMIT`] affected submissions are reported in
/// batch order. Question-level counters track every submission whose answer
/// to that question changed, whether or not the submission's overall status
/// moved. An empty batch yields a zeroed report.
pub fn analyze_impact(
    candidate: &Rule,
    original: Option<&Rule>,
    submissions: &[Submission],
    questions: &AuditQuestionCatalog,
) -> RuleImpactAnalysis {
    let mut report = RuleImpactAnalysis::default();
    let mut question_counts: Vec<(String, String, u32)> = questions
        .all()
        .map(|q| (q.id.clone(), q.text.clone(), 0))
        .collect();

    for submission in submissions.iter().take(MAX_BATCH) {
        let root = match serde_json::to_value(submission) {
            Ok(root) => root,
            Err(e) => {
                tracing::warn!(
                    submission_id = %submission.submission_id,
                    error = %e,
                    "skipping unserializable submission in impact analysis"
                );
                continue;
            }
        };

        let before_checks = original.map_or_else(Vec::new, |rule| rule_checks(rule, &root));
        let after_checks = rule_checks(candidate, &root);

        let before =
            generate_audit_compliance_status(&submission.submission_id, &before_checks, questions);
        let after =
            generate_audit_compliance_status(&submission.submission_id, &after_checks, questions);

        report.before_status_counts.record(before.overall_status);
        report.after_status_counts.record(after.overall_status);

        if before.overall_status != after.overall_status {
            report.affected_submissions += 1;
            if report.sample_affected.len() < SAMPLE_LIMIT {
                report.sample_affected.push(AffectedSubmission {
                    submission_id: submission.submission_id.clone(),
                    insured_name: submission.insured_name().to_owned(),
                    before: before.overall_status,
                    after: after.overall_status,
                });
            }
        }

        tally_question_changes(&before, &after, &mut question_counts);
    }

    report.audit_question_impact = question_counts
        .into_iter()
        .filter(|(_, _, count)| *count > 0)
        .map(|(question_id, question_text, affected_count)| AuditQuestionImpact {
            question_id,
            question_text,
            affected_count,
        })
        .collect();

    report
}

/// The check set one rule produces for a submission: zero or one checks.
/// An unevaluable rule contributes nothing here; the simulation compares
/// what the rules would actually report.
fn rule_checks(rule: &Rule, root: &Value) -> Vec<ComplianceCheck> {
    match local::check_for_rule(rule, root) {
        Ok(check) => check.into_iter().collect(),
        Err(e) => {
            tracing::warn!(rule_id = %rule.id, error = %e, "rule skipped in impact analysis");
            Vec::new()
        }
    }
}

fn tally_question_changes(
    before: &AuditComplianceStatus,
    after: &AuditComplianceStatus,
    counts: &mut [(String, String, u32)],
) {
    for (question_id, _, count) in counts.iter_mut() {
        let before_status = before.question_result(question_id).map(|q| q.status);
        let after_status = after.question_result(question_id).map(|q| q.status);
        if before_status != after_status {
            *count += 1;
        }
    }
}

//! # Compliance Aggregator
//!
//! Rolls raw compliance checks up the audit hierarchy: checks answer
//! questions, questions roll into lifecycle stages, stages roll into one
//! submission-level status. Pure functions over the question catalog; the
//! caller decides where the checks came from.

use chrono::Utc;
use sca_catalog::AuditQuestionCatalog;
use sca_core::{
    AuditComplianceStatus, AuditQuestionResult, CheckStatus, ComplianceCheck, ComplianceStatus,
    StageComplianceResult,
};

/// Findings text for a question no check applied to.
pub const NOT_EVALUATED_FINDINGS: &str = "No compliance checks performed for this audit question";
/// Findings text for a question whose checks all passed.
const ALL_PASSED_FINDINGS: &str = "All compliance checks passed";

/// Derive one audit question's status from a submission's check set.
///
/// Checks match a question through its relevant rule categories. Every
/// matching check id lands in `triggered_rules`, but only `at-risk` and
/// `non-compliant` checks escalate the status — an `error` or
/// `not-evaluated` check is evidence that something ran, not that the
/// question failed. Findings join the failing checks' findings with `; `.
pub fn determine_question_status(
    question_id: &str,
    checks: &[ComplianceCheck],
    catalog: &AuditQuestionCatalog,
) -> AuditQuestionResult {
    let updated_at = Utc::now();
    let Some(question) = catalog.get(question_id) else {
        return AuditQuestionResult {
            question_id: question_id.to_owned(),
            status: ComplianceStatus::NotEvaluated,
            triggered_rules: Vec::new(),
            findings: "Audit question not defined".to_owned(),
            updated_at,
        };
    };

    let related: Vec<&ComplianceCheck> = checks
        .iter()
        .filter(|c| question.relevant_rule_categories.contains(&c.category))
        .collect();

    if related.is_empty() {
        return AuditQuestionResult {
            question_id: question_id.to_owned(),
            status: ComplianceStatus::NotEvaluated,
            triggered_rules: Vec::new(),
            findings: NOT_EVALUATED_FINDINGS.to_owned(),
            updated_at,
        };
    }

    let mut status = ComplianceStatus::Compliant;
    let mut failed: Vec<&ComplianceCheck> = Vec::new();
    let mut triggered_rules = Vec::new();

    for check in related {
        triggered_rules.push(check.check_id.clone());
        match check.status {
            CheckStatus::NonCompliant => {
                status = ComplianceStatus::NonCompliant;
                failed.push(check);
            }
            CheckStatus::AtRisk => {
                status = status.worst(ComplianceStatus::AtRisk);
                failed.push(check);
            }
            CheckStatus::Compliant | CheckStatus::NotEvaluated | CheckStatus::Error => {}
        }
    }

    let findings = if failed.is_empty() {
        ALL_PASSED_FINDINGS.to_owned()
    } else {
        failed
            .iter()
            .map(|c| c.findings.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    };

    AuditQuestionResult {
        question_id: question_id.to_owned(),
        status,
        triggered_rules,
        findings,
        updated_at,
    }
}

/// Stage status from its question results.
///
/// Worst-status precedence, with one refinement: a stage that is partially
/// evaluated (some questions answered compliant, others not evaluated at
/// all) is `at-risk`, not `compliant` — unanswered audit questions are a
/// finding in themselves.
pub fn roll_up_stage(results: &[AuditQuestionResult]) -> ComplianceStatus {
    if results
        .iter()
        .any(|r| r.status == ComplianceStatus::NonCompliant)
    {
        return ComplianceStatus::NonCompliant;
    }
    if results.iter().any(|r| r.status == ComplianceStatus::AtRisk) {
        return ComplianceStatus::AtRisk;
    }
    if results
        .iter()
        .any(|r| r.status == ComplianceStatus::NotEvaluated)
    {
        return if results.iter().any(|r| r.status == ComplianceStatus::Compliant) {
            ComplianceStatus::AtRisk
        } else {
            ComplianceStatus::NotEvaluated
        };
    }
    ComplianceStatus::Compliant
}

/// Submission status: the worst of its stage statuses.
pub fn roll_up_submission(stages: &[StageComplianceResult]) -> ComplianceStatus {
    stages
        .iter()
        .map(|s| s.overall_status)
        .fold(ComplianceStatus::Compliant, ComplianceStatus::worst)
}

/// Full audit roll-up of one submission's check set, across every stage in
/// the question catalog.
pub fn generate_audit_compliance_status(
    submission_id: &str,
    checks: &[ComplianceCheck],
    catalog: &AuditQuestionCatalog,
) -> AuditComplianceStatus {
    let stage_results: Vec<StageComplianceResult> = catalog
        .stages()
        .iter()
        .map(|stage| {
            let question_results: Vec<AuditQuestionResult> = stage
                .audit_questions
                .iter()
                .map(|q| determine_question_status(&q.id, checks, catalog))
                .collect();
            let overall_status = roll_up_stage(&question_results);
            StageComplianceResult {
                stage_id: stage.id,
                question_results,
                overall_status,
            }
        })
        .collect();

    let overall_status = roll_up_submission(&stage_results);
    AuditComplianceStatus {
        submission_id: submission_id.to_owned(),
        timestamp: Utc::now(),
        stage_results,
        overall_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sca_core::LifecycleStage;

    fn check(id: &str, category: &str, status: CheckStatus, findings: &str) -> ComplianceCheck {
        ComplianceCheck {
            check_id: id.to_owned(),
            category: category.to_owned(),
            status,
            findings: findings.to_owned(),
            timestamp: Utc::now(),
            data_points: serde_json::Map::new(),
        }
    }

    fn question_result(status: ComplianceStatus) -> AuditQuestionResult {
        AuditQuestionResult {
            question_id: "q".to_owned(),
            status,
            triggered_rules: Vec::new(),
            findings: String::new(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn question_without_matching_checks_is_not_evaluated() {
        let catalog = AuditQuestionCatalog::new();
        let checks = [check("r1", "Loss History", CheckStatus::Compliant, "")];
        let result = determine_question_status("risk-appetite", &checks, &catalog);
        assert_eq!(result.status, ComplianceStatus::NotEvaluated);
        assert_eq!(result.findings, NOT_EVALUATED_FINDINGS);
        assert!(result.triggered_rules.is_empty());
    }

    #[test]
    fn at_risk_check_escalates_and_contributes_findings() {
        let catalog = AuditQuestionCatalog::new();
        let checks = [
            check(
                "risk_appetite_001",
                "Risk Appetite",
                CheckStatus::AtRisk,
                "Industry is in restricted list",
            ),
            check("r2", "Risk Appetite", CheckStatus::Compliant, "ok"),
        ];
        let result = determine_question_status("risk-appetite", &checks, &catalog);
        assert_eq!(result.status, ComplianceStatus::AtRisk);
        assert_eq!(result.findings, "Industry is in restricted list");
        assert_eq!(result.triggered_rules, vec!["risk_appetite_001", "r2"]);
    }

    #[test]
    fn failing_findings_join_with_semicolons() {
        let catalog = AuditQuestionCatalog::new();
        let checks = [
            check("r1", "Risk Appetite", CheckStatus::NonCompliant, "first"),
            check("r2", "Risk Appetite", CheckStatus::AtRisk, "second"),
        ];
        let result = determine_question_status("risk-appetite", &checks, &catalog);
        assert_eq!(result.status, ComplianceStatus::NonCompliant);
        assert_eq!(result.findings, "first; second");
    }

    #[test]
    fn all_passing_checks_report_the_standard_findings() {
        let catalog = AuditQuestionCatalog::new();
        let checks = [check("r1", "Risk Appetite", CheckStatus::Compliant, "ok")];
        let result = determine_question_status("risk-appetite", &checks, &catalog);
        assert_eq!(result.status, ComplianceStatus::Compliant);
        assert_eq!(result.findings, "All compliance checks passed");
        assert_eq!(result.triggered_rules, vec!["r1"]);
    }

    #[test]
    fn error_check_matches_but_never_escalates() {
        let catalog = AuditQuestionCatalog::new();
        let checks = [
            check("r1", "Risk Appetite", CheckStatus::Error, "broken"),
            check("r2", "Risk Appetite", CheckStatus::Compliant, "ok"),
        ];
        let result = determine_question_status("risk-appetite", &checks, &catalog);
        assert_eq!(result.status, ComplianceStatus::Compliant);
        assert_eq!(result.triggered_rules, vec!["r1", "r2"]);
    }

    #[test]
    fn unknown_question_is_not_evaluated() {
        let catalog = AuditQuestionCatalog::new();
        let result = determine_question_status("nonexistent", &[], &catalog);
        assert_eq!(result.status, ComplianceStatus::NotEvaluated);
        assert_eq!(result.findings, "Audit question not defined");
    }

    #[test]
    fn partially_evaluated_stage_is_at_risk() {
        let results = [
            question_result(ComplianceStatus::Compliant),
            question_result(ComplianceStatus::NotEvaluated),
            question_result(ComplianceStatus::Compliant),
        ];
        assert_eq!(roll_up_stage(&results), ComplianceStatus::AtRisk);
    }

    #[test]
    fn fully_unevaluated_stage_stays_not_evaluated() {
        let results = [
            question_result(ComplianceStatus::NotEvaluated),
            question_result(ComplianceStatus::NotEvaluated),
        ];
        assert_eq!(roll_up_stage(&results), ComplianceStatus::NotEvaluated);
    }

    #[test]
    fn non_compliant_dominates_stage_roll_up() {
        let results = [
            question_result(ComplianceStatus::Compliant),
            question_result(ComplianceStatus::NonCompliant),
            question_result(ComplianceStatus::AtRisk),
        ];
        assert_eq!(roll_up_stage(&results), ComplianceStatus::NonCompliant);
    }

    #[test]
    fn full_roll_up_covers_every_catalog_stage() {
        let catalog = AuditQuestionCatalog::new();
        let checks = [check(
            "risk_appetite_001",
            "Risk Appetite",
            CheckStatus::AtRisk,
            "Industry is in restricted list",
        )];
        let status = generate_audit_compliance_status("SUB-001", &checks, &catalog);

        assert_eq!(status.submission_id, "SUB-001");
        assert_eq!(status.stage_results.len(), catalog.stages().len());
        // Stage 1 is partially evaluated (risk-appetite at risk, rest not
        // evaluated) so the stage and the submission are at risk.
        let stage1 = &status.stage_results[0];
        assert_eq!(stage1.stage_id, LifecycleStage::SubmissionRiskAssessment);
        assert_eq!(stage1.overall_status, ComplianceStatus::AtRisk);
        assert_eq!(status.overall_status, ComplianceStatus::AtRisk);

        let question = status.question_result("risk-appetite").unwrap();
        assert_eq!(question.status, ComplianceStatus::AtRisk);
        assert_eq!(question.findings, "Industry is in restricted list");
    }

    #[test]
    fn roll_up_is_stable_across_repeated_calls() {
        let catalog = AuditQuestionCatalog::new();
        let checks = [
            check("r1", "Risk Appetite", CheckStatus::NonCompliant, "x"),
            check("r2", "Loss History", CheckStatus::Compliant, "ok"),
        ];
        let a = generate_audit_compliance_status("SUB-001", &checks, &catalog);
        let b = generate_audit_compliance_status("SUB-001", &checks, &catalog);

        assert_eq!(a.overall_status, b.overall_status);
        for (sa, sb) in a.stage_results.iter().zip(&b.stage_results) {
            assert_eq!(sa.overall_status, sb.overall_status);
            for (qa, qb) in sa.question_results.iter().zip(&sb.question_results) {
                assert_eq!(qa.question_id, qb.question_id);
                assert_eq!(qa.status, qb.status);
                assert_eq!(qa.findings, qb.findings);
                assert_eq!(qa.triggered_rules, qb.triggered_rules);
            }
        }
    }

    proptest! {
        #[test]
        fn stage_roll_up_is_total_and_non_compliant_dominates(
            statuses in proptest::collection::vec(0u8..4, 0..16)
        ) {
            let results: Vec<AuditQuestionResult> = statuses
                .iter()
                .map(|i| question_result(ComplianceStatus::all()[*i as usize]))
                .collect();
            let rolled = roll_up_stage(&results);
            prop_assert!(ComplianceStatus::all().contains(&rolled));
            if results.iter().any(|r| r.status == ComplianceStatus::NonCompliant) {
                prop_assert_eq!(rolled, ComplianceStatus::NonCompliant);
            }
        }

        #[test]
        fn submission_roll_up_is_total_and_non_compliant_dominates(
            statuses in proptest::collection::vec(0u8..4, 0..8)
        ) {
            let stages: Vec<StageComplianceResult> = statuses
                .iter()
                .map(|i| StageComplianceResult {
                    stage_id: LifecycleStage::SubmissionRiskAssessment,
                    question_results: Vec::new(),
                    overall_status: ComplianceStatus::all()[*i as usize],
                })
                .collect();
            let rolled = roll_up_submission(&stages);
            prop_assert!(ComplianceStatus::all().contains(&rolled));
            if stages.iter().any(|s| s.overall_status == ComplianceStatus::NonCompliant) {
                prop_assert_eq!(rolled, ComplianceStatus::NonCompliant);
            }
        }
    }
}

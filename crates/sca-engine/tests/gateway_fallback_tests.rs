//! # Integration Tests for Gateway Fallback and Overlay Policy
//!
//! Exercises the gateway against wiremock servers: a healthy remote engine
//! is preferred, a failing one is recovered through the local engine with
//! no change to the caller-visible shape, and the restricted-industry
//! overlay is applied to whichever engine produced the result.

use std::sync::Arc;

use sca_catalog::{AuditQuestionCatalog, ComplianceCaches, RuleCatalog};
use sca_core::{CheckStatus, ComplianceStatus, SubmissionVerdict};
use sca_engine::{EngineGateway, GatewayConfig, LocalEngine, RESTRICTION_CHECK_ID};
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway() -> EngineGateway {
    EngineGateway::new(
        LocalEngine::new(Arc::new(RuleCatalog::with_default_rules())),
        Arc::new(AuditQuestionCatalog::new()),
        Arc::new(ComplianceCaches::new()),
        GatewayConfig::default(),
    )
    .expect("gateway build")
}

fn submission(code: &str) -> serde_json::Value {
    json!({
        "submissionId": "SUB-001",
        "timestamp": "2026-03-01T12:00:00Z",
        "insured": {
            "name": "Acme Logistics",
            "industry": { "code": code, "description": "Software services" }
        }
    })
}

#[tokio::test]
async fn healthy_remote_is_preferred_over_local() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/evaluate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "submissionId": "SUB-001",
            "timestamp": "2026-03-01T12:00:00Z",
            "overallStatus": "Compliant",
            "checks": [{
                "checkId": "remote_check",
                "category": "Financial Strength",
                "status": "compliant",
                "findings": "Financials reviewed",
                "timestamp": "2026-03-01T12:00:00Z",
                "dataPoints": {}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway();
    gateway
        .configure(true, Some(&Url::parse(&server.uri()).expect("uri")))
        .expect("configure");

    // 5812 would trip the local stock rule; the remote result proves the
    // remote engine answered instead.
    let outcome = gateway
        .evaluate_submission(&submission("5812"))
        .await
        .expect("evaluate");
    assert_eq!(outcome.overall_status, SubmissionVerdict::Compliant);
    assert_eq!(outcome.checks.len(), 1);
    assert_eq!(outcome.checks[0].check_id, "remote_check");
}

#[tokio::test]
async fn failing_remote_falls_back_to_local_transparently() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/evaluate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("engine down"))
        .mount(&server)
        .await;

    let gateway = gateway();
    gateway
        .configure(true, Some(&Url::parse(&server.uri()).expect("uri")))
        .expect("configure");

    // The caller sees a well-formed local outcome, not a transport error.
    let outcome = gateway
        .evaluate_submission(&submission("5812"))
        .await
        .expect("fallback evaluation");
    assert_eq!(outcome.overall_status, SubmissionVerdict::AtRisk);
    assert_eq!(outcome.checks.len(), 1);
    assert_eq!(outcome.checks[0].check_id, "risk_appetite_001");
    assert_eq!(outcome.checks[0].status, CheckStatus::AtRisk);
}

#[tokio::test]
async fn overlay_dominates_a_compliant_remote_verdict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/evaluate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "submissionId": "SUB-001",
            "timestamp": "2026-03-01T12:00:00Z",
            "overallStatus": "Compliant",
            "checks": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway();
    gateway
        .configure(true, Some(&Url::parse(&server.uri()).expect("uri")))
        .expect("configure");

    // 7371 is in the default restricted set; the overlay outranks the
    // remote engine's clean verdict.
    let outcome = gateway
        .evaluate_submission(&submission("7371"))
        .await
        .expect("evaluate");
    assert_eq!(outcome.overall_status, SubmissionVerdict::NonCompliant);
    let overlay = outcome.checks.last().expect("overlay check");
    assert_eq!(overlay.check_id, RESTRICTION_CHECK_ID);
    assert_eq!(overlay.findings, "Industry code 7371 is in the restricted list");
    assert_eq!(overlay.data_points["industryDescription"], json!("Software services"));
}

#[tokio::test]
async fn rule_listing_falls_back_to_local_catalog() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rules"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let gateway = gateway();
    gateway
        .configure(true, Some(&Url::parse(&server.uri()).expect("uri")))
        .expect("configure");

    let rules = gateway.list_rules(None).await.expect("fallback listing");
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id, "risk_appetite_001");
}

#[tokio::test]
async fn remote_audit_roll_up_is_used_when_available() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/audit-compliance/SUB-001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "submissionId": "SUB-001",
            "timestamp": "2026-03-01T12:00:00Z",
            "overallStatus": "non-compliant",
            "stageResults": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway();
    gateway
        .configure(true, Some(&Url::parse(&server.uri()).expect("uri")))
        .expect("configure");

    let status = gateway
        .audit_compliance_status("SUB-001", &submission("1111"))
        .await
        .expect("roll-up");
    assert_eq!(status.overall_status, ComplianceStatus::NonCompliant);
}

#[tokio::test]
async fn missing_audit_endpoint_aggregates_locally() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/audit-compliance/SUB-001"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such route"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/evaluate"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such route"))
        .mount(&server)
        .await;

    let gateway = gateway();
    gateway
        .configure(true, Some(&Url::parse(&server.uri()).expect("uri")))
        .expect("configure");

    let status = gateway
        .audit_compliance_status("SUB-001", &submission("5812"))
        .await
        .expect("local roll-up");
    let question = status.question_result("risk-appetite").expect("question");
    assert_eq!(question.status, ComplianceStatus::AtRisk);
    assert!(question
        .triggered_rules
        .contains(&"risk_appetite_001".to_owned()));
}

#[tokio::test]
async fn gateway_health_reports_remote_liveness() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway();
    gateway
        .configure(true, Some(&Url::parse(&server.uri()).expect("uri")))
        .expect("configure");
    gateway.health().await.expect("healthy");
}

//! # Remote Rule Engine Client
//!
//! HTTP client for an external rule service. Wraps a `reqwest::Client` with
//! a per-request timeout and transport-level retry; protocol failures come
//! back as [`EngineError`] with the endpoint that produced them. The client
//! never falls back on its own — recovery policy belongs to the gateway.

use std::time::Duration;

use sca_core::{
    AuditComplianceStatus, EvaluationResult, Rule, RuleFire, RuleImpactAnalysis,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::EngineError;
use crate::retry::RetryPolicy;

/// Client for the remote rule engine's HTTP contract.
#[derive(Debug, Clone)]
pub struct RemoteEngine {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl RemoteEngine {
    /// Build a client for the service at `base_url` with the stock retry
    /// policy.
    pub fn new(base_url: &Url, timeout_secs: u64) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|source| EngineError::Http {
                endpoint: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the transport retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /evaluate` — evaluate a full submission.
    pub async fn evaluate_submission<T: Serialize>(
        &self,
        submission: &T,
    ) -> Result<EvaluationResult, EngineError> {
        let url = format!("{}/evaluate", self.base_url);
        let body = serde_json::json!({ "submission": submission });
        self.post_json(&url, &body).await
    }

    /// `GET /rules[?category=]` — list rules.
    pub async fn rules(&self, category: Option<&str>) -> Result<Vec<Rule>, EngineError> {
        let url = match category {
            Some(category) => format!("{}/rules?category={category}", self.base_url),
            None => format!("{}/rules", self.base_url),
        };
        self.get_json(&url).await
    }

    /// `GET /rules/{id}` — fetch one rule.
    pub async fn rule(&self, id: &str) -> Result<Rule, EngineError> {
        let url = format!("{}/rules/{id}", self.base_url);
        self.get_json(&url).await
    }

    /// `POST /rules` — create a rule.
    pub async fn create_rule(&self, rule: &Rule) -> Result<Rule, EngineError> {
        let url = format!("{}/rules", self.base_url);
        self.post_json(&url, rule).await
    }

    /// `PUT /rules/{id}` — update a rule.
    pub async fn update_rule(&self, rule: &Rule) -> Result<Rule, EngineError> {
        let url = format!("{}/rules/{}", self.base_url, rule.id);
        let resp = self.retry.send(|| self.client.put(&url).json(rule).send())
            .await
            .map_err(|source| EngineError::Http {
                endpoint: url.clone(),
                source,
            })?;
        decode(resp, &url).await
    }

    /// `DELETE /rules/{id}` — remove a rule. The body says whether the rule
    /// existed.
    pub async fn delete_rule(&self, id: &str) -> Result<bool, EngineError> {
        let url = format!("{}/rules/{id}", self.base_url);
        let resp = self.retry.send(|| self.client.delete(&url).send())
            .await
            .map_err(|source| EngineError::Http {
                endpoint: url.clone(),
                source,
            })?;
        decode(resp, &url).await
    }

    /// `POST /test-rule` — evaluate one rule against arbitrary data.
    /// A JSON `null` body means the condition did not match.
    pub async fn test_rule<T: Serialize>(
        &self,
        rule: &Rule,
        data: &T,
    ) -> Result<Option<RuleFire>, EngineError> {
        let url = format!("{}/test-rule", self.base_url);
        let body = serde_json::json!({ "rule": rule, "data": data });
        self.post_json(&url, &body).await
    }

    /// `GET /rules/audit-question/{id}` — rules mapped to one audit
    /// question. Optional endpoint; a 404 surfaces as an error so the
    /// gateway can filter locally instead.
    pub async fn rules_for_audit_question(
        &self,
        question_id: &str,
    ) -> Result<Vec<Rule>, EngineError> {
        let url = format!("{}/rules/audit-question/{question_id}", self.base_url);
        self.get_json(&url).await
    }

    /// `GET /audit-compliance/{submissionId}` — service-side audit roll-up.
    /// Optional endpoint.
    pub async fn audit_compliance(
        &self,
        submission_id: &str,
    ) -> Result<AuditComplianceStatus, EngineError> {
        let url = format!("{}/audit-compliance/{submission_id}", self.base_url);
        self.get_json(&url).await
    }

    /// `POST /analyze-impact` — service-side impact analysis. Optional
    /// endpoint.
    pub async fn analyze_impact(
        &self,
        rule: &Rule,
        original_rule: Option<&Rule>,
        submission_ids: &[String],
    ) -> Result<RuleImpactAnalysis, EngineError> {
        let url = format!("{}/analyze-impact", self.base_url);
        let body = serde_json::json!({
            "rule": rule,
            "originalRule": original_rule,
            "submissionIds": submission_ids,
        });
        self.post_json(&url, &body).await
    }

    /// `GET /health` — liveness probe.
    pub async fn health(&self) -> Result<(), EngineError> {
        let url = format!("{}/health", self.base_url);
        let resp = self.retry.send(|| self.client.get(&url).send())
            .await
            .map_err(|source| EngineError::Http {
                endpoint: url.clone(),
                source,
            })?;
        check_status(resp, &url).await.map(|_| ())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, EngineError> {
        let resp = self.retry.send(|| self.client.get(url).send())
            .await
            .map_err(|source| EngineError::Http {
                endpoint: url.to_owned(),
                source,
            })?;
        decode(resp, url).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, EngineError> {
        let resp = self.retry.send(|| self.client.post(url).json(body).send())
            .await
            .map_err(|source| EngineError::Http {
                endpoint: url.to_owned(),
                source,
            })?;
        decode(resp, url).await
    }
}

async fn check_status(
    resp: reqwest::Response,
    endpoint: &str,
) -> Result<reqwest::Response, EngineError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(EngineError::Api {
            endpoint: endpoint.to_owned(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

async fn decode<T: DeserializeOwned>(
    resp: reqwest::Response,
    endpoint: &str,
) -> Result<T, EngineError> {
    let resp = check_status(resp, endpoint).await?;
    resp.json()
        .await
        .map_err(|source| EngineError::Deserialization {
            endpoint: endpoint.to_owned(),
            source,
        })
}

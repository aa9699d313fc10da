//! # TTL Cache Layer
//!
//! Three keyed caches sit in front of the evaluation pipeline: rules by
//! category, rule→question mappings by rule id, and evaluation results by
//! submission id. Expiry is lazy: entries are dropped on the read that finds
//! them stale. Concurrent writers race benignly; last write wins.

use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use sca_core::{AuditComplianceStatus, Rule};

/// Rules and mappings change rarely; ten minutes bounds staleness after an
/// out-of-band rule edit.
const RULE_CACHE_TTL: Duration = Duration::from_secs(600);
/// Evaluation results follow the submission data, which moves faster.
const EVALUATION_CACHE_TTL: Duration = Duration::from_secs(300);

/// Keyed cache with per-entry insertion stamps and a fixed TTL.
#[derive(Debug)]
pub struct TtlCache<K: Eq + Hash, V> {
    entries: DashMap<K, (Instant, V)>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Fresh value for `key`, if any. A stale entry is removed and reported
    /// as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            let (stamp, value) = entry.value();
            if stamp.elapsed() < self.ttl {
                return Some(value.clone());
            }
        } else {
            return None;
        }
        // Guard dropped above; safe to remove the stale entry.
        self.entries.remove(key);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, (Instant::now(), value));
    }

    pub fn remove(&self, key: &K) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Cache key for an uncategorized rule listing.
const ALL_RULES_KEY: &str = "__all__";

/// The cache set shared by the evaluation pipeline.
#[derive(Debug)]
pub struct ComplianceCaches {
    /// Category → rules. The full listing is cached under a reserved key.
    rules: TtlCache<String, Vec<Rule>>,
    /// Rule id → mapped question ids.
    mappings: TtlCache<String, Vec<String>>,
    /// Submission id → evaluation result.
    evaluations: TtlCache<String, AuditComplianceStatus>,
}

impl Default for ComplianceCaches {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplianceCaches {
    pub fn new() -> Self {
        Self::with_ttls(RULE_CACHE_TTL, EVALUATION_CACHE_TTL)
    }

    /// Cache set with explicit TTLs. Tests use this to force expiry.
    pub fn with_ttls(rule_ttl: Duration, evaluation_ttl: Duration) -> Self {
        Self {
            rules: TtlCache::new(rule_ttl),
            mappings: TtlCache::new(rule_ttl),
            evaluations: TtlCache::new(evaluation_ttl),
        }
    }

    pub fn rules(&self, category: Option<&str>) -> Option<Vec<Rule>> {
        self.rules.get(&rule_key(category))
    }

    pub fn store_rules(&self, category: Option<&str>, rules: Vec<Rule>) {
        self.rules.insert(rule_key(category), rules);
    }

    pub fn mapping(&self, rule_id: &str) -> Option<Vec<String>> {
        self.mappings.get(&rule_id.to_owned())
    }

    pub fn store_mapping(&self, rule_id: &str, question_ids: Vec<String>) {
        self.mappings.insert(rule_id.to_owned(), question_ids);
    }

    pub fn evaluation(&self, submission_id: &str) -> Option<AuditComplianceStatus> {
        self.evaluations.get(&submission_id.to_owned())
    }

    pub fn store_evaluation(&self, status: AuditComplianceStatus) {
        self.evaluations.insert(status.submission_id.clone(), status);
    }

    /// Drop cached rules, one category or all. The full listing is always
    /// dropped too, since it spans every category.
    pub fn clear_rules(&self, category: Option<&str>) {
        match category {
            Some(category) => {
                self.rules.remove(&category.to_owned());
                self.rules.remove(&ALL_RULES_KEY.to_owned());
            }
            None => self.rules.clear(),
        }
        tracing::debug!(?category, "rule cache cleared");
    }

    pub fn clear_mappings(&self) {
        self.mappings.clear();
    }

    pub fn clear_evaluations(&self) {
        self.evaluations.clear();
        tracing::debug!("evaluation cache cleared");
    }

    pub fn clear_evaluation(&self, submission_id: &str) {
        self.evaluations.remove(&submission_id.to_owned());
    }

    /// Drop everything. Used when the engine configuration changes.
    pub fn clear_all(&self) {
        self.rules.clear();
        self.mappings.clear();
        self.evaluations.clear();
        tracing::debug!("all compliance caches cleared");
    }
}

fn rule_key(category: Option<&str>) -> String {
    category.unwrap_or(ALL_RULES_KEY).to_owned()
}

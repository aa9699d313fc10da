//! # Rule → Audit Question Mapping
//!
//! Resolves which audit questions a rule (or a finished check) informs.
//! Category mapping is authoritative; for rules whose category matches no
//! question there is a lexical fallback over the rule's name and
//! description. An empty result is a valid outcome, not an error.

use sca_core::{ComplianceCheck, Rule};

use crate::questions::AuditQuestionCatalog;

/// Minimum keyword hits for the lexical fallback to link a question.
const KEYWORD_MATCH_THRESHOLD: usize = 2;

/// Question ids a rule maps to.
///
/// Resolution order: the rule's explicit `audit_question_ids` if present,
/// then the category mapping, then the lexical fallback. The fallback
/// tokenizes each question's text, keeps tokens longer than four characters
/// (measured before punctuation is stripped), and links the question when at
/// least two tokens occur as substrings of the rule's lowercased name and
/// description. Results follow catalog order.
pub fn map_rule_to_questions(rule: &Rule, catalog: &AuditQuestionCatalog) -> Vec<String> {
    if let Some(ids) = &rule.audit_question_ids {
        return ids.clone();
    }

    let category_mapping = catalog.categories_to_questions();
    if let Some(ids) = category_mapping.get(&rule.category) {
        return ids.clone();
    }

    let rule_text = format!(
        "{} {}",
        rule.name.to_lowercase(),
        rule.description.to_lowercase()
    );
    catalog
        .all()
        .filter(|question| {
            let score = question
                .text
                .to_lowercase()
                .split(' ')
                .filter(|word| word.len() > 4)
                .map(|word| {
                    word.chars()
                        .filter(|c| c.is_ascii_alphanumeric())
                        .collect::<String>()
                })
                .filter(|keyword| rule_text.contains(keyword.as_str()))
                .count();
            score >= KEYWORD_MATCH_THRESHOLD
        })
        .map(|question| question.id.clone())
        .collect()
}

/// Question ids a finished check maps to. Category-only: a check no longer
/// carries the name/description text the lexical fallback needs.
pub fn map_check_to_questions(
    check: &ComplianceCheck,
    catalog: &AuditQuestionCatalog,
) -> Vec<String> {
    catalog
        .categories_to_questions()
        .get(&check.category)
        .cloned()
        .unwrap_or_default()
}

//! # Condition Evaluator
//!
//! Pure, synchronous evaluation of one rule condition against a
//! submission's JSON representation. No side effects; safe to call from
//! concurrent tasks without synchronization.
//!
//! Missing data is not an error: an unresolvable field path behaves like an
//! absent value, so `equals`/`in` fail and `notEquals`/`notIn` pass, the
//! strict-comparison semantics the rule authors rely on.

use sca_core::{ConditionOperator, RuleCondition};
use serde_json::Value;

/// Errors that abort evaluation of a single rule.
#[derive(Debug, thiserror::Error)]
pub enum ConditionError {
    /// `equals`/`notEquals` need an operand to compare against.
    #[error("operator {operator:?} on field {field:?} requires an operand")]
    MissingOperand {
        operator: ConditionOperator,
        field: String,
    },

    /// The submission could not be rendered as JSON for path resolution.
    #[error("failed to serialize submission for evaluation: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Walk a dotted path into `root`. A missing or null intermediate
/// short-circuits to `None`.
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut value = root;
    for part in path.split('.') {
        match value.get(part) {
            Some(next) if !next.is_null() => value = next,
            _ => return None,
        }
    }
    Some(value)
}

/// Leaf segment of a dotted path, used as the data-point key.
pub fn leaf_field(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Evaluate one condition against a submission's JSON representation.
///
/// Unknown operators evaluate to `false` rather than erroring, so a rule
/// authored against a newer operator set degrades to "never fires" here.
pub fn evaluate(condition: &RuleCondition, root: &Value) -> Result<bool, ConditionError> {
    let resolved = resolve_path(root, &condition.field);

    match condition.operator {
        ConditionOperator::Equals => {
            let operand = require_operand(condition)?;
            Ok(resolved == Some(operand))
        }
        ConditionOperator::NotEquals => {
            let operand = require_operand(condition)?;
            Ok(resolved != Some(operand))
        }
        ConditionOperator::In => Ok(resolved.is_some_and(|v| condition.values.contains(v))),
        ConditionOperator::NotIn => Ok(resolved.map_or(true, |v| !condition.values.contains(v))),
        ConditionOperator::Unknown => Ok(false),
    }
}

fn require_operand(condition: &RuleCondition) -> Result<&Value, ConditionError> {
    condition
        .values
        .first()
        .ok_or_else(|| ConditionError::MissingOperand {
            operator: condition.operator,
            field: condition.field.clone(),
        })
}

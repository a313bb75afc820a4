//! Filter evaluation against materialized objects

use indexmap::IndexMap;

use super::ast::{CompareOp, Condition, Filter, Literal, LogicOp};
use crate::value::Value;

/// Match an object against a filter tree.
///
/// Conditions and sub-filters combine under the node's logical operator;
/// an empty tree matches nothing.
pub fn matches(object: &IndexMap<String, Value>, filter: &Filter) -> bool {
    if filter.is_empty() {
        return false;
    }
    let conditions = filter
        .conditions
        .iter()
        .map(|condition| condition_matches(object, condition));
    let children = filter.children.iter().map(|child| matches(object, child));
    match filter.op {
        LogicOp::And => conditions.chain(children).all(|matched| matched),
        LogicOp::Or => conditions.chain(children).any(|matched| matched),
    }
}

fn condition_matches(object: &IndexMap<String, Value>, condition: &Condition) -> bool {
    // Missing property fails every comparison
    let Some(actual) = object.get(condition.property.as_str()) else {
        return false;
    };
    match condition.op {
        CompareOp::Eq => literal_eq(actual, &condition.value),
        CompareOp::Ne => !literal_eq(actual, &condition.value),
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            // Ordering is defined only for numeric pairs
            let (Some(lhs), Some(rhs)) = (numeric(actual), literal_numeric(&condition.value))
            else {
                return false;
            };
            match condition.op {
                CompareOp::Lt => lhs < rhs,
                CompareOp::Le => lhs <= rhs,
                CompareOp::Gt => lhs > rhs,
                CompareOp::Ge => lhs >= rhs,
                CompareOp::Eq | CompareOp::Ne => unreachable!(),
            }
        }
    }
}

/// Structural equality with integer-to-float promotion for mixed numeric
/// pairs; a string never equals a number.
fn literal_eq(actual: &Value, literal: &Literal) -> bool {
    match (actual, literal) {
        (Value::Integer(a), Literal::Integer(b)) => a == b,
        (Value::Float(a), Literal::Float(b)) => a == b,
        (Value::Integer(a), Literal::Float(b)) => (*a as f64) == *b,
        (Value::Float(a), Literal::Integer(b)) => *a == (*b as f64),
        (Value::Bool(a), Literal::Bool(b)) => a == b,
        (Value::String(a), Literal::String(b)) => a == b,
        _ => false,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(n) => Some(*n as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn literal_numeric(literal: &Literal) -> Option<f64> {
    match literal {
        Literal::Integer(n) => Some(*n as f64),
        Literal::Float(f) => Some(*f),
        _ => None,
    }
}

//! Clause-based condition evaluator for rule expressions.
//!
//! A condition is a sequence of clauses separated by the literal tokens `&&`
//! or `||`. Each clause has the shape `{attr} OP value`, where the braces are
//! optional, `OP` is a run of `<`, `>`, `=` characters, and the comparison
//! uses version-string ordering (`"10" > "9"`).
//!
//! The separators are not parsed into a tree: if `||` appears anywhere in the
//! string the whole clause list scores any-of, otherwise all-of. A mixed
//! expression like `a>1&&b<2||c>3` therefore scores all three clauses any-of.
//! This matches the behavior systems built on this grammar rely on and is
//! covered by tests below; do not "fix" it.
//!
//! A clause that fails to parse, names a missing attribute, or carries an
//! unknown operator is simply not satisfied; evaluation never errors.

use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Evaluate a condition string against a flat user attribute record.
///
/// The empty-condition case ("satisfied by presence") is the caller's
/// concern; an empty string evaluates to `false` here.
pub fn evaluate(condition: &str, attrs: &Map<String, Value>) -> bool {
    let any_of = condition.contains("||");
    let clauses: Vec<&str> = condition
        .split("&&")
        .flat_map(|part| part.split("||"))
        .collect();

    let satisfied = clauses
        .iter()
        .filter(|clause| clause_holds(clause, attrs))
        .count();

    if any_of {
        satisfied > 0
    } else {
        satisfied == clauses.len()
    }
}

fn clause_holds(clause: &str, attrs: &Map<String, Value>) -> bool {
    // Braces around the attribute name are decorative: `{score}>5` == `score>5`
    let stripped: String = clause.chars().filter(|&c| c != '{' && c != '}').collect();
    let Some((attr, op, expected)) = parse_clause(stripped.trim()) else {
        return false;
    };

    let Some(actual) = attrs.get(attr).and_then(scalar_to_string) else {
        return false;
    };

    op_holds(op, version_compare(&actual, expected)).unwrap_or(false)
}

/// Split a clause into (attribute, operator, value).
///
/// Shape: a `\w+` attribute, at most one whitespace char, a non-empty run of
/// `<`/`>`/`=`, at most one whitespace char, then the value (possibly empty).
fn parse_clause(input: &str) -> Option<(&str, &str, &str)> {
    let attr_len = input
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .count();
    if attr_len == 0 {
        return None;
    }
    let (attr, mut rest) = input.split_at(attr_len);

    if let Some(r) = rest.strip_prefix(|c: char| c.is_whitespace()) {
        rest = r;
    }

    let op_len = rest
        .chars()
        .take_while(|c| matches!(c, '<' | '>' | '='))
        .count();
    if op_len == 0 {
        return None;
    }
    let (op, mut value) = rest.split_at(op_len);

    if let Some(v) = value.strip_prefix(|c: char| c.is_whitespace()) {
        value = v;
    }

    Some((attr, op, value))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

fn op_holds(op: &str, ordering: Ordering) -> Option<bool> {
    let holds = match op {
        "<" => ordering == Ordering::Less,
        "<=" => ordering != Ordering::Greater,
        ">" => ordering == Ordering::Greater,
        ">=" => ordering != Ordering::Less,
        "=" | "==" => ordering == Ordering::Equal,
        "<>" => ordering != Ordering::Equal,
        _ => return None,
    };
    Some(holds)
}

/// Version-string ordering: dot-separated segments compared numerically when
/// both sides parse as integers, lexically otherwise. Trailing segments make
/// a value greater (`"1.0" > "1"`).
pub fn version_compare(left: &str, right: &str) -> Ordering {
    let lhs: Vec<&str> = left.split('.').collect();
    let rhs: Vec<&str> = right.split('.').collect();

    for (l, r) in lhs.iter().zip(rhs.iter()) {
        let ordering = match (l.parse::<i64>(), r.parse::<i64>()) {
            (Ok(ln), Ok(rn)) => ln.cmp(&rn),
            _ => l.cmp(r),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    lhs.len().cmp(&rhs.len())
}

//! Filter expressions accepted by `--where` and `render`.
//!
//! One expression is one predicate on one column, e.g. `age >= 18`,
//! `name i^= al`, `id not in (1, 2)` or `age between 18 and 30`.

use entiql_core::{FieldRef, Predicate, TableId};
use entiql_driver::Value;
use thiserror::Error;

/// A filter expression that could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid filter expression `{expr}`: {reason}")]
pub struct ExprError {
    expr: String,
    reason: String,
}

impl ExprError {
    fn new(expr: &str, reason: impl Into<String>) -> Self {
        Self {
            expr: expr.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    EqIgnoreCase,
    StartsWith,
    EndsWith,
    Contains,
    StartsWithIgnoreCase,
    EndsWithIgnoreCase,
    ContainsIgnoreCase,
}

// Longest first, so `>=` wins over `>`.
const OPERATORS: [(&str, Op); 14] = [
    ("i^=", Op::StartsWithIgnoreCase),
    ("i$=", Op::EndsWithIgnoreCase),
    ("i~=", Op::ContainsIgnoreCase),
    (">=", Op::Ge),
    ("<=", Op::Le),
    ("<>", Op::Ne),
    ("!=", Op::Ne),
    ("^=", Op::StartsWith),
    ("$=", Op::EndsWith),
    ("~=", Op::Contains),
    ("i=", Op::EqIgnoreCase),
    ("=", Op::Eq),
    (">", Op::Gt),
    ("<", Op::Lt),
];

/// Parses `expr` into a predicate on a column of `table`.
///
/// # Errors
///
/// Fails if the expression has no column, no recognized operator or is
/// missing an operand.
pub fn parse(table: &TableId, expr: &str) -> Result<Predicate, ExprError> {
    let text = expr.trim();
    if let Some(rest) = strip_keyword(text, "not") {
        return parse(table, rest).map(|p| p.negate());
    }

    let split = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    let (column, rest) = text.split_at(split);
    if column.is_empty() {
        return Err(ExprError::new(expr, "expected a column name"));
    }
    let field = FieldRef::new(table.clone(), column);
    let rest = rest.trim_start();

    if let Some(tail) = strip_keyword(rest, "is") {
        let (negated, tail) = match strip_keyword(tail, "not") {
            Some(tail) => (true, tail),
            None => (false, tail),
        };
        let predicate = match tail.to_ascii_lowercase().as_str() {
            "null" => field.is_null(),
            "empty" => field.is_empty(),
            _ => return Err(ExprError::new(expr, "expected `null` or `empty` after `is`")),
        };
        return Ok(negate_if(predicate, negated));
    }

    let (negated, tail) = match strip_keyword(rest, "not") {
        Some(tail) => (true, tail),
        None => (false, rest),
    };
    if let Some(list) = strip_keyword(tail, "in") {
        let values = parse_list(expr, list)?;
        return Ok(if negated {
            field.not_in(values)
        } else {
            field.is_in(values)
        });
    }
    if let Some(range) = strip_keyword(tail, "between") {
        let (start, end) = split_and(range)
            .ok_or_else(|| ExprError::new(expr, "expected `between <start> and <end>`"))?;
        let predicate = field.between(parse_value(start), parse_value(end));
        return Ok(negate_if(predicate, negated));
    }
    if negated {
        return Err(ExprError::new(expr, "expected `in` or `between` after `not`"));
    }

    let (symbol, op) = OPERATORS
        .iter()
        .find(|(symbol, _)| rest.starts_with(symbol))
        .ok_or_else(|| ExprError::new(expr, format!("expected an operator after `{column}`")))?;
    let operand = rest[symbol.len()..].trim();
    if operand.is_empty() {
        return Err(ExprError::new(expr, format!("missing value after `{symbol}`")));
    }
    Ok(build(&field, *op, operand))
}

fn build(field: &FieldRef, op: Op, operand: &str) -> Predicate {
    let text = unquote(operand).to_string();
    match op {
        Op::Eq => field.equal(parse_value(operand)),
        Op::Ne => field.not_equal(parse_value(operand)),
        Op::Lt => field.less_than(parse_value(operand)),
        Op::Le => field.less_or_equal(parse_value(operand)),
        Op::Gt => field.greater_than(parse_value(operand)),
        Op::Ge => field.greater_or_equal(parse_value(operand)),
        Op::EqIgnoreCase => field.equal_ignore_case(text),
        Op::StartsWith => field.starts_with(text),
        Op::EndsWith => field.ends_with(text),
        Op::Contains => field.contains(text),
        Op::StartsWithIgnoreCase => field.starts_with_ignore_case(text),
        Op::EndsWithIgnoreCase => field.ends_with_ignore_case(text),
        Op::ContainsIgnoreCase => field.contains_ignore_case(text),
    }
}

/// Parses a literal: `null`, `true`/`false`, an integer, a real, or text.
///
/// Quoted literals are always text.
pub fn parse_value(literal: &str) -> Value {
    let literal = literal.trim();
    if let Some(inner) = quoted(literal) {
        return Value::from(inner);
    }
    if literal.eq_ignore_ascii_case("null") {
        Value::Null
    } else if literal.eq_ignore_ascii_case("true") {
        Value::Bool(true)
    } else if literal.eq_ignore_ascii_case("false") {
        Value::Bool(false)
    } else if let Ok(n) = literal.parse::<i64>() {
        Value::Integer(n)
    } else if let (true, Ok(r)) = (
        literal.chars().any(|c| c.is_ascii_digit()),
        literal.parse::<f64>(),
    ) {
        Value::Real(r)
    } else {
        Value::from(literal)
    }
}

fn negate_if(predicate: Predicate, negated: bool) -> Predicate {
    if negated {
        predicate.negate()
    } else {
        predicate
    }
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let tail = &text[keyword.len()..];
    match tail.chars().next() {
        None => Some(tail),
        Some(c) if c.is_whitespace() || c == '(' => Some(tail.trim_start()),
        Some(_) => None,
    }
}

fn split_and(range: &str) -> Option<(&str, &str)> {
    let at = range.to_ascii_lowercase().find(" and ")?;
    Some((range[..at].trim(), range[at + 5..].trim()))
}

fn parse_list(expr: &str, list: &str) -> Result<Vec<Value>, ExprError> {
    let list = list.trim();
    let inner = list
        .strip_prefix('(')
        .and_then(|l| l.strip_suffix(')'))
        .unwrap_or(list);
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut values = Vec::new();
    let mut start = 0;
    let mut quote = None;
    for (i, c) in inner.char_indices() {
        match (quote, c) {
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, ',') => {
                values.push(parse_value(&inner[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err(ExprError::new(expr, "unterminated quote in list"));
    }
    values.push(parse_value(&inner[start..]));
    Ok(values)
}

fn quoted(literal: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|q| {
        if literal.len() >= 2 && literal.starts_with(q) && literal.ends_with(q) {
            Some(&literal[1..literal.len() - 1])
        } else {
            None
        }
    })
}

fn unquote(literal: &str) -> &str {
    quoted(literal).unwrap_or(literal)
}

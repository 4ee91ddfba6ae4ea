//! Rule expression evaluator.
//!
//! A rule is a short arithmetic template such as `field1+refdata2` or
//! `max(field1, refdata1)`. Evaluation is textual and happens in three passes:
//!
//! 1. **Substitution** - every known variable token is replaced by its row
//!    value (`"0"` when the column is missing). Replacement ignores word
//!    boundaries, so `field1` also matches inside `field10`.
//! 2. **Function expansion** - each `max(a, b)` span, up to the first `)`
//!    after it, is replaced by the larger argument. Calls do not nest.
//! 3. **Arithmetic** - a single binary operator is applied. Operators are
//!    checked in the order `+ - * /`; the first one present splits the text
//!    and the first two pieces are the operands. Without an operator the
//!    whole text must be one number.
//!
//! ```text
//! "max(field1, refdata1)+field2"
//!    │ substitute (field1=10, refdata1=2, field2=3)
//!    ▼
//! "max(10, 2)+3"  ──expand──▶  "10.0+3"  ──apply──▶  13.0
//! ```
//!
//! Any failure yields [`FieldValue::Error`] and an error log; nothing here
//! panics or aborts a row.

use tracing::error;

use crate::error::{ExpressionError, ExpressionResult};
use crate::models::{FieldValue, Row};

/// Variables resolved against the feed row, in substitution order.
pub const FEED_VARIABLES: [&str; 4] = ["field1", "field2", "field3", "field5"];

/// Variables resolved against the reference row, in substitution order.
pub const REFERENCE_VARIABLES: [&str; 4] = ["refdata1", "refdata2", "refdata3", "refdata4"];

const MAX_CALL: &str = "max(";

/// Binary operators, in the order they are looked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const PRIORITY: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            Operator::Divide => left / right,
        }
    }
}

/// Evaluate `expression` for one feed/reference row pair.
pub fn evaluate(expression: &str, feed: &Row, reference: &Row) -> FieldValue {
    let substituted = substitute_variables(expression, feed, reference);
    match reduce(&substituted) {
        Ok(value) => FieldValue::Number(value),
        Err(err) => {
            error!(
                expression,
                substituted = %substituted,
                error = %err,
                "Error evaluating expression"
            );
            FieldValue::Error
        }
    }
}

/// Like [`evaluate`], but returns the failure cause instead of logging it.
pub fn try_evaluate(expression: &str, feed: &Row, reference: &Row) -> ExpressionResult<f64> {
    reduce(&substitute_variables(expression, feed, reference))
}

/// Replace every known variable token with its row value.
pub fn substitute_variables(expression: &str, feed: &Row, reference: &Row) -> String {
    let mut text = expression.to_string();
    for name in FEED_VARIABLES {
        text = text.replace(name, feed.get_or_default(name));
    }
    for name in REFERENCE_VARIABLES {
        text = text.replace(name, reference.get_or_default(name));
    }
    text
}

fn reduce(substituted: &str) -> ExpressionResult<f64> {
    let flattened = expand_max_calls(substituted)?;
    let value = evaluate_simple(&flattened)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExpressionError::NonFinite(format_number(value)))
    }
}

/// Replace each `max(a, b)` span with the larger of its two arguments.
pub fn expand_max_calls(text: &str) -> ExpressionResult<String> {
    let mut text = text.to_string();

    while let Some(start) = text.find(MAX_CALL) {
        let end = text[start..]
            .find(')')
            .map(|offset| start + offset)
            .ok_or(ExpressionError::UnclosedFunction)?;

        let args = &text[start + MAX_CALL.len()..end];
        let mut parts = args.split(',');
        let (first, second) = match (parts.next(), parts.next()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(ExpressionError::BadArguments(args.to_string())),
        };

        let larger = larger_of(parse_number(first)?, parse_number(second)?);
        text.replace_range(start..=end, &format_number(larger));
    }

    Ok(text)
}

/// Apply the first operator found, or read the text as a single number.
pub fn evaluate_simple(text: &str) -> ExpressionResult<f64> {
    for op in Operator::PRIORITY {
        if !text.contains(op.symbol()) {
            continue;
        }

        let mut operands = text.split(op.symbol());
        let left = operands.next().unwrap_or_default();
        let right = operands
            .next()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ExpressionError::MissingOperand(op.symbol()))?;

        return Ok(op.apply(parse_number(left)?, parse_number(right)?));
    }

    parse_number(text)
}

fn parse_number(text: &str) -> ExpressionResult<f64> {
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| ExpressionError::NotANumber(trimmed.to_string()))
}

// NaN wins, like the usual floating-point max.
fn larger_of(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else if a >= b {
        a
    } else {
        b
    }
}

/// Render a number the way report cells show it.
///
/// Shortest round-trip digits with at least one fractional digit (`13.0`,
/// `5.5`). Magnitudes outside `[1e-3, 1e7)` use `E` notation (`1.0E7`,
/// `2.5E-4`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = value.abs();
    if value == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let text = value.to_string();
        if text.contains('.') {
            text
        } else {
            format!("{text}.0")
        }
    } else {
        let text = format!("{value:E}");
        match text.split_once('E') {
            Some((mantissa, exponent)) if !mantissa.contains('.') => {
                format!("{mantissa}.0E{exponent}")
            }
            _ => text,
        }
    }
}

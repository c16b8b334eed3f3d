//! Expression lowering: `sqlparser::ast::Expr` -> predicates/comparators over
//! [`Row`], and SQL literal -> [`Value`] conversion.
//!
//! Grounded in the source's recursive `compile_bin_op`/`compile_expr_value`
//! walk over the same AST shapes, simplified to the engine's flat,
//! schemaless rows: there is no column catalog to resolve a name against, so
//! a comparison's type mode is picked from the *row's own* runtime value
//! rather than a declared column type.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use sqlparser::ast::{BinaryOperator, Expr, OrderByExpr, UnaryOperator, Value as SqlValue};

use minisql_core::duration::parse_iso8601_duration;
use minisql_core::types::{Row, Value};

use crate::error::EngineError;
use crate::table::{Comparator, Predicate};

/// `TTL` is recognized case-insensitively and is never a real field.
const TTL_COLUMN: &str = "ttl";

fn is_ttl_column(name: &str) -> bool {
    name.eq_ignore_ascii_case(TTL_COLUMN)
}

fn lower_sql_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Number(text, _) => text.parse::<f64>().map_or(Value::Null, Value::Float),
        SqlValue::SingleQuotedString(text) | SqlValue::DoubleQuotedString(text) => Value::String(text.clone()),
        SqlValue::Boolean(b) => Value::Bool(*b),
        SqlValue::Null => Value::Null,
        _ => Value::Null,
    }
}

/// Lowers a SQL literal expression (column default / `VALUES` cell / `WHERE`
/// comparand) to a [`Value`], handling the one level of `Nested`/unary-minus
/// wrapping a literal commonly carries.
pub fn lower_literal(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Value(v) => Some(lower_sql_value(v)),
        Expr::Nested(inner) => lower_literal(inner),
        Expr::UnaryOp { op: UnaryOperator::Minus, expr } => match lower_literal(expr) {
            Some(Value::Float(f)) => Some(Value::Float(-f)),
            other => other,
        },
        _ => None,
    }
}

fn field_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.clone()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|ident| ident.value.clone()),
        Expr::Nested(inner) => field_name(inner),
        _ => None,
    }
}

fn flip(op: &BinaryOperator) -> BinaryOperator {
    match op {
        BinaryOperator::Gt => BinaryOperator::Lt,
        BinaryOperator::Lt => BinaryOperator::Gt,
        BinaryOperator::GtEq => BinaryOperator::LtEq,
        BinaryOperator::LtEq => BinaryOperator::GtEq,
        other => other.clone(),
    }
}

/// Compares two runtime values according to the operator, classifying the
/// comparison mode (numeric / boolean / lexicographic string) from the
/// values actually present rather than a declared schema.
fn compare(op: &BinaryOperator, lhs: &Value, rhs: &Value) -> bool {
    if let (Some(l), Some(r)) = (lhs.as_f64(), rhs.as_f64()) {
        return match op {
            BinaryOperator::Gt => l > r,
            BinaryOperator::Lt => l < r,
            BinaryOperator::GtEq => l >= r,
            BinaryOperator::LtEq => l <= r,
            BinaryOperator::Eq => (l - r).abs() < f64::EPSILON,
            BinaryOperator::NotEq => (l - r).abs() >= f64::EPSILON,
            _ => false,
        };
    }
    if let (Some(l), Some(r)) = (lhs.as_bool(), rhs.as_bool()) {
        return match op {
            BinaryOperator::Eq => l == r,
            BinaryOperator::NotEq => l != r,
            // Ordering a boolean is meaningless; the source panics on this
            // case ("unhandled default case"), but a predicate can't surface
            // a mid-evaluation error here, so it's silently false instead of
            // a hard failure.
            _ => false,
        };
    }
    let (l, r) = (lhs.to_text(), rhs.to_text());
    match op {
        BinaryOperator::Gt => l > r,
        BinaryOperator::Lt => l < r,
        BinaryOperator::GtEq => l >= r,
        BinaryOperator::LtEq => l <= r,
        BinaryOperator::Eq => l == r,
        BinaryOperator::NotEq => l != r,
        _ => false,
    }
}

fn is_comparison(op: &BinaryOperator) -> bool {
    matches!(
        op,
        BinaryOperator::Gt | BinaryOperator::Lt | BinaryOperator::GtEq | BinaryOperator::LtEq | BinaryOperator::Eq | BinaryOperator::NotEq
    )
}

/// Lowers a `WHERE`-clause expression into a boxed predicate over a [`Row`].
/// `AND`/`OR` recurse structurally; a comparison must have exactly one
/// column-reference side and one literal side, in either order.
pub fn lower_predicate(expr: &Expr) -> Result<Predicate, EngineError> {
    match expr {
        Expr::BinaryOp { left, op: BinaryOperator::And, right } => {
            let left = lower_predicate(left)?;
            let right = lower_predicate(right)?;
            Ok(Arc::new(move |row: &Row| left(row) && right(row)))
        }
        Expr::BinaryOp { left, op: BinaryOperator::Or, right } => {
            let left = lower_predicate(left)?;
            let right = lower_predicate(right)?;
            Ok(Arc::new(move |row: &Row| left(row) || right(row)))
        }
        Expr::BinaryOp { left, op, right } if is_comparison(op) => {
            let (field, literal, op) = match (field_name(left), lower_literal(right)) {
                (Some(field), Some(literal)) => (field, literal, op.clone()),
                _ => match (lower_literal(left), field_name(right)) {
                    (Some(literal), Some(field)) => (field, literal, flip(op)),
                    _ => {
                        return Err(EngineError::lowering(
                            "comparisons must have one column and one literal operand",
                        ))
                    }
                },
            };
            Ok(Arc::new(move |row: &Row| row.get(&field).is_some_and(|value| compare(&op, value, &literal))))
        }
        Expr::Nested(inner) => lower_predicate(inner),
        other => Err(EngineError::lowering(format!("unsupported WHERE expression: {other}"))),
    }
}

fn ordering_of(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            if let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) {
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            } else {
                a.to_text().cmp(&b.to_text())
            }
        }
    }
}

/// Lowers an `ORDER BY` clause. Only a single sort column is supported; the
/// engine has no notion of a multi-key tuple comparator.
pub fn lower_order_by(order_by: &[OrderByExpr]) -> Result<Option<Comparator>, EngineError> {
    if order_by.is_empty() {
        return Ok(None);
    }
    if order_by.len() > 1 {
        return Err(EngineError::unsupported("ORDER BY supports only a single column"));
    }
    let clause = &order_by[0];
    let field = field_name(&clause.expr).ok_or_else(|| EngineError::lowering("ORDER BY target must be a column"))?;
    let descending = clause.asc == Some(false);

    Ok(Some(Arc::new(move |a: &Row, b: &Row| {
        let ordering = ordering_of(a.get(&field), b.get(&field));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    })))
}

/// Lowers a `LIMIT`/`OFFSET` literal to a `u64`.
pub fn literal_as_u64(expr: &Expr) -> Result<u64, EngineError> {
    match lower_literal(expr) {
        Some(Value::Float(f)) if f >= 0.0 => Ok(f as u64),
        _ => Err(EngineError::lowering(format!("expected a non-negative integer literal, got {expr}"))),
    }
}

/// Splits `ttl` out of an insert's column/value lists (case-insensitively),
/// returning the remaining field assignments and the parsed TTL, if any.
///
/// A malformed TTL literal is absorbed as "no TTL" rather than surfaced as an
/// error: callers cannot distinguish "TTL omitted" from "TTL malformed" here,
/// a known, preserved looseness rather than a bug to silently fix.
pub fn extract_ttl(row: &mut Row) -> Option<Duration> {
    let key = row.keys().find(|k| is_ttl_column(k)).cloned()?;
    let value = row.remove(&key).expect("key was just found in the map");
    match value {
        Value::String(text) => parse_iso8601_duration(&text).ok(),
        _ => None,
    }
}

//! The runtime values of the language.
//!
//! Programs are values too: the reader produces a tree of [`Value`]s and the evaluator walks it.

use im::{OrdMap, Vector};

use crate::future::Future;

use super::function::Callable;

pub mod number;

pub use number::{Number, QuoRemError};

/// Where a symbol was read from, used only for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display(fmt = "<{},{};{}>", row, column, offset)]
pub struct Position {
    /// 1-based line
    pub row: usize,
    /// 1-based character column
    pub column: usize,
    /// 0-based byte offset
    pub offset: usize,
}

#[derive(Clone)]
pub struct Symbol {
    pub name: String,
    pub position: Option<Position>,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            position: None,
        }
    }

    pub fn at(name: impl Into<String>, position: Position) -> Self {
        Symbol {
            name: name.into(),
            position: Some(position),
        }
    }
}

/// Symbols are the same name wherever they were read
impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Clone, Default)]
/// Every value the language can read, compute or defer
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(Number),
    String(String),
    Symbol(Symbol),
    /// Sequence whose elements are all evaluated
    Array(Vector<Value>),
    Map(OrdMap<String, Value>),
    /// Program form: `(head args..)`
    Expr(Vector<Value>),
    /// Infix operator token, only meaningful while a tree is being built
    Operator(String),
    Func(Callable),
    Future(Future),
}

impl Value {
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(Symbol::new(name))
    }

    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    pub fn number(n: impl Into<Number>) -> Self {
        Value::Number(n.into())
    }

    pub fn expr(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Expr(items.into_iter().collect())
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(items.into_iter().collect())
    }

    /// `false` and `null` are the only falsy values
    pub fn is_falsy(&self) -> bool {
        matches!(self, Value::Null | Value::Boolean(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Expr(_) => "expr",
            Value::Operator(_) => "operator",
            Value::Func(_) => "function",
            Value::Future(_) => "future",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

fn seq_eq(left: &Vector<Value>, right: &Vector<Value>) -> bool {
    left.len() == right.len() && left.iter().zip(right.iter()).all(|(l, r)| l == r)
}

/// Structural equality.
///
/// Values of different variants are never equal, and a future is not even equal to itself.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(l), Value::Boolean(r)) => l == r,
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::String(l), Value::String(r)) => l == r,
            (Value::Symbol(l), Value::Symbol(r)) => l == r,
            (Value::Array(l), Value::Array(r)) | (Value::Expr(l), Value::Expr(r)) => seq_eq(l, r),
            (Value::Map(l), Value::Map(r)) => {
                l.len() == r.len()
                    && l.iter()
                        .all(|(key, item)| r.get(key).map_or(false, |other| item == other))
            }
            (Value::Operator(l), Value::Operator(r)) => l == r,
            (Value::Func(l), Value::Func(r)) => l.ptr_eq(r),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn samples() -> Vec<Value> {
        vec![
            Value::Null,
            Value::from(true),
            Value::from(1),
            Value::string("1"),
            Value::symbol("one"),
            Value::array([Value::from(1)]),
            Value::Map(OrdMap::unit("one".to_owned(), Value::from(1))),
            Value::expr([Value::from(1)]),
            Value::Operator("+".to_owned()),
            Value::Func(Callable::new("one", |_, _| Ok(Value::from(1)))),
        ]
    }

    #[test]
    fn equality_is_reflexive() {
        for value in samples() {
            assert!(value == value.clone(), "{value:?} should equal itself");
        }
    }

    #[test]
    fn different_variants_are_never_equal() {
        let values = samples();
        for (i, left) in values.iter().enumerate() {
            for (j, right) in values.iter().enumerate() {
                assert_eq!(left == right, i == j, "{left:?} vs {right:?}");
                assert_eq!(left == right, right == left);
            }
        }
    }

    #[test]
    fn futures_are_not_comparable() {
        let future = Value::Future(Future::ready(Ok(Value::Null)));
        assert!(future != future.clone());
        assert!(Value::array([future.clone()]) != Value::array([future]));
    }

    #[test]
    fn symbol_positions_are_ignored() {
        let here = Position {
            row: 1,
            column: 2,
            offset: 1,
        };
        assert!(Value::Symbol(Symbol::at("x", here)) == Value::symbol("x"));
    }

    #[test]
    fn map_equality_is_key_based() {
        let left: OrdMap<String, Value> = [("a".to_owned(), Value::from(1)), ("b".to_owned(), Value::from(2))]
            .into_iter()
            .collect();
        let right: OrdMap<String, Value> = [("b".to_owned(), Value::from(2)), ("a".to_owned(), Value::from(1))]
            .into_iter()
            .collect();
        assert!(Value::Map(left.clone()) == Value::Map(right));
        assert!(Value::Map(left) != Value::Map(OrdMap::unit("a".to_owned(), Value::from(1))));
    }

    #[test_case(Value::array([Value::from(1), Value::from(2)]), Value::array([Value::from(2), Value::from(1)]) ; "array order matters")]
    #[test_case(Value::expr([Value::from(1)]), Value::array([Value::from(1)]) ; "expr is not array")]
    #[test_case(Value::string("null"), Value::Null ; "string is not null")]
    #[test_case(Value::from(0), Value::from(false) ; "zero is not false")]
    fn unequal(left: Value, right: Value) {
        assert!(left != right);
    }

    #[test_case(Value::number(2i64), "number" ; "number")]
    #[test_case(Value::expr([]), "expr" ; "expr")]
    #[test_case(Value::Map(OrdMap::new()), "map" ; "map")]
    fn names_its_type(value: Value, expected: &str) {
        assert_eq!(value.type_name(), expected);
    }

    #[test_case(Value::Null, true)]
    #[test_case(Value::from(false), true)]
    #[test_case(Value::from(0), false)]
    #[test_case(Value::string(""), false)]
    fn falsy(value: Value, expected: bool) {
        assert_eq!(value.is_falsy(), expected);
    }
}

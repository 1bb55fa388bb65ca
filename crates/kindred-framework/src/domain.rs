//! Search domains.
//!
//! A [`Domain`] is a conjunction of [`Predicate`]s. A predicate's path is a
//! field name, optionally followed by `.field` segments that traverse
//! reference fields (`typed_ref.test`). The store resolves paths and rewrites
//! predicates on mirrored fields before evaluating them.

use crate::error::FrameworkError;
use crate::value::Value;
use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Case-sensitive substring match on text.
    Like,
    /// Case-insensitive substring match on text.
    ILike,
    /// Right-hand side is a list, given as `Value`s in [`Predicate::values`].
    In,
    NotIn,
}

impl FromStr for Operator {
    type Err = FrameworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "=" | "==" => Operator::Eq,
            "!=" | "<>" => Operator::Ne,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "like" => Operator::Like,
            "ilike" => Operator::ILike,
            "in" => Operator::In,
            "not in" => Operator::NotIn,
            other => return Err(FrameworkError::UnknownOperator(other.to_string())),
        })
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Like => "like",
            Operator::ILike => "ilike",
            Operator::In => "in",
            Operator::NotIn => "not in",
        };
        f.write_str(s)
    }
}

/// `(path, operator, value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub path: String,
    pub operator: Operator,
    /// One value for scalar operators, any number for `in`/`not in`.
    pub values: Vec<Value>,
}

impl Predicate {
    pub fn new(path: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            operator,
            values: vec![value.into()],
        }
    }

    /// Parses the operator from its textual form.
    pub fn parse(path: impl Into<String>, operator: &str, value: impl Into<Value>) -> Result<Self, FrameworkError> {
        Ok(Self::new(path, operator.parse()?, value))
    }

    pub fn one_of(path: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            path: path.into(),
            operator: Operator::In,
            values,
        }
    }

    pub fn none_of(path: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            path: path.into(),
            operator: Operator::NotIn,
            values,
        }
    }

    /// First segment of the path and the rest, if any.
    pub fn split_path(&self) -> (&str, Option<&str>) {
        match self.path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (&self.path, None),
        }
    }

    /// Whether `actual` satisfies this predicate.
    pub fn matches(&self, actual: &Value) -> bool {
        static EMPTY: Value = Value::Empty;
        let expected = self.values.first().unwrap_or(&EMPTY);
        match self.operator {
            Operator::Eq => actual == expected,
            Operator::Ne => actual != expected,
            Operator::Lt => actual.compare(expected) == Some(Ordering::Less),
            Operator::Le => matches!(actual.compare(expected), Some(Ordering::Less | Ordering::Equal)),
            Operator::Gt => actual.compare(expected) == Some(Ordering::Greater),
            Operator::Ge => matches!(
                actual.compare(expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Like => match (actual.as_text(), expected.as_text()) {
                (Some(a), Some(e)) => a.contains(e),
                _ => false,
            },
            Operator::ILike => match (actual.as_text(), expected.as_text()) {
                (Some(a), Some(e)) => a.to_lowercase().contains(&e.to_lowercase()),
                _ => false,
            },
            Operator::In => self.values.contains(actual),
            Operator::NotIn => !self.values.contains(actual),
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, ", self.path, self.operator)?;
        match self.values.as_slice() {
            [single] if !matches!(self.operator, Operator::In | Operator::NotIn) => write!(f, "{single})"),
            values => {
                let items: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}])", items.join(", "))
            }
        }
    }
}

/// A conjunction of predicates. The empty domain matches every record.
pub type Domain = Vec<Predicate>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_operators() {
        assert_eq!("not in".parse::<Operator>().unwrap(), Operator::NotIn);
        assert!(matches!(
            "~".parse::<Operator>(),
            Err(FrameworkError::UnknownOperator(_))
        ));
    }

    #[test]
    fn ilike_ignores_case() {
        let p = Predicate::parse("name", "ilike", "HEL").unwrap();
        assert!(p.matches(&Value::from("hello")));
        assert!(!p.matches(&Value::Empty));
    }

    #[test]
    fn ordering_on_incomparable_is_false() {
        let p = Predicate::new("n", Operator::Gt, 1i64);
        assert!(p.matches(&Value::Integer(2)));
        assert!(!p.matches(&Value::from("2")));
    }

    #[test]
    fn split_path_on_traversal() {
        let p = Predicate::new("typed_ref.test", Operator::Eq, "Hi");
        assert_eq!(p.split_path(), ("typed_ref", Some("test")));
        assert_eq!(p.to_string(), "(typed_ref.test, =, \"Hi\")");
    }

    #[test]
    fn in_and_not_in() {
        let p = Predicate::one_of("n", vec![Value::Integer(1), Value::Integer(2)]);
        assert!(p.matches(&Value::Integer(2)));
        let q = Predicate::none_of("n", vec![Value::Integer(1)]);
        assert!(q.matches(&Value::Integer(2)));
    }
}

//! Records and record sets.

use crate::error::FrameworkError;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use tracing::warn;

/// Field name → value, in declaration order.
pub type Values = IndexMap<String, Value>;

/// Builds [`Values`] from `field => value` pairs.
///
/// ```rust
/// use kindred_framework::{values, Value};
///
/// let v = values! { "name" => "Hi", "count" => 3i64 };
/// assert_eq!(v["count"], Value::Integer(3));
/// ```
#[macro_export]
macro_rules! values {
    () => { $crate::Values::new() };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut values = $crate::Values::new();
        $( values.insert(::std::string::String::from($field), $crate::Value::from($value)); )+
        values
    }};
}

/// Type-safe identifier for records. Unique within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u32);

impl From<u32> for RecordId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One addressable record of some kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub kind: String,
    pub values: Values,
}

impl Record {
    pub fn new(kind: impl Into<String>, id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            values: Values::new(),
        }
    }

    /// The value of `field`, or `Empty` when it was never set.
    pub fn get(&self, field: &str) -> &Value {
        static EMPTY: Value = Value::Empty;
        self.values.get(field).unwrap_or(&EMPTY)
    }
}

/// Options for [`RecordSet::take_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeOne {
    /// Which record to keep when the set holds more than one.
    pub index: usize,
    /// Log a warning when the set holds more than one record.
    pub warn: bool,
    /// Fail when the set holds more than one record.
    pub strict: bool,
}

impl Default for TakeOne {
    fn default() -> Self {
        Self {
            index: 0,
            warn: true,
            strict: false,
        }
    }
}

/// An ordered collection of records of the same kind.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    pub kind: String,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(kind: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            kind: kind.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// The only record of the set; anything else is an error.
    pub fn ensure_one(self) -> Result<Record, FrameworkError> {
        if self.records.len() != 1 {
            return Err(FrameworkError::NotSingleton {
                kind: self.kind,
                count: self.records.len(),
            });
        }
        let mut records = self.records;
        Ok(records.remove(0))
    }

    /// A weaker [`ensure_one`](Self::ensure_one).
    ///
    /// A set with several records yields the one at `opts.index`, after a
    /// warning if `opts.warn` is set, or fails if `opts.strict` is set. A set
    /// without a record at `opts.index` always fails.
    pub fn take_one(self, opts: TakeOne) -> Result<Record, FrameworkError> {
        let count = self.records.len();
        if count > 1 {
            if opts.strict {
                return Err(FrameworkError::NotSingleton {
                    kind: self.kind,
                    count,
                });
            }
            if opts.warn {
                warn!(kind = %self.kind, count, index = opts.index, "More than one record, taking one");
            }
        }
        if opts.index >= count {
            return Err(FrameworkError::IndexOutOfRange {
                kind: self.kind,
                index: opts.index,
                count,
            });
        }
        let mut records = self.records;
        Ok(records.swap_remove(opts.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(n: u32) -> RecordSet {
        RecordSet::new("k", (1..=n).map(|i| Record::new("k", i)).collect())
    }

    #[test]
    fn take_one_picks_index() {
        let opts = TakeOne {
            index: 1,
            ..TakeOne::default()
        };
        let record = set_of(3).take_one(opts).unwrap();
        assert_eq!(record.id, RecordId(2));
    }

    #[test]
    fn take_one_strict_rejects_many() {
        let opts = TakeOne {
            strict: true,
            ..TakeOne::default()
        };
        let err = set_of(2).take_one(opts).unwrap_err();
        assert!(matches!(err, FrameworkError::NotSingleton { count: 2, .. }));
        assert!(set_of(1).take_one(opts).is_ok());
    }

    #[test]
    fn take_one_on_empty_set_is_index_error() {
        let err = set_of(0).take_one(TakeOne::default()).unwrap_err();
        assert!(matches!(err, FrameworkError::IndexOutOfRange { count: 0, .. }));
    }

    #[test]
    fn ensure_one_requires_exactly_one() {
        assert!(set_of(0).ensure_one().is_err());
        assert!(set_of(2).ensure_one().is_err());
        assert_eq!(set_of(1).ensure_one().unwrap().id, RecordId(1));
    }
}

//! Attribute and value types for structured records
//!
//! This module provides:
//! - `Value`: typed attribute values, including nested groups
//! - `Attr`: a key/value pair
//! - `LogValuer`: values computed lazily at render time

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on how many times a lazy value is forced before giving up.
const MAX_LOG_VALUER_STEPS: usize = 100;

/// A value whose rendering is deferred until a record is actually emitted.
///
/// The returned value may itself be lazy; resolution repeats until a concrete
/// value appears.
pub trait LogValuer: Send + Sync {
    fn log_value(&self) -> Value;
}

/// Value type for structured attributes
#[derive(Clone, Default)]
pub enum Value {
    /// The zero value. Paired with an empty key it marks an attribute to drop.
    #[default]
    Null,
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Time(DateTime<Utc>),
    Duration(Duration),
    /// Nested attributes. An empty key inlines the members into the parent.
    Group(Vec<Attr>),
    /// Opaque value rendered through its `Display` form.
    Any(Arc<dyn fmt::Display + Send + Sync>),
    Lazy(Arc<dyn LogValuer>),
}

impl Value {
    /// Force lazy values until a concrete value remains.
    #[must_use]
    pub fn resolve(self) -> Value {
        let mut value = self;
        for _ in 0..MAX_LOG_VALUER_STEPS {
            match value {
                Value::Lazy(valuer) => value = valuer.log_value(),
                other => return other,
            }
        }
        match value {
            Value::Lazy(_) => Value::String(format!(
                "LogValuer resolution exceeded {} steps",
                MAX_LOG_VALUER_STEPS
            )),
            other => other,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Value::Group(_))
    }

    /// Wrap any `Display` type as an opaque value
    pub fn any<T: fmt::Display + Send + Sync + 'static>(value: T) -> Self {
        Value::Any(Arc::new(value))
    }

    /// Wrap a lazily computed value
    pub fn lazy<T: LogValuer + 'static>(valuer: T) -> Self {
        Value::Lazy(Arc::new(valuer))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Uint(u) => write!(f, "Uint({})", u),
            Value::Float(fl) => write!(f, "Float({})", fl),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Time(t) => write!(f, "Time({})", t),
            Value::Duration(d) => write!(f, "Duration({:?})", d),
            Value::Group(attrs) => f.debug_tuple("Group").field(attrs).finish(),
            Value::Any(v) => write!(f, "Any({})", v),
            Value::Lazy(_) => write!(f, "Lazy"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Time(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Duration(d) => write!(f, "{:?}", d),
            Value::Group(attrs) => {
                write!(f, "[")?;
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", attr)?;
                }
                write!(f, "]")
            }
            Value::Any(v) => write!(f, "{}", v),
            Value::Lazy(_) => write!(f, "{}", self.clone().resolve()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Group(a), Value::Group(b)) => a == b,
            (Value::Any(a), Value::Any(b)) => a.to_string() == b.to_string(),
            (Value::Lazy(a), Value::Lazy(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

impl From<u32> for Value {
    fn from(u: u32) -> Self {
        Value::Uint(u as u64)
    }
}

impl From<usize> for Value {
    fn from(u: usize) -> Self {
        Value::Uint(u as u64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

impl From<Vec<Attr>> for Value {
    fn from(attrs: Vec<Attr>) -> Self {
        Value::Group(attrs)
    }
}

/// A key/value pair attached to a record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build a group attribute from its members
    pub fn group<K: Into<String>>(key: K, attrs: Vec<Attr>) -> Self {
        Self {
            key: key.into(),
            value: Value::Group(attrs),
        }
    }

    /// Build an attribute with an opaque `Display` value
    pub fn any<K, T>(key: K, value: T) -> Self
    where
        K: Into<String>,
        T: fmt::Display + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            value: Value::any(value),
        }
    }

    /// True for the attribute that handlers skip: empty key and zero value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.value.is_null()
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, V)> for Attr {
    fn from((key, value): (K, V)) -> Self {
        Attr::new(key, value)
    }
}

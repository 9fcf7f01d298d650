use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::position::TextRange;

/// The payload of a parse result.
#[derive(Clone)]
pub enum Value {
    Nil,
    /// A single matched character.
    Char(char),
    Str(String),
    Number(f64),
    Bool(bool),
    /// Ordered child results of a sequence or repetition.
    Results(Vec<ParseResult>),
    /// An application value substituted by a transform.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Value {
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Value::Custom(Arc::new(value))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_results(&self) -> Option<&[ParseResult]> {
        match self {
            Value::Results(rs) => Some(rs),
            _ => None,
        }
    }

    pub fn into_results(self) -> Option<Vec<ParseResult>> {
        match self {
            Value::Results(rs) => Some(rs),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Custom(v) => v.downcast_ref(),
            _ => None,
        }
    }

    /// Text of this value if it is made only of characters and strings.
    /// Nil contributes nothing and sequences are concatenated.
    pub fn to_text(&self) -> Option<String> {
        let mut buf = String::new();
        if self.push_text(&mut buf) {
            Some(buf)
        } else {
            None
        }
    }

    fn push_text(&self, buf: &mut String) -> bool {
        match self {
            Value::Nil => true,
            Value::Char(c) => {
                buf.push(*c);
                true
            }
            Value::Str(s) => {
                buf.push_str(s);
                true
            }
            Value::Results(rs) => rs.iter().all(|r| r.value.push_text(buf)),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Char(c) => write!(f, "Char({:?})", c),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Results(rs) => f.debug_list().entries(rs).finish(),
            Value::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Custom values compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Results(a), Value::Results(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<ParseResult>> for Value {
    fn from(rs: Vec<ParseResult>) -> Self {
        Value::Results(rs)
    }
}

/// A value together with the text it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub value: Value,
    pub range: TextRange,
}

impl ParseResult {
    pub fn new<V: Into<Value>>(value: V, range: TextRange) -> Self {
        ParseResult {
            value: value.into(),
            range,
        }
    }
}

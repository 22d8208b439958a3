//! Bound values and parameter slots.
//!
//! A [`Literal`] is a scalar that travels out-of-band with the statement
//! text, one per placeholder marker. A [`Param`] pairs a literal with an
//! optional name so it can be re-bound on a finished statement.

use std::fmt;

/// A scalar value bound to a placeholder marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("NULL"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Integer(n) => write!(f, "{n}"),
            Literal::Real(x) => write!(f, "{x}"),
            Literal::Text(s) => write!(f, "'{s}'"),
            Literal::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

impl From<i8> for Literal {
    fn from(v: i8) -> Self {
        Literal::Integer(v.into())
    }
}

impl From<i16> for Literal {
    fn from(v: i16) -> Self {
        Literal::Integer(v.into())
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Integer(v.into())
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Integer(v)
    }
}

impl From<u8> for Literal {
    fn from(v: u8) -> Self {
        Literal::Integer(v.into())
    }
}

impl From<u16> for Literal {
    fn from(v: u16) -> Self {
        Literal::Integer(v.into())
    }
}

impl From<u32> for Literal {
    fn from(v: u32) -> Self {
        Literal::Integer(v.into())
    }
}

impl From<f32> for Literal {
    fn from(v: f32) -> Self {
        Literal::Real(v.into())
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Real(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Text(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::Text(v)
    }
}

impl From<Vec<u8>> for Literal {
    fn from(v: Vec<u8>) -> Self {
        Literal::Blob(v)
    }
}

impl From<&[u8]> for Literal {
    fn from(v: &[u8]) -> Self {
        Literal::Blob(v.to_vec())
    }
}

impl<T> From<Option<T>> for Literal
where
    T: Into<Literal>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Literal::Null,
        }
    }
}

#[cfg(feature = "sqlite")]
impl rusqlite::ToSql for Literal {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        use rusqlite::types::{ToSqlOutput, ValueRef};
        Ok(match self {
            Literal::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Literal::Bool(b) => ToSqlOutput::Borrowed(ValueRef::Integer(i64::from(*b))),
            Literal::Integer(n) => ToSqlOutput::Borrowed(ValueRef::Integer(*n)),
            Literal::Real(x) => ToSqlOutput::Borrowed(ValueRef::Real(*x)),
            Literal::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Literal::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

/// One placeholder slot: a bound value plus an optional rebinding name.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: Option<String>,
    value: Literal,
}

impl Param {
    /// An anonymous parameter slot.
    pub fn new(value: impl Into<Literal>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    /// A named parameter slot, addressable through `Statement::set_param`.
    pub fn named(name: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> &Literal {
        &self.value
    }

    pub(crate) fn set_value(&mut self, value: Literal) {
        self.value = value;
    }
}

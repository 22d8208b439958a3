//! Error types for ashlar

use thiserror::Error;

use crate::dialect::PlaceholderStyle;

/// Result type alias for statement construction
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised while defining relations or building statements
#[derive(Debug, Error)]
pub enum BuildError {
    /// Relation declared with no columns
    #[error("Table '{0}' declared with an empty column list")]
    EmptyColumnList(String),

    /// Column name not declared on the relation it was requested from
    #[error("No column '{column}' on relation '{relation}'")]
    NoSuchColumn { relation: String, column: String },

    /// HAVING present without GROUP BY
    #[error("HAVING clause requires a GROUP BY clause")]
    HavingWithoutGroupBy,

    /// UPDATE built without any SET assignments
    #[error("UPDATE on '{0}' has no SET assignments")]
    EmptySetClause(String),

    /// Join condition shape is wrong for the join kind
    #[error("Invalid join condition: {0}")]
    JoinCondition(String),

    /// USING named a column missing from one of the join sides
    #[error("USING column '{column}' is not present on both join sides")]
    UsingColumnMissing { column: String },

    /// Subquery rendered under a different placeholder style than the
    /// statement embedding it
    #[error("Subquery rendered with {inner:?} markers cannot be embedded in a {outer:?} statement")]
    PlaceholderMismatch {
        outer: PlaceholderStyle,
        inner: PlaceholderStyle,
    },

    /// Unrecognized NULLS ordering keyword
    #[error("Invalid NULLS ordering '{0}' (expected 'first' or 'last')")]
    InvalidNulls(String),

    /// `set_param` addressed a name no parameter slot carries
    #[error("No parameter named '{0}' in this statement")]
    UnknownParam(String),

    /// Row width does not match the statement's output shape
    #[error("Row has {got} values but the statement selects {expected}")]
    ShapeMismatch { expected: usize, got: usize },
}

impl BuildError {
    /// Create a missing-column error
    pub fn no_such_column(relation: impl Into<String>, column: impl Into<String>) -> Self {
        Self::NoSuchColumn {
            relation: relation.into(),
            column: column.into(),
        }
    }

    /// Create a join condition error
    pub fn join_condition(message: impl Into<String>) -> Self {
        Self::JoinCondition(message.into())
    }
}

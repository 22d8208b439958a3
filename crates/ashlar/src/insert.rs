//! The INSERT builder.
//!
//! [`InsertBuilder`] fixes the target table and column list, validating
//! column names as they are added. The finished [`Insert`] serves two
//! execution modes: row tuples bound client-side ([`Insert::row_statement`],
//! one marker per column) and insert-from-select ([`Insert::from_select`]),
//! which appends a finished SELECT and carries its bound values.

use crate::dialect::PlaceholderStyle;
use crate::error::{BuildError, BuildResult};
use crate::relation::Table;
use crate::row::RowShape;
use crate::statement::Statement;
use crate::value::{Literal, Param};

/// Builds INSERT statements.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    style: PlaceholderStyle,
    table: Table,
    columns: Vec<String>,
}

impl InsertBuilder {
    pub fn new(style: PlaceholderStyle, table: Table) -> Self {
        Self {
            style,
            table,
            columns: Vec::new(),
        }
    }

    /// Add one target column, checked against the table immediately.
    pub fn add_column(self, column: impl Into<String>) -> BuildResult<Self> {
        self.add_columns([column.into()])
    }

    /// Add target columns. Each name is checked against the table's
    /// declared columns immediately.
    pub fn add_columns<I, S>(mut self, columns: I) -> BuildResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column = column.into();
            if !self.table.column_names().iter().any(|c| *c == column) {
                return Err(BuildError::no_such_column(self.table.name(), column));
            }
            self.columns.push(column);
        }
        Ok(self)
    }

    /// Finish the builder into an [`Insert`].
    pub fn get(self) -> BuildResult<Insert> {
        if self.columns.is_empty() {
            return Err(BuildError::EmptyColumnList(self.table.name().to_string()));
        }
        let base = format!(
            "INSERT INTO {} ({})",
            self.table.name(),
            self.columns.join(",")
        );
        tracing::debug!(sql = %base, columns = self.columns.len(), "rendered insert base");
        Ok(Insert {
            style: self.style,
            base,
            columns: self.columns,
        })
    }
}

/// A finished INSERT target: table, column list, and placeholder style.
#[derive(Debug, Clone)]
pub struct Insert {
    style: PlaceholderStyle,
    base: String,
    columns: Vec<String>,
}

impl Insert {
    /// The `INSERT INTO table (...)` prefix shared by both modes.
    pub fn sql(&self) -> &str {
        &self.base
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The VALUES form, with one marker per target column.
    pub fn sql_for_rows(&self) -> String {
        let markers = vec![self.style.marker(); self.columns.len()];
        format!("{} VALUES ({})", self.base, markers.join(","))
    }

    /// Bind one row of values into a ready statement.
    pub fn row_statement(&self, row: Vec<Literal>) -> BuildResult<Statement> {
        if row.len() != self.columns.len() {
            return Err(BuildError::ShapeMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        let params = row.into_iter().map(Param::new).collect();
        Ok(Statement::new(
            self.style,
            self.sql_for_rows(),
            params,
            RowShape::default(),
        ))
    }

    /// The insert-from-select form: the SELECT text is appended on its own
    /// line and its bound values carry over unchanged. The SELECT must have
    /// been rendered with this insert's placeholder style.
    pub fn from_select(&self, query: &Statement) -> BuildResult<Statement> {
        if query.style() != self.style {
            return Err(BuildError::PlaceholderMismatch {
                outer: self.style,
                inner: query.style(),
            });
        }
        let sql = format!("{}\n{}", self.base, query.sql());
        Ok(Statement::new(
            self.style,
            sql,
            query.params().to_vec(),
            RowShape::default(),
        ))
    }
}

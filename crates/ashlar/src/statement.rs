//! Finished statements.
//!
//! A [`Statement`] is the artifact a builder produces: frozen SQL text, the
//! bound values in marker order, and the shape of the rows it will return.
//! The text never changes after construction. Named parameters can be given
//! new values with [`Statement::set_param`], which rewrites the stored
//! values without touching the text, so the Nth marker always binds the Nth
//! value.

use std::collections::HashMap;

use crate::dialect::PlaceholderStyle;
use crate::error::{BuildError, BuildResult};
use crate::relation::SubquerySource;
use crate::row::{Record, RowShape};
use crate::value::{Literal, Param};

/// A rendered, executable statement.
#[derive(Debug, Clone)]
pub struct Statement {
    style: PlaceholderStyle,
    sql: String,
    params: Vec<Param>,
    shape: RowShape,
    named: HashMap<String, Vec<usize>>,
}

impl Statement {
    pub(crate) fn new(
        style: PlaceholderStyle,
        sql: String,
        params: Vec<Param>,
        shape: RowShape,
    ) -> Self {
        let mut named: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, param) in params.iter().enumerate() {
            if let Some(name) = param.name() {
                named.entry(name.to_string()).or_default().push(position);
            }
        }
        Self {
            style,
            sql,
            params,
            shape,
            named,
        }
    }

    /// The placeholder style the text was rendered with.
    ///
    /// Embedding this statement in another one requires the styles to
    /// match, since the text is spliced verbatim.
    pub fn style(&self) -> PlaceholderStyle {
        self.style
    }

    /// The statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Use this statement as a FROM-clause source under an alias.
    ///
    /// The output names become the subquery's column namespace.
    pub fn subquery(self, alias: impl Into<String>) -> SubquerySource {
        SubquerySource::new(self, alias)
    }

    /// The parameter slots, in marker order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// The current bound values, in marker order.
    pub fn values(&self) -> Vec<Literal> {
        self.params.iter().map(|p| p.value().clone()).collect()
    }

    /// The output shape of this statement. Empty for DML statements.
    pub fn shape(&self) -> &RowShape {
        &self.shape
    }

    /// Rebind every parameter slot carrying the given name.
    ///
    /// Requires `&mut self`, so two bindings of the same statement cannot
    /// race; clone the statement to rebind independently.
    pub fn set_param(&mut self, name: &str, value: impl Into<Literal>) -> BuildResult<()> {
        let positions = self
            .named
            .get(name)
            .ok_or_else(|| BuildError::UnknownParam(name.to_string()))?;
        let value = value.into();
        for &position in positions {
            self.params[position].set_value(value.clone());
        }
        Ok(())
    }

    /// Wrap a positional result row in this statement's shape.
    pub fn record(&self, values: Vec<Literal>) -> BuildResult<Record> {
        self.shape.record(values)
    }

    /// The bound values as a positional parameter list for rusqlite.
    #[cfg(feature = "sqlite")]
    pub fn sqlite_params(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params
            .iter()
            .map(|p| p.value() as &dyn rusqlite::ToSql)
            .collect()
    }
}

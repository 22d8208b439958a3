//! The UPDATE builder.

use crate::dialect::PlaceholderStyle;
use crate::error::{BuildError, BuildResult};
use crate::expr::Expr;
use crate::relation::Table;
use crate::render;
use crate::row::RowShape;
use crate::statement::Statement;
use crate::value::Param;

/// Builds UPDATE statements.
///
/// Assignments render in the SET clause in the order they were added, then
/// conditions in the WHERE clause, and bound values follow the same order.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    style: PlaceholderStyle,
    table: Table,
    updates: Vec<(String, Expr)>,
    conditions: Vec<Expr>,
}

impl UpdateBuilder {
    pub fn new(style: PlaceholderStyle, table: Table) -> Self {
        Self {
            style,
            table,
            updates: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Assign a value expression to a column. The column name is checked
    /// against the table immediately.
    pub fn set(mut self, column: &str, value: impl Into<Expr>) -> BuildResult<Self> {
        if !self.table.column_names().iter().any(|c| c == column) {
            return Err(BuildError::no_such_column(self.table.name(), column));
        }
        self.updates.push((column.to_string(), value.into()));
        Ok(self)
    }

    /// Add a filtering condition. No conditions means every row updates.
    pub fn where_(mut self, condition: impl Into<Expr>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Render the finished statement.
    pub fn get(self) -> BuildResult<Statement> {
        if self.updates.is_empty() {
            return Err(BuildError::EmptySetClause(self.table.name().to_string()));
        }

        for (_, value) in &self.updates {
            value.ensure_style(self.style)?;
        }
        for condition in &self.conditions {
            condition.ensure_style(self.style)?;
        }

        let marker = self.style.marker();
        let mut params: Vec<Param> = Vec::new();

        let mut sql = format!("UPDATE {} SET\n\t", self.table.name());
        sql.push_str(
            &self
                .updates
                .iter()
                .map(|(column, value)| format!("{} = {}", column, value.reference_sql(marker)))
                .collect::<Vec<_>>()
                .join(",\n\t"),
        );
        for (_, value) in &self.updates {
            value.collect_params(&mut params);
        }

        render::push_predicates(
            &mut sql,
            &mut params,
            render::WHERE_PREFIX,
            render::WHERE_SEPARATOR,
            &self.conditions,
            marker,
        );

        tracing::debug!(sql = %sql, params = params.len(), "rendered update statement");
        Ok(Statement::new(self.style, sql, params, RowShape::default()))
    }
}

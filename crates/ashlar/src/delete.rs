//! The DELETE builder.

use crate::dialect::PlaceholderStyle;
use crate::error::BuildResult;
use crate::expr::Expr;
use crate::relation::Table;
use crate::render;
use crate::row::RowShape;
use crate::statement::Statement;
use crate::value::Param;

/// Builds DELETE statements.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    style: PlaceholderStyle,
    table: Table,
    conditions: Vec<Expr>,
}

impl DeleteBuilder {
    pub fn new(style: PlaceholderStyle, table: Table) -> Self {
        Self {
            style,
            table,
            conditions: Vec::new(),
        }
    }

    /// Add a filtering condition. No conditions means every row is deleted.
    pub fn where_(mut self, condition: impl Into<Expr>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Render the finished statement.
    pub fn get(self) -> BuildResult<Statement> {
        for condition in &self.conditions {
            condition.ensure_style(self.style)?;
        }

        let marker = self.style.marker();
        let mut params: Vec<Param> = Vec::new();

        let mut sql = format!("DELETE FROM {}", self.table.name());
        render::push_predicates(
            &mut sql,
            &mut params,
            render::WHERE_PREFIX,
            render::WHERE_SEPARATOR,
            &self.conditions,
            marker,
        );

        tracing::debug!(sql = %sql, params = params.len(), "rendered delete statement");
        Ok(Statement::new(self.style, sql, params, RowShape::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Literal;

    fn playlist_track() -> Table {
        Table::new("playlist_track", ["PlaylistId", "TrackId"]).unwrap()
    }

    #[test]
    fn delete_with_conditions() {
        let tbl = playlist_track();
        let stmt = DeleteBuilder::new(PlaceholderStyle::Qmark, tbl.clone())
            .where_(tbl.column("PlaylistId").unwrap().eq(18i64))
            .where_(tbl.column("TrackId").unwrap().gt(100i64))
            .get()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "DELETE FROM playlist_track\nWHERE (playlist_track.PlaylistId) = (?)\n  AND (playlist_track.TrackId) > (?)"
        );
        assert_eq!(
            stmt.values(),
            vec![Literal::Integer(18), Literal::Integer(100)]
        );
    }

    #[test]
    fn delete_rejects_mismatched_subquery_style() {
        use crate::error::BuildError;
        use crate::select::QueryBuilder;

        let tbl = playlist_track();
        let inner = QueryBuilder::new(PlaceholderStyle::Format)
            .select(tbl.column("TrackId").unwrap())
            .where_(tbl.column("PlaylistId").unwrap().eq(18i64))
            .get()
            .unwrap();
        let err = DeleteBuilder::new(PlaceholderStyle::Qmark, tbl.clone())
            .where_(tbl.column("TrackId").unwrap().in_query(inner))
            .get()
            .unwrap_err();
        assert!(matches!(err, BuildError::PlaceholderMismatch { .. }));
    }

    #[test]
    fn delete_without_conditions_targets_all_rows() {
        let stmt = DeleteBuilder::new(PlaceholderStyle::Qmark, playlist_track())
            .get()
            .unwrap();
        assert_eq!(stmt.sql(), "DELETE FROM playlist_track");
        assert!(stmt.params().is_empty());
    }
}

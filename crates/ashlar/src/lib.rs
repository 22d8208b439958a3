//! # ashlar
//!
//! A composable SQL statement builder.
//!
//! ## Features
//!
//! - **Typed expressions**: columns, values, and operators compose into an
//!   expression tree; bound values never splice into statement text
//! - **Relations**: tables, aliases, and joins, with FROM-clause membership
//!   inferred from the expressions a query uses
//! - **Positional parameters**: a single marker style (`?` or `%s`), with
//!   parameter order guaranteed to match marker order
//! - **Named rebinding**: finished statements can be reused with new values
//!   via `Statement::set_param`, without re-rendering
//! - **Row shapes**: every SELECT knows its output names up front
//!
//! ## Example
//!
//! ```ignore
//! use ashlar::{PlaceholderStyle, QueryBuilder, Table};
//!
//! let track = Table::new("track", ["TrackId", "Name", "GenreId"])?;
//!
//! let mut stmt = QueryBuilder::new(PlaceholderStyle::Qmark)
//!     .select(track.column("Name")?)
//!     .where_(track.column("GenreId")?.eq(ashlar::Expr::param("genre_id", 1i64)))
//!     .get()?;
//!
//! // Later, rebind without rebuilding:
//! stmt.set_param("genre_id", 4i64)?;
//! # Ok::<(), ashlar::BuildError>(())
//! ```

pub mod delete;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod insert;
pub mod relation;
mod render;
pub mod row;
pub mod select;
pub mod statement;
pub mod update;
pub mod value;

pub use delete::DeleteBuilder;
pub use dialect::PlaceholderStyle;
pub use error::{BuildError, BuildResult};
pub use expr::{BinaryOp, ChainOp, Expr, UnaryOp};
pub use insert::{Insert, InsertBuilder};
pub use relation::{
    AliasedTable, ColumnRef, Join, JoinCondition, JoinKind, JoinSide, Relation, SubquerySource,
    Table,
};
pub use row::{Record, RowShape};
pub use select::{Nulls, QueryBuilder, QuerySpec};
pub use statement::Statement;
pub use update::UpdateBuilder;
pub use value::{Literal, Param};

/// Start a SELECT builder.
pub fn query(style: PlaceholderStyle) -> QueryBuilder {
    QueryBuilder::new(style)
}

/// Start an INSERT builder for a table.
pub fn insert(style: PlaceholderStyle, table: Table) -> InsertBuilder {
    InsertBuilder::new(style, table)
}

/// Start an UPDATE builder for a table.
pub fn update(style: PlaceholderStyle, table: Table) -> UpdateBuilder {
    UpdateBuilder::new(style, table)
}

/// Start a DELETE builder for a table.
pub fn delete(style: PlaceholderStyle, table: Table) -> DeleteBuilder {
    DeleteBuilder::new(style, table)
}

#[cfg(test)]
mod tests;

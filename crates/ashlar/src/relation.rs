//! Tables, aliases, and joins.
//!
//! A [`Relation`] is anything that can stand in a FROM clause. Tables are
//! equal when their qualified names are equal, aliased tables when both the
//! alias and the underlying table match, and joins only when they are the
//! same join instance (every constructed join gets its own identity, which
//! clones share). FROM-clause deduplication rides on these rules.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::dialect::PlaceholderStyle;
use crate::error::{BuildError, BuildResult};
use crate::expr::Expr;
use crate::statement::Statement;
use crate::value::Param;

static JOIN_IDS: AtomicU64 = AtomicU64::new(0);

/// A database table with a declared column list.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<String>,
}

impl Table {
    /// Declare a table and the columns statements may address on it.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> BuildResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(BuildError::EmptyColumnList(name));
        }
        Ok(Self { name, columns })
    }

    /// Declare a schema-qualified table.
    pub fn with_schema<I, S>(schema: &str, name: &str, columns: I) -> BuildResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(format!("{schema}.{name}"), columns)
    }

    /// The qualified name of this table.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// A reference to one declared column.
    pub fn column(&self, name: &str) -> BuildResult<Expr> {
        if !self.has_column(name) {
            return Err(BuildError::no_such_column(&self.name, name));
        }
        Ok(Expr::Column(ColumnRef {
            qualifier: self.name.clone(),
            column: name.to_string(),
            relation: Relation::Table(self.clone()),
        }))
    }

    /// References to every declared column, in declaration order.
    pub fn columns(&self) -> Vec<Expr> {
        Relation::Table(self.clone()).selectables()
    }

    /// Use this table under an alias.
    pub fn alias(&self, alias: impl Into<String>) -> AliasedTable {
        AliasedTable {
            table: self.clone(),
            alias: alias.into(),
        }
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Table {}

impl Hash for Table {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// A table used under a different name.
///
/// Two uses of the same table under different aliases count as different
/// relations, which is what makes self-joins expressible.
#[derive(Debug, Clone)]
pub struct AliasedTable {
    table: Table,
    alias: String,
}

impl AliasedTable {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn alias_name(&self) -> &str {
        &self.alias
    }

    /// A reference to one declared column, qualified by the alias.
    pub fn column(&self, name: &str) -> BuildResult<Expr> {
        if !self.table.has_column(name) {
            return Err(BuildError::no_such_column(&self.alias, name));
        }
        Ok(Expr::Column(ColumnRef {
            qualifier: self.alias.clone(),
            column: name.to_string(),
            relation: Relation::Aliased(self.clone()),
        }))
    }

    /// References to every declared column, qualified by the alias.
    pub fn columns(&self) -> Vec<Expr> {
        Relation::Aliased(self.clone()).selectables()
    }
}

impl PartialEq for AliasedTable {
    fn eq(&self, other: &Self) -> bool {
        self.alias == other.alias && self.table == other.table
    }
}

impl Eq for AliasedTable {}

impl Hash for AliasedTable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alias.hash(state);
        self.table.hash(state);
    }
}

/// The kind of a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT OUTER JOIN",
            JoinKind::Right => "RIGHT OUTER JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

/// How the two sides of a join are matched.
#[derive(Debug, Clone)]
pub enum JoinCondition {
    /// An arbitrary predicate: `... ON (expr)`.
    ///
    /// Boxed: the predicate may reference columns whose relation is itself
    /// a join carrying a condition.
    On(Box<Expr>),
    /// Shared column names: `... USING (a, b)`.
    Using(Vec<String>),
    /// No condition. Only valid for cross joins.
    Cross,
}

impl JoinCondition {
    pub fn on(predicate: impl Into<Expr>) -> Self {
        JoinCondition::On(Box::new(predicate.into()))
    }

    pub fn using<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        JoinCondition::Using(columns.into_iter().map(Into::into).collect())
    }
}

/// A join of two relations. Either side may itself be a join.
#[derive(Debug, Clone)]
pub struct Join {
    id: u64,
    kind: JoinKind,
    left: Box<Relation>,
    right: Box<Relation>,
    condition: JoinCondition,
}

impl Join {
    /// Build a join, validating the condition against the join kind.
    pub fn new(
        kind: JoinKind,
        left: impl Into<Relation>,
        right: impl Into<Relation>,
        condition: JoinCondition,
    ) -> BuildResult<Self> {
        let left = left.into();
        let right = right.into();

        match (&kind, &condition) {
            (JoinKind::Cross, JoinCondition::Cross) => {}
            (JoinKind::Cross, _) => {
                return Err(BuildError::join_condition("CROSS JOIN takes no condition"));
            }
            (_, JoinCondition::Cross) => {
                return Err(BuildError::join_condition(format!(
                    "{} requires an ON predicate or a USING column list",
                    kind.keyword()
                )));
            }
            (_, JoinCondition::Using(columns)) => {
                if columns.is_empty() {
                    return Err(BuildError::join_condition(
                        "USING requires at least one column",
                    ));
                }
                for column in columns {
                    if !left.has_column(column) || !right.has_column(column) {
                        return Err(BuildError::UsingColumnMissing {
                            column: column.clone(),
                        });
                    }
                }
            }
            (_, JoinCondition::On(_)) => {}
        }

        Ok(Self {
            id: JOIN_IDS.fetch_add(1, Ordering::Relaxed),
            kind,
            left: Box::new(left),
            right: Box::new(right),
            condition,
        })
    }

    pub fn inner(
        left: impl Into<Relation>,
        right: impl Into<Relation>,
        condition: JoinCondition,
    ) -> BuildResult<Self> {
        Self::new(JoinKind::Inner, left, right, condition)
    }

    pub fn left_outer(
        left: impl Into<Relation>,
        right: impl Into<Relation>,
        condition: JoinCondition,
    ) -> BuildResult<Self> {
        Self::new(JoinKind::Left, left, right, condition)
    }

    pub fn right_outer(
        left: impl Into<Relation>,
        right: impl Into<Relation>,
        condition: JoinCondition,
    ) -> BuildResult<Self> {
        Self::new(JoinKind::Right, left, right, condition)
    }

    pub fn full_outer(
        left: impl Into<Relation>,
        right: impl Into<Relation>,
        condition: JoinCondition,
    ) -> BuildResult<Self> {
        Self::new(JoinKind::Full, left, right, condition)
    }

    pub fn cross(left: impl Into<Relation>, right: impl Into<Relation>) -> BuildResult<Self> {
        Self::new(JoinKind::Cross, left, right, JoinCondition::Cross)
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    /// A handle for addressing columns through the left side.
    pub fn left(&self) -> JoinSide {
        JoinSide {
            join: self.clone(),
            inner: (*self.left).clone(),
        }
    }

    /// A handle for addressing columns through the right side.
    pub fn right(&self) -> JoinSide {
        JoinSide {
            join: self.clone(),
            inner: (*self.right).clone(),
        }
    }

    /// Find a named base relation anywhere in this join tree.
    ///
    /// Columns taken through the returned handle still report this join as
    /// their relation, so the FROM clause sees the join exactly once.
    pub fn relation(&self, name: &str) -> Option<JoinSide> {
        fn find(relation: &Relation, name: &str) -> Option<Relation> {
            match relation {
                Relation::Table(table) if table.name() == name => Some(relation.clone()),
                Relation::Aliased(aliased) if aliased.alias_name() == name => {
                    Some(relation.clone())
                }
                Relation::Subquery(sub) if sub.alias_name() == name => Some(relation.clone()),
                Relation::Join(join) => {
                    find(&join.left, name).or_else(|| find(&join.right, name))
                }
                _ => None,
            }
        }

        let inner = find(&Relation::Join(self.clone()), name)?;
        Some(JoinSide {
            join: self.clone(),
            inner,
        })
    }

    /// Resolve a column by name across both sides.
    ///
    /// USING columns resolve through the left side. Other names are looked
    /// up left side first; ambiguous names should go through [`Join::left`]
    /// or [`Join::right`] instead.
    pub fn column(&self, name: &str) -> BuildResult<Expr> {
        let side = if self.using_columns().iter().any(|c| c == name) {
            &self.left
        } else if self.left.has_column(name) {
            &self.left
        } else {
            &self.right
        };
        let (qualifier, column) = side.locate_column(name)?;
        Ok(Expr::Column(ColumnRef {
            qualifier,
            column,
            relation: Relation::Join(self.clone()),
        }))
    }

    /// References to every column this join exposes.
    ///
    /// Columns named in USING appear once, from the left side.
    pub fn columns(&self) -> Vec<Expr> {
        Relation::Join(self.clone()).selectables()
    }

    fn using_columns(&self) -> &[String] {
        match &self.condition {
            JoinCondition::Using(columns) => columns,
            _ => &[],
        }
    }
}

/// One side of a join, used to address columns unambiguously.
#[derive(Debug, Clone)]
pub struct JoinSide {
    join: Join,
    inner: Relation,
}

impl JoinSide {
    /// A reference to a column on this side of the join.
    pub fn column(&self, name: &str) -> BuildResult<Expr> {
        let (qualifier, column) = self.inner.locate_column(name)?;
        Ok(Expr::Column(ColumnRef {
            qualifier,
            column,
            relation: Relation::Join(self.join.clone()),
        }))
    }

    /// References to every column on this side of the join.
    pub fn columns(&self) -> Vec<Expr> {
        self.inner
            .selectable_pairs()
            .into_iter()
            .map(|(qualifier, column)| {
                Expr::Column(ColumnRef {
                    qualifier,
                    column,
                    relation: Relation::Join(self.join.clone()),
                })
            })
            .collect()
    }
}

/// A finished SELECT statement standing in a FROM clause under an alias.
///
/// The statement's output names are the columns the subquery exposes, and
/// its bound values travel with the relation into the enclosing statement.
#[derive(Debug, Clone)]
pub struct SubquerySource {
    statement: Statement,
    alias: String,
}

impl SubquerySource {
    pub(crate) fn new(statement: Statement, alias: impl Into<String>) -> Self {
        Self {
            statement,
            alias: alias.into(),
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn alias_name(&self) -> &str {
        &self.alias
    }

    /// A reference to one of the subquery's output columns.
    pub fn column(&self, name: &str) -> BuildResult<Expr> {
        if self.statement.shape().position(name).is_none() {
            return Err(BuildError::no_such_column(&self.alias, name));
        }
        Ok(Expr::Column(ColumnRef {
            qualifier: self.alias.clone(),
            column: name.to_string(),
            relation: Relation::Subquery(self.clone()),
        }))
    }

    /// References to every output column, in select-list order.
    pub fn columns(&self) -> Vec<Expr> {
        Relation::Subquery(self.clone()).selectables()
    }
}

impl PartialEq for SubquerySource {
    fn eq(&self, other: &Self) -> bool {
        self.alias == other.alias
            && self.statement.sql() == other.statement.sql()
            && self.statement.params() == other.statement.params()
    }
}

impl Eq for SubquerySource {}

impl Hash for SubquerySource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alias.hash(state);
        self.statement.sql().hash(state);
    }
}

/// Anything that can appear in a FROM clause.
#[derive(Debug, Clone)]
pub enum Relation {
    Table(Table),
    Aliased(AliasedTable),
    Join(Join),
    Subquery(SubquerySource),
}

impl Relation {
    /// A short name for error messages.
    pub(crate) fn label(&self) -> String {
        match self {
            Relation::Table(table) => table.name().to_string(),
            Relation::Aliased(aliased) => aliased.alias_name().to_string(),
            Relation::Join(join) => format!(
                "{} {} {}",
                join.left.label(),
                join.kind.keyword(),
                join.right.label()
            ),
            Relation::Subquery(sub) => sub.alias.clone(),
        }
    }

    fn has_column(&self, name: &str) -> bool {
        match self {
            Relation::Table(table) => table.has_column(name),
            Relation::Aliased(aliased) => aliased.table.has_column(name),
            Relation::Join(_) => self
                .selectable_pairs()
                .iter()
                .any(|(_, column)| column == name),
            Relation::Subquery(sub) => sub.statement.shape().position(name).is_some(),
        }
    }

    /// Resolve a column name to `(qualifier, column)` within this relation.
    pub(crate) fn locate_column(&self, name: &str) -> BuildResult<(String, String)> {
        match self {
            Relation::Table(table) => {
                if table.has_column(name) {
                    Ok((table.name.clone(), name.to_string()))
                } else {
                    Err(BuildError::no_such_column(&table.name, name))
                }
            }
            Relation::Aliased(aliased) => {
                if aliased.table.has_column(name) {
                    Ok((aliased.alias.clone(), name.to_string()))
                } else {
                    Err(BuildError::no_such_column(&aliased.alias, name))
                }
            }
            Relation::Join(join) => join
                .left
                .locate_column(name)
                .or_else(|_| join.right.locate_column(name))
                .map_err(|_| BuildError::no_such_column(self.label(), name)),
            Relation::Subquery(sub) => {
                if sub.statement.shape().position(name).is_some() {
                    Ok((sub.alias.clone(), name.to_string()))
                } else {
                    Err(BuildError::no_such_column(&sub.alias, name))
                }
            }
        }
    }

    /// The `(qualifier, column)` pairs this relation exposes for selection.
    pub(crate) fn selectable_pairs(&self) -> Vec<(String, String)> {
        match self {
            Relation::Table(table) => table
                .columns
                .iter()
                .map(|column| (table.name.clone(), column.clone()))
                .collect(),
            Relation::Aliased(aliased) => aliased
                .table
                .columns
                .iter()
                .map(|column| (aliased.alias.clone(), column.clone()))
                .collect(),
            Relation::Join(join) => {
                let using = join.using_columns();
                let mut pairs = join.left.selectable_pairs();
                pairs.extend(
                    join.right
                        .selectable_pairs()
                        .into_iter()
                        .filter(|(_, column)| !using.iter().any(|c| c == column)),
                );
                pairs
            }
            Relation::Subquery(sub) => sub
                .statement
                .shape()
                .names()
                .iter()
                .map(|column| (sub.alias.clone(), column.clone()))
                .collect(),
        }
    }

    /// Column references for everything this relation exposes.
    pub fn selectables(&self) -> Vec<Expr> {
        self.selectable_pairs()
            .into_iter()
            .map(|(qualifier, column)| {
                Expr::Column(ColumnRef {
                    qualifier,
                    column,
                    relation: self.clone(),
                })
            })
            .collect()
    }

    /// Render this relation for the FROM clause.
    pub fn from_sql(&self, marker: &str) -> String {
        match self {
            Relation::Table(table) => table.name.clone(),
            Relation::Aliased(aliased) => {
                format!("{} AS {}", aliased.table.name, aliased.alias)
            }
            Relation::Join(join) => {
                // Nested joins are parenthesized to pin associativity.
                let side = |relation: &Relation| match relation {
                    Relation::Join(_) => format!("({})", relation.from_sql(marker)),
                    other => other.from_sql(marker),
                };
                let mut out = format!(
                    "{} {} {}",
                    side(&join.left),
                    join.kind.keyword(),
                    side(&join.right)
                );
                match &join.condition {
                    JoinCondition::On(predicate) => {
                        out.push_str(" ON (");
                        out.push_str(&predicate.reference_sql(marker));
                        out.push(')');
                    }
                    JoinCondition::Using(columns) => {
                        out.push_str(" USING (");
                        out.push_str(&columns.join(", "));
                        out.push(')');
                    }
                    JoinCondition::Cross => {}
                }
                out
            }
            Relation::Subquery(sub) => {
                format!("({}) AS {}", sub.statement.sql(), sub.alias)
            }
        }
    }

    /// Bound values contributed by this relation, in text order.
    pub(crate) fn collect_params(&self, out: &mut Vec<Param>) {
        match self {
            Relation::Table(_) | Relation::Aliased(_) => {}
            Relation::Join(join) => {
                join.left.collect_params(out);
                join.right.collect_params(out);
                if let JoinCondition::On(predicate) = &join.condition {
                    predicate.collect_params(out);
                }
            }
            Relation::Subquery(sub) => out.extend(sub.statement.params().iter().cloned()),
        }
    }

    pub fn params(&self) -> Vec<Param> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    /// Check that every embedded statement was rendered under the style the
    /// enclosing statement will use.
    pub(crate) fn ensure_style(&self, style: PlaceholderStyle) -> BuildResult<()> {
        match self {
            Relation::Table(_) | Relation::Aliased(_) => Ok(()),
            Relation::Join(join) => {
                join.left.ensure_style(style)?;
                join.right.ensure_style(style)?;
                if let JoinCondition::On(predicate) = &join.condition {
                    predicate.ensure_style(style)?;
                }
                Ok(())
            }
            Relation::Subquery(sub) => {
                if sub.statement.style() != style {
                    return Err(BuildError::PlaceholderMismatch {
                        outer: style,
                        inner: sub.statement.style(),
                    });
                }
                Ok(())
            }
        }
    }
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Relation::Table(a), Relation::Table(b)) => a == b,
            (Relation::Aliased(a), Relation::Aliased(b)) => a == b,
            (Relation::Join(a), Relation::Join(b)) => a.id == b.id,
            (Relation::Subquery(a), Relation::Subquery(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Relation {}

impl Hash for Relation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Relation::Table(table) => {
                0u8.hash(state);
                table.hash(state);
            }
            Relation::Aliased(aliased) => {
                1u8.hash(state);
                aliased.hash(state);
            }
            Relation::Join(join) => {
                2u8.hash(state);
                join.id.hash(state);
            }
            Relation::Subquery(sub) => {
                3u8.hash(state);
                sub.hash(state);
            }
        }
    }
}

impl From<Table> for Relation {
    fn from(table: Table) -> Self {
        Relation::Table(table)
    }
}

impl From<AliasedTable> for Relation {
    fn from(aliased: AliasedTable) -> Self {
        Relation::Aliased(aliased)
    }
}

impl From<Join> for Relation {
    fn from(join: Join) -> Self {
        Relation::Join(join)
    }
}

impl From<SubquerySource> for Relation {
    fn from(sub: SubquerySource) -> Self {
        Relation::Subquery(sub)
    }
}

/// A qualified column reference tied to the relation it came from.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    pub(crate) qualifier: String,
    pub(crate) column: String,
    pub(crate) relation: Relation,
}

impl ColumnRef {
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }
}

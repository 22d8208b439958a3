//! The SELECT builder.
//!
//! [`QueryBuilder`] accumulates clause entries in call order and renders a
//! [`Statement`] when [`QueryBuilder::get`] is called. Relations touched by
//! select and where expressions join the FROM clause automatically; a
//! relation is listed once no matter how many expressions touch it, in the
//! order it was first seen.
//!
//! Parameter collection is clause-major: select values first, then FROM
//! (join ON predicates), then WHERE, GROUP BY, HAVING, and ORDER BY, each
//! clause left to right. That keeps marker occurrence N bound to parameter
//! N without numbering the markers.

use crate::dialect::PlaceholderStyle;
use crate::error::{BuildError, BuildResult};
use crate::expr::Expr;
use crate::relation::Relation;
use crate::render;
use crate::row::RowShape;
use crate::statement::Statement;
use crate::value::Param;

/// Placement of NULLs in a sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    First,
    Last,
}

impl Nulls {
    /// Parse a NULLS placement keyword, case-insensitively.
    pub fn parse(s: &str) -> BuildResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(Nulls::First),
            "last" => Ok(Nulls::Last),
            _ => Err(BuildError::InvalidNulls(s.to_string())),
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Nulls::First => "FIRST",
            Nulls::Last => "LAST",
        }
    }
}

#[derive(Debug, Clone)]
struct OrderTerm {
    expr: Expr,
    ascending: bool,
    nulls: Option<Nulls>,
}

impl OrderTerm {
    fn order_spec(&self, marker: &str) -> String {
        let direction = if self.ascending { "ASC" } else { "DESC" };
        match self.nulls {
            Some(nulls) => format!(
                "{} {} NULLS {}",
                self.expr.reference_sql(marker),
                direction,
                nulls.keyword()
            ),
            None => format!("{} {}", self.expr.reference_sql(marker), direction),
        }
    }
}

/// Accumulated clause entries for one SELECT statement.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    relations: Vec<Relation>,
    select_exprs: Vec<Expr>,
    where_conds: Vec<Expr>,
    group_exprs: Vec<Expr>,
    having_conds: Vec<Expr>,
    orderings: Vec<OrderTerm>,
    distinct: bool,
}

impl QuerySpec {
    fn add_relation(&mut self, relation: Relation) {
        if !self.relations.contains(&relation) {
            self.relations.push(relation);
        }
    }

    fn add_relations_of(&mut self, expr: &Expr) {
        for relation in expr.relations() {
            self.add_relation(relation);
        }
    }
}

/// Builds SELECT statements.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    style: PlaceholderStyle,
    spec: QuerySpec,
}

impl QueryBuilder {
    pub fn new(style: PlaceholderStyle) -> Self {
        Self {
            style,
            spec: QuerySpec::default(),
        }
    }

    /// Add one expression to the select list.
    pub fn select(mut self, expr: impl Into<Expr>) -> Self {
        let expr = expr.into();
        self.spec.add_relations_of(&expr);
        self.spec.select_exprs.push(expr);
        self
    }

    /// Add several expressions to the select list.
    pub fn select_many<I>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        for expr in exprs {
            self = self.select(expr);
        }
        self
    }

    /// Select every column a relation exposes.
    pub fn select_all(mut self, relation: impl Into<Relation>) -> Self {
        let relation = relation.into();
        self.spec.select_exprs.extend(relation.selectables());
        self.spec.add_relation(relation);
        self
    }

    /// Add a relation to the FROM clause explicitly.
    ///
    /// Needed only for relations no selected or filtered expression
    /// touches, such as the unreferenced side of a cross join.
    pub fn from_(mut self, relation: impl Into<Relation>) -> Self {
        self.spec.add_relation(relation.into());
        self
    }

    /// Add a condition to the WHERE clause.
    pub fn where_(mut self, condition: impl Into<Expr>) -> Self {
        let condition = condition.into();
        self.spec.add_relations_of(&condition);
        self.spec.where_conds.push(condition);
        self
    }

    /// Add a grouping expression.
    pub fn group_by(mut self, expr: impl Into<Expr>) -> Self {
        self.spec.group_exprs.push(expr.into());
        self
    }

    /// Add a condition to the HAVING clause.
    pub fn having(mut self, condition: impl Into<Expr>) -> Self {
        self.spec.having_conds.push(condition.into());
        self
    }

    /// Add a sort term. `ascending` and `nulls` apply to this term only.
    pub fn order_by(
        mut self,
        expr: impl Into<Expr>,
        ascending: bool,
        nulls: Option<Nulls>,
    ) -> Self {
        self.spec.orderings.push(OrderTerm {
            expr: expr.into(),
            ascending,
            nulls,
        });
        self
    }

    /// Request `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.spec.distinct = true;
        self
    }

    /// Render the statement text without building the full artifact.
    pub fn to_sql(&self) -> BuildResult<String> {
        self.render().map(|(sql, _)| sql)
    }

    /// Validate the accumulated spec and render the finished statement.
    pub fn get(self) -> BuildResult<Statement> {
        let (sql, params) = self.render()?;
        let shape = RowShape::from_select(&self.spec.select_exprs);
        tracing::debug!(
            sql = %sql,
            params = params.len(),
            columns = shape.len(),
            "rendered select statement"
        );
        Ok(Statement::new(self.style, sql, params, shape))
    }

    fn render(&self) -> BuildResult<(String, Vec<Param>)> {
        if !self.spec.having_conds.is_empty() && self.spec.group_exprs.is_empty() {
            return Err(BuildError::HavingWithoutGroupBy);
        }
        for expr in self
            .spec
            .select_exprs
            .iter()
            .chain(&self.spec.where_conds)
            .chain(&self.spec.group_exprs)
            .chain(&self.spec.having_conds)
        {
            expr.ensure_style(self.style)?;
        }
        for term in &self.spec.orderings {
            term.expr.ensure_style(self.style)?;
        }
        for relation in &self.spec.relations {
            relation.ensure_style(self.style)?;
        }

        let marker = self.style.marker();
        let mut sql = String::new();
        let mut params: Vec<Param> = Vec::new();

        if self.spec.distinct {
            sql.push_str("SELECT DISTINCT\n\t");
        } else {
            sql.push_str("SELECT\n\t");
        }
        sql.push_str(
            &self
                .spec
                .select_exprs
                .iter()
                .map(|expr| expr.select_sql(marker))
                .collect::<Vec<_>>()
                .join(",\n\t"),
        );
        for expr in &self.spec.select_exprs {
            expr.collect_params(&mut params);
        }

        if !self.spec.relations.is_empty() {
            sql.push_str("\nFROM\n\t");
            sql.push_str(
                &self
                    .spec
                    .relations
                    .iter()
                    .map(|relation| relation.from_sql(marker))
                    .collect::<Vec<_>>()
                    .join(",\n\t"),
            );
            for relation in &self.spec.relations {
                relation.collect_params(&mut params);
            }
        }

        render::push_predicates(
            &mut sql,
            &mut params,
            render::WHERE_PREFIX,
            render::WHERE_SEPARATOR,
            &self.spec.where_conds,
            marker,
        );

        if !self.spec.group_exprs.is_empty() {
            sql.push_str("\nGROUP BY\n\t");
            sql.push_str(
                &self
                    .spec
                    .group_exprs
                    .iter()
                    .map(|expr| expr.reference_sql(marker))
                    .collect::<Vec<_>>()
                    .join(",\n\t"),
            );
            for expr in &self.spec.group_exprs {
                expr.collect_params(&mut params);
            }
        }

        render::push_predicates(
            &mut sql,
            &mut params,
            render::HAVING_PREFIX,
            render::HAVING_SEPARATOR,
            &self.spec.having_conds,
            marker,
        );

        if !self.spec.orderings.is_empty() {
            sql.push_str("\nORDER BY ");
            sql.push_str(
                &self
                    .spec
                    .orderings
                    .iter()
                    .map(|term| term.order_spec(marker))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            for term in &self.spec.orderings {
                term.expr.collect_params(&mut params);
            }
        }

        Ok((sql, params))
    }
}

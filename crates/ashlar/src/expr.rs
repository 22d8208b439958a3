//! Typed SQL expressions.
//!
//! An [`Expr`] is a tree of columns, bound values, and operators. Every node
//! knows three things: how to spell itself in statement text, which bound
//! values it contributes (in text order), and which relations it touches.
//! Operands are always parenthesized when rendered, so operator precedence
//! never depends on the database.
//!
//! Scalars lift into expressions at the call boundary: any argument typed
//! `impl Into<Expr>` accepts an `i64`, `&str`, `f64`, and so on, and becomes
//! a placeholder-backed [`Expr::Value`].

use crate::dialect::PlaceholderStyle;
use crate::error::{BuildError, BuildResult};
use crate::relation::{ColumnRef, Relation};
use crate::statement::Statement;
use crate::value::{Literal, Param};

/// A SQL value expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A bound value, rendered as the placeholder marker.
    Value(Param),
    /// A qualified column reference.
    Column(ColumnRef),
    /// A unary operator applied to one operand.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// A binary operator applied to two operands.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// An associative, commutative operator over any number of operands.
    Chain { op: ChainOp, operands: Vec<Expr> },
    /// `subject BETWEEN low AND high`.
    Between {
        subject: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    /// `subject IN (item, item, ...)`.
    InValues { subject: Box<Expr>, items: Vec<Expr> },
    /// `subject IN (SELECT ...)` with a finished statement as the subquery.
    InQuery {
        subject: Box<Expr>,
        query: Box<Statement>,
    },
    /// A function call, `NAME(arg, arg, ...)`. Covers aggregates.
    Func { name: String, args: Vec<Expr> },
    /// The bare `*`, as in `COUNT(*)`. Carries no values or relations.
    Star,
    /// An expression given a different visible name.
    Aliased { expr: Box<Expr>, alias: String },
}

/// Unary SQL operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    IsNull,
    IsNotNull,
    Neg,
    Pos,
}

/// Binary SQL operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Is,
    Like,
    SimilarTo,
    Sub,
    Div,
    Mod,
    Pow,
}

impl BinaryOp {
    pub fn keyword(self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Is => "IS",
            BinaryOp::Like => "LIKE",
            BinaryOp::SimilarTo => "SIMILAR TO",
            BinaryOp::Sub => "-",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
        }
    }
}

/// Chainable SQL operators (associative and commutative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOp {
    And,
    Or,
    Add,
    Mul,
}

impl ChainOp {
    pub fn keyword(self) -> &'static str {
        match self {
            ChainOp::And => "AND",
            ChainOp::Or => "OR",
            ChainOp::Add => "+",
            ChainOp::Mul => "*",
        }
    }
}

impl Expr {
    /// A bound value with no rebinding name.
    pub fn value(value: impl Into<Literal>) -> Self {
        Expr::Value(Param::new(value))
    }

    /// A bound value addressable later through `Statement::set_param`.
    pub fn param(name: impl Into<String>, value: impl Into<Literal>) -> Self {
        Expr::Value(Param::named(name, value))
    }

    fn binary(self, op: BinaryOp, rhs: impl Into<Expr>) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs.into()),
        }
    }

    fn unary(self, op: UnaryOp) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(self),
        }
    }

    pub fn eq(self, other: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Eq, other)
    }

    pub fn ne(self, other: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Ne, other)
    }

    pub fn lt(self, other: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Lt, other)
    }

    pub fn gt(self, other: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Gt, other)
    }

    pub fn le(self, other: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Le, other)
    }

    pub fn ge(self, other: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Ge, other)
    }

    /// SQL `IS`, for comparisons where NULL must compare equal.
    pub fn is(self, other: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Is, other)
    }

    pub fn like(self, pattern: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Like, pattern)
    }

    pub fn similar_to(self, pattern: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::SimilarTo, pattern)
    }

    /// SQL `^` (exponentiation).
    pub fn pow(self, other: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Pow, other)
    }

    /// SQL unary `+`.
    pub fn pos(self) -> Self {
        self.unary(UnaryOp::Pos)
    }

    pub fn is_null(self) -> Self {
        self.unary(UnaryOp::IsNull)
    }

    pub fn is_not_null(self) -> Self {
        self.unary(UnaryOp::IsNotNull)
    }

    /// Conjunction over any number of conditions.
    pub fn and(operands: Vec<Expr>) -> Self {
        Expr::Chain {
            op: ChainOp::And,
            operands,
        }
    }

    /// Disjunction over any number of conditions.
    pub fn or(operands: Vec<Expr>) -> Self {
        Expr::Chain {
            op: ChainOp::Or,
            operands,
        }
    }

    /// `+` over any number of operands.
    pub fn sum(operands: Vec<Expr>) -> Self {
        Expr::Chain {
            op: ChainOp::Add,
            operands,
        }
    }

    /// `*` over any number of operands.
    pub fn product(operands: Vec<Expr>) -> Self {
        Expr::Chain {
            op: ChainOp::Mul,
            operands,
        }
    }

    /// A function call over the given arguments.
    pub fn func(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Func {
            name: name.into(),
            args,
        }
    }

    /// `COUNT(arg)`.
    pub fn count(arg: impl Into<Expr>) -> Self {
        Self::func("COUNT", vec![arg.into()])
    }

    /// `COUNT(*)`.
    pub fn count_all() -> Self {
        Self::func("COUNT", vec![Expr::Star])
    }

    pub fn between(self, low: impl Into<Expr>, high: impl Into<Expr>) -> Self {
        Expr::Between {
            subject: Box::new(self),
            low: Box::new(low.into()),
            high: Box::new(high.into()),
        }
    }

    pub fn in_values<I, T>(self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Expr>,
    {
        Expr::InValues {
            subject: Box::new(self),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Membership test against a finished SELECT statement.
    ///
    /// The subquery's text is embedded verbatim and its bound values are
    /// carried along after the subject's.
    pub fn in_query(self, query: Statement) -> Self {
        Expr::InQuery {
            subject: Box::new(self),
            query: Box::new(query),
        }
    }

    /// Give this expression a visible name in select output.
    ///
    /// Re-aliasing an already aliased expression replaces the alias rather
    /// than stacking a second one.
    pub fn alias(self, alias: impl Into<String>) -> Self {
        match self {
            Expr::Aliased { expr, .. } => Expr::Aliased {
                expr,
                alias: alias.into(),
            },
            other => Expr::Aliased {
                expr: Box::new(other),
                alias: alias.into(),
            },
        }
    }

    /// The visible name this expression contributes to a result row, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Expr::Column(col) => Some(col.column()),
            Expr::Aliased { alias, .. } => Some(alias),
            _ => None,
        }
    }

    /// Render this expression for use inside a clause.
    pub fn reference_sql(&self, marker: &str) -> String {
        match self {
            Expr::Value(_) => marker.to_string(),
            Expr::Column(col) => format!("{}.{}", col.qualifier(), col.column()),
            Expr::Unary { op, operand } => {
                let inner = operand.reference_sql(marker);
                match op {
                    UnaryOp::Not => format!("NOT ({inner})"),
                    UnaryOp::IsNull => format!("({inner}) IS NULL"),
                    UnaryOp::IsNotNull => format!("({inner}) IS NOT NULL"),
                    UnaryOp::Neg => format!("-({inner})"),
                    UnaryOp::Pos => format!("+({inner})"),
                }
            }
            Expr::Binary { op, lhs, rhs } => format!(
                "({}) {} ({})",
                lhs.reference_sql(marker),
                op.keyword(),
                rhs.reference_sql(marker)
            ),
            Expr::Chain { op, operands } => operands
                .iter()
                .map(|operand| format!("({})", operand.reference_sql(marker)))
                .collect::<Vec<_>>()
                .join(&format!(" {} ", op.keyword())),
            Expr::Between { subject, low, high } => format!(
                "({}) BETWEEN ({}) AND ({})",
                subject.reference_sql(marker),
                low.reference_sql(marker),
                high.reference_sql(marker)
            ),
            Expr::InValues { subject, items } => format!(
                "({}) IN ({})",
                subject.reference_sql(marker),
                items
                    .iter()
                    .map(|item| item.reference_sql(marker))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Expr::InQuery { subject, query } => {
                format!("({}) IN ({})", subject.reference_sql(marker), query.sql())
            }
            Expr::Func { name, args } => format!(
                "{}({})",
                name,
                args.iter()
                    .map(|arg| arg.reference_sql(marker))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Expr::Star => "*".to_string(),
            // Aliases only change the visible name, not the reference text.
            Expr::Aliased { expr, .. } => expr.reference_sql(marker),
        }
    }

    /// Render this expression for use in a select list.
    pub fn select_sql(&self, marker: &str) -> String {
        match self {
            Expr::Column(col) => {
                format!("{}.{} AS {}", col.qualifier(), col.column(), col.column())
            }
            Expr::Aliased { expr, alias } => {
                format!("{} AS {}", expr.reference_sql(marker), alias)
            }
            other => other.reference_sql(marker),
        }
    }

    /// The bound values of this expression, in the order their markers
    /// appear in the rendered text.
    pub fn params(&self) -> Vec<Param> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    pub(crate) fn collect_params(&self, out: &mut Vec<Param>) {
        match self {
            Expr::Value(param) => out.push(param.clone()),
            Expr::Column(_) => {}
            Expr::Unary { operand, .. } => operand.collect_params(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_params(out);
                rhs.collect_params(out);
            }
            Expr::Chain { operands, .. } => {
                for operand in operands {
                    operand.collect_params(out);
                }
            }
            Expr::Between { subject, low, high } => {
                subject.collect_params(out);
                low.collect_params(out);
                high.collect_params(out);
            }
            Expr::InValues { subject, items } => {
                subject.collect_params(out);
                for item in items {
                    item.collect_params(out);
                }
            }
            Expr::InQuery { subject, query } => {
                subject.collect_params(out);
                out.extend(query.params().iter().cloned());
            }
            Expr::Func { args, .. } => {
                for arg in args {
                    arg.collect_params(out);
                }
            }
            Expr::Star => {}
            Expr::Aliased { expr, .. } => expr.collect_params(out),
        }
    }

    /// Check that every embedded statement was rendered under the style the
    /// enclosing statement will use. Statement text is spliced verbatim, so
    /// a mismatch would mix marker spellings.
    pub(crate) fn ensure_style(&self, style: PlaceholderStyle) -> BuildResult<()> {
        match self {
            Expr::Value(_) | Expr::Column(_) | Expr::Star => Ok(()),
            Expr::Unary { operand, .. } => operand.ensure_style(style),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.ensure_style(style)?;
                rhs.ensure_style(style)
            }
            Expr::Chain { operands, .. } => {
                for operand in operands {
                    operand.ensure_style(style)?;
                }
                Ok(())
            }
            Expr::Func { args, .. } => {
                for arg in args {
                    arg.ensure_style(style)?;
                }
                Ok(())
            }
            Expr::Between { subject, low, high } => {
                subject.ensure_style(style)?;
                low.ensure_style(style)?;
                high.ensure_style(style)
            }
            Expr::InValues { subject, items } => {
                subject.ensure_style(style)?;
                for item in items {
                    item.ensure_style(style)?;
                }
                Ok(())
            }
            Expr::InQuery { subject, query } => {
                subject.ensure_style(style)?;
                if query.style() != style {
                    return Err(BuildError::PlaceholderMismatch {
                        outer: style,
                        inner: query.style(),
                    });
                }
                Ok(())
            }
            Expr::Aliased { expr, .. } => expr.ensure_style(style),
        }
    }

    /// The relations this expression touches, first occurrence order.
    pub fn relations(&self) -> Vec<Relation> {
        let mut out = Vec::new();
        self.collect_relations(&mut out);
        out
    }

    pub(crate) fn collect_relations(&self, out: &mut Vec<Relation>) {
        match self {
            Expr::Value(_) => {}
            Expr::Column(col) => {
                if !out.contains(col.relation()) {
                    out.push(col.relation().clone());
                }
            }
            Expr::Unary { operand, .. } => operand.collect_relations(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_relations(out);
                rhs.collect_relations(out);
            }
            Expr::Chain { operands, .. } => {
                for operand in operands {
                    operand.collect_relations(out);
                }
            }
            Expr::Between { subject, low, high } => {
                subject.collect_relations(out);
                low.collect_relations(out);
                high.collect_relations(out);
            }
            Expr::InValues { subject, items } => {
                subject.collect_relations(out);
                for item in items {
                    item.collect_relations(out);
                }
            }
            // The subquery brings its own FROM clause; only the subject's
            // relations belong to the enclosing statement.
            Expr::InQuery { subject, .. } => subject.collect_relations(out),
            Expr::Func { args, .. } => {
                for arg in args {
                    arg.collect_relations(out);
                }
            }
            Expr::Star => {}
            Expr::Aliased { expr, .. } => expr.collect_relations(out),
        }
    }
}

impl From<Param> for Expr {
    fn from(param: Param) -> Self {
        Expr::Value(param)
    }
}

impl From<Literal> for Expr {
    fn from(value: Literal) -> Self {
        Expr::Value(Param::new(value))
    }
}

macro_rules! expr_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(value: $ty) -> Self {
                    Expr::Value(Param::new(value))
                }
            }
        )*
    };
}

expr_from_scalar!(bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, &str, String, Vec<u8>);

impl<R: Into<Expr>> std::ops::Add<R> for Expr {
    type Output = Expr;

    fn add(self, rhs: R) -> Expr {
        Expr::Chain {
            op: ChainOp::Add,
            operands: vec![self, rhs.into()],
        }
    }
}

impl<R: Into<Expr>> std::ops::Mul<R> for Expr {
    type Output = Expr;

    fn mul(self, rhs: R) -> Expr {
        Expr::Chain {
            op: ChainOp::Mul,
            operands: vec![self, rhs.into()],
        }
    }
}

impl<R: Into<Expr>> std::ops::Sub<R> for Expr {
    type Output = Expr;

    fn sub(self, rhs: R) -> Expr {
        self.binary(BinaryOp::Sub, rhs)
    }
}

impl<R: Into<Expr>> std::ops::Div<R> for Expr {
    type Output = Expr;

    fn div(self, rhs: R) -> Expr {
        self.binary(BinaryOp::Div, rhs)
    }
}

impl<R: Into<Expr>> std::ops::Rem<R> for Expr {
    type Output = Expr;

    fn rem(self, rhs: R) -> Expr {
        self.binary(BinaryOp::Mod, rhs)
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.unary(UnaryOp::Neg)
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        self.unary(UnaryOp::Not)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Table;
    use crate::value::Literal;

    fn tracks() -> Table {
        Table::new("track", ["TrackId", "Name", "Composer", "Milliseconds"]).unwrap()
    }

    #[test]
    fn value_renders_as_marker() {
        let expr = Expr::value(42i64);
        assert_eq!(expr.reference_sql("?"), "?");
        assert_eq!(expr.reference_sql("%s"), "%s");
        assert_eq!(expr.params().len(), 1);
    }

    #[test]
    fn comparison_parenthesizes_operands() {
        let tbl = tracks();
        let expr = tbl.column("Name").unwrap().eq("Bohemian Rhapsody");
        assert_eq!(expr.reference_sql("?"), "(track.Name) = (?)");
    }

    #[test]
    fn chain_joins_parenthesized_operands() {
        let tbl = tracks();
        let expr = Expr::or(vec![
            tbl.column("Composer").unwrap().is_null(),
            tbl.column("Milliseconds").unwrap().gt(300_000i64),
        ]);
        assert_eq!(
            expr.reference_sql("?"),
            "((track.Composer) IS NULL) OR ((track.Milliseconds) > (?))"
        );
    }

    #[test]
    fn params_collected_left_to_right() {
        let tbl = tracks();
        let expr = Expr::and(vec![
            tbl.column("Milliseconds").unwrap().gt(100i64),
            tbl.column("Milliseconds").unwrap().lt(200i64),
        ]);
        let values: Vec<Literal> = expr.params().iter().map(|p| p.value().clone()).collect();
        assert_eq!(values, vec![Literal::Integer(100), Literal::Integer(200)]);
    }

    #[test]
    fn between_renders_three_operands() {
        let tbl = tracks();
        let expr = tbl
            .column("Milliseconds")
            .unwrap()
            .between(100i64, 200i64);
        assert_eq!(
            expr.reference_sql("?"),
            "(track.Milliseconds) BETWEEN (?) AND (?)"
        );
        assert_eq!(expr.params().len(), 2);
    }

    #[test]
    fn in_values_renders_marker_list() {
        let tbl = tracks();
        let expr = tbl.column("TrackId").unwrap().in_values([1i64, 2, 3]);
        assert_eq!(expr.reference_sql("?"), "(track.TrackId) IN (?, ?, ?)");
        assert_eq!(expr.params().len(), 3);
    }

    #[test]
    fn arithmetic_operators_build_expressions() {
        let tbl = tracks();
        let ms = tbl.column("Milliseconds").unwrap();
        let expr = ms / 1000i64;
        assert_eq!(expr.reference_sql("?"), "(track.Milliseconds) / (?)");

        let tbl = tracks();
        let expr = -(tbl.column("Milliseconds").unwrap());
        assert_eq!(expr.reference_sql("?"), "-(track.Milliseconds)");
    }

    #[test]
    fn not_operator_prefixes_keyword() {
        let tbl = tracks();
        let expr = !tbl.column("Composer").unwrap().is_null();
        assert_eq!(expr.reference_sql("?"), "NOT ((track.Composer) IS NULL)");
    }

    #[test]
    fn column_select_field_carries_name() {
        let tbl = tracks();
        let expr = tbl.column("Name").unwrap();
        assert_eq!(expr.select_sql("?"), "track.Name AS Name");
        assert_eq!(expr.name(), Some("Name"));
    }

    #[test]
    fn alias_changes_visible_name() {
        let tbl = tracks();
        let expr = tbl.column("Name").unwrap().alias("TrackName");
        assert_eq!(expr.select_sql("?"), "track.Name AS TrackName");
        assert_eq!(expr.name(), Some("TrackName"));
    }

    #[test]
    fn realiasing_replaces_rather_than_stacks() {
        let tbl = tracks();
        let expr = tbl
            .column("Name")
            .unwrap()
            .alias("First")
            .alias("Second");
        assert_eq!(expr.select_sql("?"), "track.Name AS Second");
    }

    #[test]
    fn anonymous_operator_has_no_name() {
        let expr = Expr::value(1i64).eq(1i64);
        assert_eq!(expr.name(), None);
    }

    #[test]
    fn function_call_renders_arguments() {
        let tbl = tracks();
        let expr = Expr::count(tbl.column("TrackId").unwrap());
        assert_eq!(expr.reference_sql("?"), "COUNT(track.TrackId)");
        assert_eq!(expr.relations().len(), 1);

        let expr = Expr::func("COALESCE", vec![
            tracks().column("Composer").unwrap(),
            Expr::value("unknown"),
        ]);
        assert_eq!(expr.reference_sql("?"), "COALESCE(track.Composer, ?)");
        assert_eq!(expr.params().len(), 1);
    }

    #[test]
    fn count_all_renders_star() {
        let expr = Expr::count_all();
        assert_eq!(expr.reference_sql("?"), "COUNT(*)");
        assert!(expr.params().is_empty());
        assert!(expr.relations().is_empty());
    }

    #[test]
    fn relations_deduplicated_in_order() {
        let tbl = tracks();
        let expr = Expr::and(vec![
            tbl.column("Name").unwrap().like("%a%"),
            tbl.column("Composer").unwrap().is_not_null(),
        ]);
        assert_eq!(expr.relations().len(), 1);
    }
}

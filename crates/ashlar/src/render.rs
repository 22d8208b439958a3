//! Shared clause rendering.

use crate::expr::Expr;
use crate::value::Param;

/// Append a predicate clause (WHERE or HAVING) to `sql`.
///
/// Conditions render in order, joined as a conjunction, and their bound
/// values are appended to `params` in the same order, keeping marker
/// position and parameter position in lockstep.
pub(crate) fn push_predicates(
    sql: &mut String,
    params: &mut Vec<Param>,
    prefix: &str,
    separator: &str,
    conditions: &[Expr],
    marker: &str,
) {
    if conditions.is_empty() {
        return;
    }
    sql.push_str(prefix);
    sql.push_str(
        &conditions
            .iter()
            .map(|cond| cond.reference_sql(marker))
            .collect::<Vec<_>>()
            .join(separator),
    );
    for cond in conditions {
        cond.collect_params(params);
    }
}

pub(crate) const WHERE_PREFIX: &str = "\nWHERE ";
pub(crate) const WHERE_SEPARATOR: &str = "\n  AND ";
pub(crate) const HAVING_PREFIX: &str = "\nHAVING ";
pub(crate) const HAVING_SEPARATOR: &str = "\n   AND ";

//! Result row shapes and by-name access.

use crate::error::{BuildError, BuildResult};
use crate::expr::Expr;
use crate::value::Literal;

/// The resolved output names of a statement, in select-list order.
///
/// Each select expression contributes its alias if it has one, its column
/// name if it is a plain column, and a synthesized `column_N` name (1-based,
/// matching SQL column numbering) otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowShape {
    names: Vec<String>,
}

impl RowShape {
    pub(crate) fn from_select(exprs: &[Expr]) -> Self {
        let names = exprs
            .iter()
            .enumerate()
            .map(|(i, expr)| match expr.name() {
                Some(name) => name.to_string(),
                None => format!("column_{}", i + 1),
            })
            .collect();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The position of the first output with this name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Wrap a positional row in this shape, checking the width.
    pub fn record(&self, values: Vec<Literal>) -> BuildResult<Record> {
        if values.len() != self.names.len() {
            return Err(BuildError::ShapeMismatch {
                expected: self.names.len(),
                got: values.len(),
            });
        }
        Ok(Record {
            shape: self.clone(),
            values,
        })
    }
}

/// One result row, addressable by position or output name.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    shape: RowShape,
    values: Vec<Literal>,
}

impl Record {
    pub fn shape(&self) -> &RowShape {
        &self.shape
    }

    pub fn values(&self) -> &[Literal] {
        &self.values
    }

    pub fn at(&self, index: usize) -> Option<&Literal> {
        self.values.get(index)
    }

    /// The value under the given output name, if the shape has it.
    pub fn get(&self, name: &str) -> Option<&Literal> {
        self.shape.position(name).and_then(|i| self.values.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::Table;

    #[test]
    fn shape_names_from_select_list() {
        let tbl = Table::new("genre", ["GenreId", "Name"]).unwrap();
        let exprs = vec![
            tbl.column("GenreId").unwrap(),
            tbl.column("Name").unwrap().alias("GenreName"),
            Expr::value(1i64).eq(1i64),
        ];
        let shape = RowShape::from_select(&exprs);
        assert_eq!(shape.names(), ["GenreId", "GenreName", "column_3"]);
    }

    #[test]
    fn record_access_by_name_and_position() {
        let tbl = Table::new("genre", ["GenreId", "Name"]).unwrap();
        let exprs = vec![tbl.column("GenreId").unwrap(), tbl.column("Name").unwrap()];
        let shape = RowShape::from_select(&exprs);

        let record = shape
            .record(vec![Literal::Integer(1), Literal::Text("Rock".into())])
            .unwrap();
        assert_eq!(record.get("Name"), Some(&Literal::Text("Rock".into())));
        assert_eq!(record.at(0), Some(&Literal::Integer(1)));
        assert_eq!(record.get("Missing"), None);
    }

    #[test]
    fn record_rejects_wrong_width() {
        let tbl = Table::new("genre", ["GenreId", "Name"]).unwrap();
        let shape = RowShape::from_select(&[tbl.column("GenreId").unwrap()]);
        let err = shape
            .record(vec![Literal::Integer(1), Literal::Integer(2)])
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::ShapeMismatch {
                expected: 1,
                got: 2
            }
        ));
    }
}

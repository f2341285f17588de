use crate::error::{Error, Result};
use crate::util::VecExt;

/// A CSV table held column-wise, in file column order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Table {
            headers: Default::default(),
            columns: Default::default(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn position(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
            })
    }

    pub fn column(&self, index: usize) -> Result<&Column> {
        self.columns.get(index).ok_or_else(|| Error::MissingColumn {
            column: format!("#{}", index),
        })
    }

    /// Numeric values of column `index`, or `NonNumericColumn` for text columns.
    pub fn floats(&self, index: usize) -> Result<&[f64]> {
        match self.column(index)? {
            Column::Float(values) => Ok(values),
            Column::Text(_) => Err(Error::NonNumericColumn {
                column: self.headers[index].clone(),
            }),
        }
    }

    pub fn partition<F>(&self, mut predicate: F) -> (Self, Self)
    where
        F: FnMut(usize) -> bool,
    {
        let mut left = Self::new();
        let mut right = Self::new();
        left.headers = self.headers.clone();
        right.headers = self.headers.clone();

        for column in &self.columns {
            let (left_col, right_col) = column.partition(&mut predicate);
            left.columns.push(left_col);
            right.columns.push(right_col);
        }
        (left, right)
    }

    /// Keeps only the rows for which `predicate` holds.
    pub fn retain_rows<F>(&mut self, predicate: F)
    where
        F: FnMut(usize) -> bool,
    {
        let (kept, _) = self.partition(predicate);
        *self = kept;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<f64>),

    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(data) => data.len(),
            Column::Text(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn partition<F>(&self, predicate: F) -> (Self, Self)
    where
        F: FnMut(usize) -> bool,
    {
        match self {
            Column::Float(data) => {
                let (left, right) = data.partition_by_index(predicate);
                (Column::Float(left), Column::Float(right))
            }
            Column::Text(data) => {
                let (left, right) = data.partition_by_index(predicate);
                (Column::Text(left), Column::Text(right))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table {
            headers: vec!["name".into(), "value".into()],
            columns: vec![
                Column::Text(vec!["a".into(), "b".into(), "c".into()]),
                Column::Float(vec![1.0, 7.0, 3.0]),
            ],
        }
    }

    #[test]
    fn retain_rows_filters_every_column() {
        let mut t = table();
        let values = t.floats(1).unwrap().to_vec();
        t.retain_rows(|i| values[i] < 5.0);
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.columns[0], Column::Text(vec!["a".into(), "c".into()]));
        assert_eq!(t.columns[1], Column::Float(vec![1.0, 3.0]));
    }

    #[test]
    fn text_column_is_not_numeric() {
        let t = table();
        assert!(matches!(t.floats(0), Err(Error::NonNumericColumn { .. })));
        assert!(matches!(t.position("missing"), Err(Error::MissingColumn { .. })));
    }
}

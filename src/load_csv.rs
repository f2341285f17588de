use crate::dataset::*;
use crate::error::{Error, Result};
use memmap::Mmap;
use std::fs::File;
use std::path::Path;

impl Table {
    /// Maps the file into memory and parses it as CSV with a header row.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        if file.metadata()?.len() == 0 {
            return Err(Error::EmptyDataset);
        }
        // The mapping is read-only and dropped before this function returns.
        let mmap = unsafe { Mmap::map(&file)? };
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(&mmap[..]);
        Self::from_csv(rdr)
    }

    pub fn from_csv<R>(mut rdr: csv::Reader<R>) -> Result<Self>
    where
        R: std::io::Read,
    {
        let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
        let records = rdr
            .records()
            .collect::<std::result::Result<Vec<csv::StringRecord>, _>>()?;

        let mut builders: Vec<ColumnBuilder> = headers
            .iter()
            .map(|_| ColumnBuilder::with_capacity(records.len()))
            .collect();
        for record in &records {
            for (index, builder) in builders.iter_mut().enumerate() {
                builder.append(record.get(index).unwrap_or(""));
            }
        }

        Ok(Table {
            headers,
            columns: builders.into_iter().map(ColumnBuilder::build).collect(),
        })
    }
}

/// Empty cells are missing values; anything else must parse as a number.
pub(crate) fn parse_f64(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.parse().ok()
}

/// Collects raw cells and parses them while every cell so far is numeric.
/// The first non-numeric cell turns the column into text.
struct ColumnBuilder {
    raw: Vec<String>,
    floats: Option<Vec<f64>>,
}

impl ColumnBuilder {
    fn with_capacity(capacity: usize) -> Self {
        ColumnBuilder {
            raw: Vec::with_capacity(capacity),
            floats: Some(Vec::with_capacity(capacity)),
        }
    }

    fn append(&mut self, value: &str) {
        if let Some(floats) = &mut self.floats {
            match parse_f64(value) {
                Some(v) => floats.push(v),
                None => self.floats = None,
            }
        }
        self.raw.push(value.to_string());
    }

    fn build(self) -> Column {
        match self.floats {
            Some(floats) => Column::Float(floats),
            None => Column::Text(self.raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(data: &str) -> Table {
        Table::from_csv(csv::Reader::from_reader(data.as_bytes())).unwrap()
    }

    #[test]
    fn test_reader() {
        let table = read("a,b,c\nfoo,1.5,2\nqux,-3,\n");
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(
            table.columns[0],
            Column::Text(vec!["foo".into(), "qux".into()])
        );
        assert_eq!(table.columns[1], Column::Float(vec![1.5, -3.0]));
        match &table.columns[2] {
            Column::Float(values) => {
                assert_eq!(values[0], 2.0);
                assert!(values[1].is_nan());
            }
            other => panic!("expected Float, got {:?}", other),
        }
    }

    #[test]
    fn late_text_value_makes_column_text() {
        let table = read("heap\n100\n2g\n");
        assert_eq!(
            table.columns[0],
            Column::Text(vec!["100".into(), "2g".into()])
        );
    }

    #[test]
    fn quoted_fields_with_commas() {
        let table = read("Name,Error %\n\"a, b\",0.5\n");
        assert_eq!(table.columns[0], Column::Text(vec!["a, b".into()]));
        assert_eq!(table.position("Error %").unwrap(), 1);
    }

    #[test]
    fn ragged_rows_are_an_error() {
        let result = Table::from_csv(csv::Reader::from_reader("a,b\n1\n".as_bytes()));
        assert!(matches!(result, Err(Error::Csv(_))));
    }
}

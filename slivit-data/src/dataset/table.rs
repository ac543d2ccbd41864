use crate::common::*;

/// An immutable CSV table with named columns, loaded once and kept in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    path: PathBuf,
    headers: IndexSet<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(Error::configuration(format!(
                "the table file '{}' does not exist",
                path.display()
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .comment(Some(b'#'))
            .from_path(path)?;

        let raw_headers = reader.headers()?.clone();
        let headers: IndexSet<String> = raw_headers.iter().map(ToOwned::to_owned).collect();
        if headers.len() != raw_headers.len() {
            return Err(Error::configuration(format!(
                "duplicated column names found in '{}'",
                path.display()
            )));
        }
        if headers.is_empty() {
            return Err(Error::configuration(format!(
                "no columns found in '{}'",
                path.display()
            )));
        }

        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|record| -> Result<_> {
                let row: Vec<String> = record?.iter().map(ToOwned::to_owned).collect();
                Ok(row)
            })
            .try_collect()?;

        Ok(Self {
            path: path.to_owned(),
            headers,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The ordered set of column names.
    pub fn headers(&self) -> &IndexSet<String> {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Get the cell at `row` under the named column, if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.headers.get_index_of(column)?;
        let cell = self.rows.get(row)?.get(col)?;
        Some(cell.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Write as _};

    fn write_table(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("slivit-table-{}-{}", std::process::id(), name));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_table_test() {
        let path = write_table(
            "basic.csv",
            "sample_id,laterality\n\
             s0,OD\n\
             s1,OS\n",
        );

        let table = CsvTable::open(&path).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert!(table.has_column("laterality"));
        assert_eq!(table.get(1, "sample_id"), Some("s1"));
        assert_eq!(table.get(2, "sample_id"), None);
        assert_eq!(table.get(0, "no_such_column"), None);
    }

    #[test]
    fn duplicated_column_test() {
        let path = write_table("dup.csv", "sample_id,p,p\ns0,1,2\n");
        let err = CsvTable::open(&path).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn missing_table_test() {
        let err = CsvTable::open("/no/such/table.csv").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }
}

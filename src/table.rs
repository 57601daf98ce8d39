//! In-memory CSV dataset used by the filter pipeline

use crate::errors::TableError;
use csv::StringRecord;
use std::fmt;

/// Ordered rows under one header. Values keep their original text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dataset {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Dataset {
    pub fn new(headers: StringRecord, rows: Vec<StringRecord>) -> Self {
        Self { headers, rows }
    }

    /// Parse comma-delimited UTF-8 bytes with a header row.
    ///
    /// # Errors
    ///
    /// Returns `TableError::Csv` for invalid UTF-8 or rows whose field count
    /// differs from the header.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let mut headers = reader.headers()?.clone();
        if let Some(first) = headers.get(0)
            && let Some(stripped) = first.strip_prefix('\u{feff}')
        {
            let mut cleaned = StringRecord::new();
            cleaned.push_field(stripped);
            headers.iter().skip(1).for_each(|h| cleaned.push_field(h));
            headers = cleaned;
        }

        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    /// Serialize back to CSV: header first, no index column.
    ///
    /// # Errors
    ///
    /// Returns `TableError::Csv` if a record cannot be written.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, TableError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| TableError::Csv(csv::Error::from(e.into_error())))
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// # Errors
    ///
    /// Returns `TableError::MissingColumn` if no header equals `name`.
    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Keep the rows whose numeric `column` satisfies `keep`, preserving order.
    ///
    /// Empty cells count as missing numbers and are dropped. A cell holding
    /// only whitespace is not empty and fails as non-numeric.
    ///
    /// # Errors
    ///
    /// Returns `TableError::MissingColumn` if the column is absent, or
    /// `TableError::NotNumeric` for the first cell that is not a number.
    pub fn filter_numeric<F>(&self, column: &str, keep: F) -> Result<Dataset, TableError>
    where
        F: Fn(f64) -> bool,
    {
        let idx = self.column_index(column)?;
        let mut kept = Vec::new();

        for (n, row) in self.rows.iter().enumerate() {
            let raw = row.get(idx).unwrap_or_default();
            if raw.is_empty() {
                continue;
            }
            let value: f64 = raw.trim().parse().map_err(|_| TableError::NotNumeric {
                // header is line 1
                row: row.position().map_or(n + 2, |p| p.line() as usize),
                column: column.to_string(),
                value: raw.to_string(),
            })?;
            if keep(value) {
                kept.push(row.clone());
            }
        }

        Ok(Dataset::new(self.headers.clone(), kept))
    }

    /// Rows whose `column` is strictly below `threshold`.
    ///
    /// # Errors
    ///
    /// Same as [`Dataset::filter_numeric`].
    pub fn retain_below(&self, column: &str, threshold: f64) -> Result<Dataset, TableError> {
        self.filter_numeric(column, |v| v < threshold)
    }
}

impl fmt::Display for Dataset {
    /// Column-aligned preview, one line per row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, field) in row.iter().enumerate() {
                let len = field.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }

        let render = |record: &StringRecord| {
            record
                .iter()
                .zip(widths.iter().copied())
                .map(|(field, w)| format!("{field:<w$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        writeln!(f, "{}", render(&self.headers))?;
        if self.rows.is_empty() {
            return write!(f, "(no rows)");
        }
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", render(row))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_byte_order_mark_from_first_header() {
        let data = Dataset::from_csv_bytes("\u{feff}value,name\n1,a\n".as_bytes()).unwrap();
        assert_eq!(data.column_index("value").unwrap(), 0);
    }

    #[test]
    fn empty_cells_are_dropped_not_rejected() {
        let data = Dataset::from_csv_bytes(b"id,value\n1,\n2,3\n").unwrap();
        let kept = data.retain_below("value", 50.0).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.rows()[0].get(0), Some("2"));
    }

    #[test]
    fn reports_line_of_bad_value() {
        let data = Dataset::from_csv_bytes(b"id,value\n1,5\n2,abc\n").unwrap();
        match data.retain_below("value", 50.0) {
            Err(TableError::NotNumeric { row, value, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(value, "abc");
            }
            other => panic!("expected NotNumeric, got {other:?}"),
        }
    }
}

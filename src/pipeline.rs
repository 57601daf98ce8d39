use crate::domain::TransformReport;
use crate::errors::StorageError;
use crate::ports::ObjectStore;
use crate::table::Dataset;
use crate::utils::log_utils::Logger;

pub const DEFAULT_FILTER_COLUMN: &str = "value";
pub const DEFAULT_THRESHOLD: f64 = 50.0;
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Rows shown in the "Filtered data" preview before the rest is summarized.
const PREVIEW_ROWS: usize = 20;

/// Which rows survive: those where `column` is strictly below `below`.
#[derive(Clone, Debug, PartialEq)]
pub struct RowFilter {
    pub column: String,
    pub below: f64,
}

impl Default for RowFilter {
    fn default() -> Self {
        Self {
            column: DEFAULT_FILTER_COLUMN.to_string(),
            below: DEFAULT_THRESHOLD,
        }
    }
}

impl RowFilter {
    /// # Errors
    ///
    /// Returns the dataset's `MissingColumn` or `NotNumeric` error.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset, StorageError> {
        Ok(dataset.retain_below(&self.column, self.below)?)
    }
}

/// Download a CSV object, keep the matching rows, and upload the result.
///
/// The output is produced fully in memory and stored with one request, so it is
/// either written whole or not at all. Nothing is uploaded if parsing fails.
///
/// # Errors
///
/// `NotFound` for a missing input, `Parse` for bad CSV or a missing/non-numeric
/// filter column, `Transfer` for service failures.
pub fn transform(
    store: &dyn ObjectStore,
    bucket: &str,
    input_key: &str,
    output_key: &str,
    filter: &RowFilter,
    logger: &Logger,
) -> Result<TransformReport, StorageError> {
    logger.normal(&format!("Downloading {input_key}..."));
    let content = store.get_object(bucket, input_key)?;
    logger.debug(&format!("Read {} bytes from {bucket}/{input_key}", content.len()));

    let dataset = Dataset::from_csv_bytes(&content)?;
    let filtered = filter.apply(&dataset)?;
    print_preview(&filtered, logger);

    let body = filtered.to_csv_bytes()?;
    let report = TransformReport {
        rows_read: dataset.len(),
        rows_kept: filtered.len(),
        bytes_written: body.len(),
    };

    logger.normal(&format!("Uploading to {output_key}..."));
    store.put_object(bucket, output_key, body, Some(CSV_CONTENT_TYPE.to_string()))?;
    logger.normal("File processed and uploaded successfully!");
    logger.info(&format!(
        "Kept {} of {} row(s), {} bytes written",
        report.rows_kept, report.rows_read, report.bytes_written
    ));

    Ok(report)
}

fn print_preview(filtered: &Dataset, logger: &Logger) {
    logger.normal("Filtered data:");
    let shown = filtered.rows().iter().take(PREVIEW_ROWS).cloned().collect();
    let preview = Dataset::new(filtered.headers().clone(), shown);
    for line in preview.to_string().lines() {
        logger.normal(line);
    }
    if filtered.len() > PREVIEW_ROWS {
        logger.normal(&format!("... {} more row(s)", filtered.len() - PREVIEW_ROWS));
    }
}

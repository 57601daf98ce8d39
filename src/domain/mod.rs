use crate::errors::StorageError;
use serde::Serialize;

/// Fallback local filename when an object key has no basename.
pub const FALLBACK_FILENAME: &str = "downloaded_file";

/// A `bucket/key` pair parsed from a single path string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectPath {
    pub bucket: String,
    pub key: String,
}

impl ObjectPath {
    /// Split `bucket/path/to/key` on the first `/`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::PathFormat` when there is no `/`, or when either
    /// the bucket or the key part is empty.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let (bucket, key) = raw
            .split_once('/')
            .ok_or_else(|| StorageError::PathFormat(raw.to_string()))?;
        if bucket.is_empty() || key.is_empty() {
            return Err(StorageError::PathFormat(raw.to_string()));
        }
        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    /// Last segment of the key, or `None` when the key ends with `/`.
    pub fn basename(&self) -> Option<&str> {
        self.key.rsplit('/').next().filter(|name| !name.is_empty())
    }
}

impl std::fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// One `ListObjectsV2` style page request.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ListRequest {
    pub bucket: String,
    pub delimiter: Option<String>,
    pub continuation_token: Option<String>,
}

impl ListRequest {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            ..Default::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = Some(delimiter.to_string());
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.continuation_token = token;
        self
    }
}

/// One page of a listing. `next_token` is `None` on the last page.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ListPage {
    pub keys: Vec<String>,
    pub common_prefixes: Vec<String>,
    pub next_token: Option<String>,
}

/// Token for the following request, or `None` when paging should stop.
///
/// A missing, empty or repeated token ends the walk, so a service that keeps
/// echoing the same token cannot loop a caller forever.
pub fn advance_token(previous: Option<&str>, returned: Option<&str>) -> Option<String> {
    returned
        .filter(|next| !next.is_empty() && Some(*next) != previous)
        .map(str::to_string)
}

/// Result of one bulk delete call.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DeleteBatch {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Totals for a whole `clear_bucket` run.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize)]
pub struct ClearReport {
    pub deleted: usize,
    pub failed: Vec<(String, String)>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize)]
pub struct TransformReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub bytes_written: usize,
}

/// Public URL layout for OCI object storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
pub enum UrlStyle {
    /// `https://objectstorage.REGION.oraclecloud.com/n/NS/b/BUCKET/o/KEY`
    Legacy,
    /// `https://NS.objectstorage.REGION.oci.customer-oci.com/n/NS/b/BUCKET/o/KEY`
    Oci2024,
}

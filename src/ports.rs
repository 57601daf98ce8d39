use crate::domain::{DeleteBatch, ListPage, ListRequest};
use crate::errors::StorageError;
use mockall::automock;
use std::path::Path;

/// Blocking object-storage operations every command is written against.
///
/// `S3StorageClient` talks to a real service; `InMemoryStore` backs tests.
#[automock]
pub trait ObjectStore: Send + Sync {
    fn list_buckets(&self) -> Result<Vec<String>, StorageError>;

    /// Fetch a single listing page.
    fn list_objects_page(&self, request: &ListRequest) -> Result<ListPage, StorageError>;

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<(), StorageError>;

    /// Stream a local file into `bucket/key`.
    fn upload_path(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), StorageError>;

    /// Delete one key. Absent keys are not an error.
    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    /// Bulk delete. Callers keep batches within the service limit.
    fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<DeleteBatch, StorageError>;

    fn presign_get(&self, bucket: &str, key: &str, expires_in_secs: u64)
    -> Result<String, StorageError>;

    /// Endpoint URL the store was configured with.
    fn endpoint(&self) -> String;
}

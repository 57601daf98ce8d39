use crate::domain::{DeleteBatch, ListPage, ListRequest};
use crate::errors::StorageError;
use crate::ports::ObjectStore;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Same ceiling the S3 API puts on a listing page and on presign expiry.
pub const DEFAULT_PAGE_SIZE: usize = 1000;
const MAX_PRESIGN_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Default)]
struct State {
    buckets: BTreeMap<String, BTreeMap<String, StoredObject>>,
    protected: BTreeSet<(String, String)>,
}

/// Object store kept entirely in memory.
///
/// Listing honours continuation tokens and a configurable page size so paging
/// code can be exercised without a service.
pub struct InMemoryStore {
    state: Mutex<State>,
    page_size: usize,
    endpoint: String,
}

impl InMemoryStore {
    pub fn new(endpoint: &str) -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: DEFAULT_PAGE_SIZE,
            endpoint: endpoint.to_string(),
        }
    }

    /// Cap every listing page at `page_size` entries (minimum 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.state().buckets.entry(bucket.to_string()).or_default();
    }

    /// Store an object, creating the bucket if needed.
    pub fn insert(&self, bucket: &str, key: &str, body: &[u8]) {
        self.state()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(
                key.to_string(),
                StoredObject {
                    body: body.to_vec(),
                    content_type: None,
                },
            );
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.state()
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
    }

    /// Make bulk deletes report a failure for this key.
    pub fn protect(&self, bucket: &str, key: &str) {
        self.state()
            .protected
            .insert((bucket.to_string(), key.to_string()));
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn missing_bucket(bucket: &str) -> StorageError {
    StorageError::NotFound(format!("bucket {bucket}"))
}

impl ObjectStore for InMemoryStore {
    fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.state().buckets.keys().cloned().collect())
    }

    fn list_objects_page(&self, request: &ListRequest) -> Result<ListPage, StorageError> {
        let state = self.state();
        let objects = state
            .buckets
            .get(&request.bucket)
            .ok_or_else(|| missing_bucket(&request.bucket))?;

        let start = match &request.continuation_token {
            Some(token) => Bound::Excluded(token.clone()),
            None => Bound::Unbounded,
        };
        // A token ending in the delimiter stands for a rolled-up prefix
        let skip_prefix = request
            .continuation_token
            .as_ref()
            .zip(request.delimiter.as_ref())
            .filter(|(token, delim)| token.ends_with(delim.as_str()))
            .map(|(token, _)| token.clone());

        let mut page = ListPage::default();
        let mut emitted = 0;
        let mut last_entry: Option<String> = None;
        let mut truncated = false;

        for key in objects.range((start, Bound::Unbounded)).map(|(k, _)| k) {
            if skip_prefix.as_ref().is_some_and(|p| key.starts_with(p.as_str())) {
                continue;
            }
            let rolled_up = request
                .delimiter
                .as_ref()
                .and_then(|d| key.find(d.as_str()).map(|idx| key[..idx + d.len()].to_string()));
            if rolled_up.is_some() && page.common_prefixes.last() == rolled_up.as_ref() {
                continue;
            }

            if emitted == self.page_size {
                truncated = true;
                break;
            }
            let entry = match rolled_up {
                Some(prefix) => {
                    page.common_prefixes.push(prefix.clone());
                    prefix
                }
                None => {
                    page.keys.push(key.clone());
                    key.clone()
                }
            };
            last_entry = Some(entry);
            emitted += 1;
        }

        if truncated {
            page.next_token = last_entry;
        }
        Ok(page)
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let state = self.state();
        let objects = state.buckets.get(bucket).ok_or_else(|| missing_bucket(bucket))?;
        objects
            .get(key)
            .map(|o| o.body.clone())
            .ok_or_else(|| StorageError::NotFound(format!("{bucket}/{key}")))
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<(), StorageError> {
        let mut state = self.state();
        let objects = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| missing_bucket(bucket))?;
        objects.insert(key.to_string(), StoredObject { body, content_type });
        Ok(())
    }

    fn upload_path(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let body = std::fs::read(local_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::LocalFileMissing(local_path.to_path_buf()),
            _ => StorageError::Io(e),
        })?;
        self.put_object(bucket, key, body, None)
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let mut state = self.state();
        let objects = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| missing_bucket(bucket))?;
        objects.remove(key);
        Ok(())
    }

    fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<DeleteBatch, StorageError> {
        let mut state = self.state();
        let State { buckets, protected } = &mut *state;
        let objects = buckets.get_mut(bucket).ok_or_else(|| missing_bucket(bucket))?;

        let mut batch = DeleteBatch::default();
        for key in keys {
            if protected.contains(&(bucket.to_string(), key.clone())) {
                batch.failed.push((key, "AccessDenied".to_string()));
                continue;
            }
            objects.remove(&key);
            batch.deleted.push(key);
        }
        Ok(batch)
    }

    fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in_secs: u64,
    ) -> Result<String, StorageError> {
        if expires_in_secs == 0 || expires_in_secs > MAX_PRESIGN_SECS {
            return Err(StorageError::Presign(format!(
                "invalid expiry: {expires_in_secs} seconds"
            )));
        }
        Ok(format!(
            "{}/{bucket}/{key}?X-Amz-Expires={expires_in_secs}",
            self.endpoint.trim_end_matches('/')
        ))
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

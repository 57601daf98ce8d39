use crate::domain::{ClearReport, ListPage, ListRequest, advance_token};
use crate::errors::StorageError;
use crate::ports::ObjectStore;
use crate::utils::log_utils::Logger;

/// Most keys the service accepts in one bulk delete.
pub const MAX_DELETE_BATCH: usize = 1000;

/// Walk every page of a listing, handing each to `on_page` before fetching the next.
///
/// # Errors
///
/// Stops at the first store error or error returned by `on_page`.
pub fn for_each_page<F>(
    store: &dyn ObjectStore,
    request: ListRequest,
    mut on_page: F,
) -> Result<(), StorageError>
where
    F: FnMut(ListPage) -> Result<(), StorageError>,
{
    let mut request = request;
    loop {
        let mut page = store.list_objects_page(&request)?;
        let next = page.next_token.take();
        on_page(page)?;

        match advance_token(request.continuation_token.as_deref(), next.as_deref()) {
            Some(token) => request = request.with_token(Some(token)),
            None => return Ok(()),
        }
    }
}

/// Names of every bucket the credentials can see.
///
/// # Errors
///
/// Returns the store error; an empty `Ok` means there really are no buckets.
pub fn list_buckets(store: &dyn ObjectStore, logger: &Logger) -> Result<Vec<String>, StorageError> {
    let buckets = store.list_buckets()?;
    logger.items(&format!("Found {} bucket(s):", buckets.len()), &buckets);
    Ok(buckets)
}

/// Root-level folders (common prefixes on `/`), without the trailing slash.
///
/// # Errors
///
/// Returns the store error, e.g. `NotFound` for a missing bucket.
pub fn list_folders(
    store: &dyn ObjectStore,
    bucket: &str,
    logger: &Logger,
) -> Result<Vec<String>, StorageError> {
    let mut folders = Vec::new();
    for_each_page(store, ListRequest::new(bucket).with_delimiter("/"), |page| {
        folders.extend(
            page.common_prefixes
                .into_iter()
                .map(|p| p.trim_end_matches('/').to_string()),
        );
        Ok(())
    })?;

    logger.items(&format!("Root folders in '{bucket}':"), &folders);
    Ok(folders)
}

/// Every key in the bucket, fetched one page at a time.
///
/// # Errors
///
/// Returns the store error, e.g. `NotFound` for a missing bucket.
pub fn list_files(
    store: &dyn ObjectStore,
    bucket: &str,
    logger: &Logger,
) -> Result<Vec<String>, StorageError> {
    let mut files = Vec::new();
    let mut pages = 0;
    for_each_page(store, ListRequest::new(bucket), |page| {
        pages += 1;
        files.extend(page.keys);
        Ok(())
    })?;

    logger.debug(&format!("Listed '{bucket}' in {pages} page(s)"));
    logger.items(
        &format!("Files in '{bucket}' ({} total):", files.len()),
        &files,
    );
    Ok(files)
}

/// Delete every object in the bucket with one bulk request per listed page.
///
/// Keys the service refuses to delete are reported, not retried.
///
/// # Errors
///
/// Returns the first listing or bulk-delete request error.
pub fn clear_bucket(
    store: &dyn ObjectStore,
    bucket: &str,
    logger: &Logger,
) -> Result<ClearReport, StorageError> {
    logger.normal(&format!("Clearing bucket '{bucket}'..."));

    let mut report = ClearReport::default();
    for_each_page(store, ListRequest::new(bucket), |page| {
        for chunk in page.keys.chunks(MAX_DELETE_BATCH) {
            let batch = store.delete_objects(bucket, chunk.to_vec())?;
            logger.debug(&format!(
                "Bulk delete: {} deleted, {} failed",
                batch.deleted.len(),
                batch.failed.len()
            ));
            report.deleted += batch.deleted.len();
            report.failed.extend(batch.failed);
        }
        Ok(())
    })?;

    for (key, reason) in &report.failed {
        logger.warn(&format!("Could not delete '{key}': {reason}"));
    }
    logger.normal(&format!(
        "Deleted {} file(s) from '{bucket}'",
        report.deleted
    ));
    Ok(report)
}

/// Delete a single object. Deleting an absent key succeeds.
///
/// # Errors
///
/// Returns the store error, e.g. `NotFound` for a missing bucket.
pub fn delete_file(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    logger: &Logger,
) -> Result<(), StorageError> {
    logger.normal(&format!("Deleting '{key}' from '{bucket}'..."));
    store.delete_object(bucket, key)?;
    logger.normal(&format!("File '{key}' deleted successfully"));
    Ok(())
}

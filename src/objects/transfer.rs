use crate::domain::{FALLBACK_FILENAME, ObjectPath};
use crate::errors::StorageError;
use crate::ports::ObjectStore;
use crate::utils::log_utils::Logger;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fetch the full content of one object.
///
/// # Errors
///
/// `NotFound` when the bucket or key does not exist, `Transfer` otherwise.
pub fn get_object(store: &dyn ObjectStore, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
    store.get_object(bucket, key)
}

/// Store `body` under `bucket/key` in a single request.
///
/// # Errors
///
/// `NotFound` when the bucket does not exist, `Transfer` otherwise.
pub fn put_object(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    content_type: Option<&str>,
) -> Result<(), StorageError> {
    store.put_object(bucket, key, body, content_type.map(str::to_string))
}

/// Local path a download lands on when the caller gave `destination`.
///
/// An empty destination means the key's basename in the working directory,
/// or `downloaded_file` when the key ends with `/`.
pub fn resolve_download_target(path: &ObjectPath, destination: &str) -> PathBuf {
    if destination.is_empty() {
        PathBuf::from(path.basename().unwrap_or(FALLBACK_FILENAME))
    } else {
        PathBuf::from(destination)
    }
}

/// Download `bucket/key` to a local file, creating missing directories.
///
/// # Errors
///
/// `PathFormat` for a malformed source, `NotFound`/`Transfer` from the store,
/// `Io` when the local file cannot be written.
pub fn download_file(
    store: &dyn ObjectStore,
    source_path: &str,
    destination_path: &str,
    logger: &Logger,
) -> Result<PathBuf, StorageError> {
    let path = ObjectPath::parse(source_path)?;
    let target = resolve_download_target(&path, destination_path);

    if let Some(dir) = non_empty_parent(&target)
        && !dir.exists()
    {
        std::fs::create_dir_all(dir)?;
        logger.normal(&format!("Created directory: {}", dir.display()));
    }

    logger.normal(&format!(
        "Downloading {} to {}...",
        path,
        target.display()
    ));
    let content = store.get_object(&path.bucket, &path.key)?;
    write_atomically(&target, &content)?;
    logger.normal(&format!(
        "File downloaded successfully to {}",
        target.display()
    ));
    logger.debug(&format!("{} bytes written", content.len()));

    Ok(target)
}

/// Upload a local file to `bucket/key`.
///
/// # Errors
///
/// `PathFormat` for a malformed destination, `LocalFileMissing` when the
/// local file does not exist, `NotFound`/`Transfer` from the store.
pub fn upload_file(
    store: &dyn ObjectStore,
    destination_path: &str,
    local_path: &Path,
    logger: &Logger,
) -> Result<ObjectPath, StorageError> {
    let path = ObjectPath::parse(destination_path)?;
    if !local_path.is_file() {
        return Err(StorageError::LocalFileMissing(local_path.to_path_buf()));
    }

    logger.normal(&format!(
        "Uploading {} to {}...",
        local_path.display(),
        path
    ));
    store.upload_path(&path.bucket, &path.key, local_path)?;
    logger.normal(&format!("File uploaded successfully to {path}"));

    Ok(path)
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

// Write next to the target and rename, so a failed write leaves nothing behind.
// New files get the usual umask-filtered mode; overwrites keep the old mode.
fn write_atomically(target: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = non_empty_parent(target).unwrap_or(Path::new("."));
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir)?;

    if let Ok(existing) = std::fs::metadata(target)
        && existing.is_file()
    {
        tmp.as_file().set_permissions(existing.permissions())?;
    }

    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

use crate::domain::{DeleteBatch, ListPage, ListRequest, advance_token};
use crate::errors::StorageError;
use crate::infra::s3_client::S3StorageClient;
use crate::ports::ObjectStore;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use std::path::Path;
use std::time::Duration;

const NOT_FOUND_CODES: [&str; 3] = ["NoSuchKey", "NoSuchBucket", "NotFound"];

/// Map an SDK failure onto `NotFound` or `Transfer`, keeping the service message.
fn classify<E, R>(operation: &str, target: &str, err: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    if err.code().is_some_and(|code| NOT_FOUND_CODES.contains(&code)) {
        return StorageError::NotFound(target.to_string());
    }
    StorageError::transfer(operation, DisplayErrorContext(&err).to_string())
}

impl ObjectStore for S3StorageClient {
    fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        self.runtime.block_on(async {
            let mut names = Vec::new();
            let mut token: Option<String> = None;

            loop {
                let resp = self
                    .client
                    .list_buckets()
                    .set_continuation_token(token.clone())
                    .send()
                    .await
                    .map_err(|e| classify("ListBuckets", "bucket list", e))?;

                names.extend(
                    resp.buckets()
                        .iter()
                        .filter_map(|b| b.name().map(str::to_string)),
                );

                match advance_token(token.as_deref(), resp.continuation_token()) {
                    Some(next) => token = Some(next),
                    None => break,
                }
            }

            self.logger
                .debug(&format!("ListBuckets returned {} bucket(s)", names.len()));
            Ok(names)
        })
    }

    fn list_objects_page(&self, request: &ListRequest) -> Result<ListPage, StorageError> {
        self.logger.debug(&format!(
            "ListObjectsV2 bucket='{}' delimiter={:?} token={:?}",
            request.bucket, request.delimiter, request.continuation_token
        ));

        self.runtime.block_on(async {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&request.bucket)
                .set_delimiter(request.delimiter.clone())
                .set_continuation_token(request.continuation_token.clone())
                .send()
                .await
                .map_err(|e| classify("ListObjectsV2", &request.bucket, e))?;

            let keys = resp
                .contents()
                .iter()
                .filter_map(|o| o.key().map(str::to_string))
                .collect();
            let common_prefixes = resp
                .common_prefixes()
                .iter()
                .filter_map(|p| p.prefix().map(str::to_string))
                .collect();

            // Some compatible services omit IsTruncated; trust the token then
            let next_token = if resp.is_truncated() == Some(false) {
                None
            } else {
                advance_token(
                    request.continuation_token.as_deref(),
                    resp.next_continuation_token(),
                )
            };

            Ok(ListPage {
                keys,
                common_prefixes,
                next_token,
            })
        })
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let target = format!("{bucket}/{key}");
        self.runtime.block_on(async {
            let resp = self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| classify("GetObject", &target, e))?;

            self.logger.debug(&format!(
                "GetObject response: content length {:?}, e-tag {:?}",
                resp.content_length(),
                resp.e_tag()
            ));

            let bytes = resp.body.collect().await.map_err(|e| {
                StorageError::transfer("GetObject", format!("Failed to read response body: {e}"))
            })?;

            Ok(bytes.to_vec())
        })
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<(), StorageError> {
        let target = format!("{bucket}/{key}");
        let length = i64::try_from(body.len())
            .map_err(|_| StorageError::Request(format!("{target} body is too large")))?;

        self.runtime.block_on(async {
            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from(body))
                .set_content_type(content_type)
                .content_length(length)
                .send()
                .await
                .map_err(|e| classify("PutObject", &target, e))?;
            Ok(())
        })
    }

    fn upload_path(&self, bucket: &str, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let target = format!("{bucket}/{key}");
        self.runtime.block_on(async {
            // Streams from disk instead of loading the file into memory
            let body = ByteStream::from_path(local_path).await.map_err(|e| {
                StorageError::transfer(
                    "PutObject",
                    format!("Failed to read '{}': {e}", local_path.display()),
                )
            })?;

            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(body)
                .send()
                .await
                .map_err(|e| classify("PutObject", &target, e))?;
            Ok(())
        })
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let target = format!("{bucket}/{key}");
        self.runtime.block_on(async {
            match self.client.delete_object().bucket(bucket).key(key).send().await {
                Ok(_) => Ok(()),
                Err(e) if e.code() == Some("NoSuchKey") => {
                    self.logger
                        .debug(&format!("{target} was already absent"));
                    Ok(())
                }
                Err(e) => Err(classify("DeleteObject", &target, e)),
            }
        })
    }

    fn delete_objects(&self, bucket: &str, keys: Vec<String>) -> Result<DeleteBatch, StorageError> {
        if keys.is_empty() {
            return Ok(DeleteBatch::default());
        }

        let objects = keys
            .iter()
            .map(|k| {
                ObjectIdentifier::builder()
                    .key(k)
                    .build()
                    .map_err(|e| StorageError::Request(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .build()
            .map_err(|e| StorageError::Request(e.to_string()))?;

        self.runtime.block_on(async {
            let resp = self
                .client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| classify("DeleteObjects", bucket, e))?;

            let deleted = resp
                .deleted()
                .iter()
                .filter_map(|d| d.key().map(str::to_string))
                .collect();
            let failed = resp
                .errors()
                .iter()
                .map(|e| {
                    (
                        e.key().unwrap_or_default().to_string(),
                        e.message()
                            .or(e.code())
                            .unwrap_or("unknown error")
                            .to_string(),
                    )
                })
                .collect();

            Ok(DeleteBatch { deleted, failed })
        })
    }

    fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in_secs: u64,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(Duration::from_secs(expires_in_secs))
            .map_err(|e| StorageError::Presign(format!("invalid expiry: {e}")))?;

        let request = self
            .runtime
            .block_on(
                self.client
                    .get_object()
                    .bucket(bucket)
                    .key(key)
                    .presigned(presigning),
            )
            .map_err(|e| StorageError::Presign(DisplayErrorContext(&e).to_string()))?;

        Ok(request.uri().to_string())
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

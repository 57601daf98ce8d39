use std::sync::Arc;

use crate::args::{Command, TransformArgs};
use crate::config::AppConfig;
use crate::domain::{ClearReport, TransformReport};
use crate::errors::ObjstoreCsvMgrError;
use crate::objects::{self, urls};
use crate::pipeline::{self, RowFilter};
use crate::ports::ObjectStore;
use crate::utils::log_utils::Logger;

/// Runs one command against an injected store.
pub struct AppCore {
    store: Arc<dyn ObjectStore>,
    config: AppConfig,
    logger: Logger,
}

impl AppCore {
    pub fn new(store: Arc<dyn ObjectStore>, config: AppConfig, logger: Logger) -> Self {
        Self {
            store,
            config,
            logger,
        }
    }

    /// Dispatch a parsed command.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or `Refused` for a `clear` without `--yes`.
    pub fn run(&self, command: &Command) -> Result<(), ObjstoreCsvMgrError> {
        let store = self.store.as_ref();
        let logger = &self.logger;

        match command {
            Command::Transform(t) => {
                self.transform(t)?;
            }
            Command::ListBuckets => {
                objects::list_buckets(store, logger)?;
            }
            Command::ListFolders { bucket } => {
                objects::list_folders(store, self.bucket_or_default(bucket), logger)?;
            }
            Command::ListFiles { bucket } => {
                objects::list_files(store, self.bucket_or_default(bucket), logger)?;
            }
            Command::Download {
                source,
                destination,
            } => {
                objects::download_file(store, source, destination, logger)?;
            }
            Command::Upload { destination, local } => {
                objects::upload_file(store, destination, local, logger)?;
            }
            Command::Delete { bucket, key } => {
                objects::delete_file(store, bucket, key, logger)?;
            }
            Command::Clear { bucket, yes } => {
                self.clear(self.bucket_or_default(bucket), *yes)?;
            }
            Command::PublicUrl { bucket, key, style } => {
                let url = urls::public_url(&store.endpoint(), bucket, key, *style, logger)?;
                logger.normal(&url);
            }
            Command::Presign {
                bucket,
                key,
                expires_in,
            } => {
                let url = urls::presigned_url(store, bucket, key, *expires_in, logger)?;
                logger.normal(&url);
            }
        }
        Ok(())
    }

    /// Run the filter pipeline, filling unset keys from the configuration.
    ///
    /// # Errors
    ///
    /// Returns the pipeline error; nothing is uploaded when parsing fails.
    pub fn transform(&self, t: &TransformArgs) -> Result<TransformReport, ObjstoreCsvMgrError> {
        if t.list_buckets_first {
            objects::list_buckets(self.store.as_ref(), &self.logger)?;
        }

        let bucket = self.bucket_or_default(&t.bucket);
        let input = t.input.as_deref().unwrap_or(&self.config.input_key);
        let output = t.output.as_deref().unwrap_or(&self.config.output_key);
        let filter = RowFilter {
            column: t.column.clone(),
            below: t.below,
        };

        self.logger.debug(&format!(
            "transform bucket='{bucket}' input='{input}' output='{output}' filter={filter:?}"
        ));
        let report = pipeline::transform(
            self.store.as_ref(),
            bucket,
            input,
            output,
            &filter,
            &self.logger,
        )?;
        Ok(report)
    }

    /// # Errors
    ///
    /// Returns `Refused` unless `confirmed`, otherwise the listing/delete error.
    pub fn clear(&self, bucket: &str, confirmed: bool) -> Result<ClearReport, ObjstoreCsvMgrError> {
        if !confirmed {
            return Err(ObjstoreCsvMgrError::Refused(format!(
                "clear bucket '{bucket}' without --yes"
            )));
        }
        Ok(objects::clear_bucket(
            self.store.as_ref(),
            bucket,
            &self.logger,
        )?)
    }

    fn bucket_or_default<'a>(&'a self, bucket: &'a Option<String>) -> &'a str {
        bucket.as_deref().unwrap_or(&self.config.bucket)
    }
}

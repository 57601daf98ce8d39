use crate::config::StorageConfig;
use crate::errors::ObjstoreCsvMgrError;
use crate::utils::log_utils::Logger;
use aws_config::retry::RetryConfig;
use aws_credential_types::Credentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{
    BehaviorVersion, Region, RequestChecksumCalculation, ResponseChecksumValidation,
};

/// Blocking client for one S3-compatible endpoint.
///
/// Owns the tokio runtime that every request is driven on, so callers stay
/// synchronous.
pub struct S3StorageClient {
    pub(crate) client: Client,
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) endpoint: String,
    pub(crate) logger: Logger,
}

impl S3StorageClient {
    /// Create a client bound to the endpoint, region and static credentials in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tokio runtime cannot be created.
    pub fn new(config: &StorageConfig, logger: Logger) -> Result<Self, ObjstoreCsvMgrError> {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ObjstoreCsvMgrError::Runtime(format!("Failed to create runtime: {e}")))?;

        logger.debug("Creating S3-compatible client with these parameters:");
        logger.debug(&format!("Endpoint: {endpoint}"));
        logger.debug(&format!("Region: {}", config.region));
        logger.debug(&format!("Key ID: {}", config.masked_access_key()));

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None, // No session token
            None, // No expiry
            "StaticCredentials",
        );

        // OCI's compatibility API rejects the newer default checksum headers
        let s3_config = aws_sdk_s3::Config::builder()
            .region(Region::new(config.region.clone()))
            .endpoint_url(&endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .retry_config(RetryConfig::disabled())
            .behavior_version(BehaviorVersion::latest())
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            runtime,
            endpoint,
            logger,
        })
    }
}

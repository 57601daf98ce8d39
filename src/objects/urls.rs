use crate::domain::UrlStyle;
use crate::errors::StorageError;
use crate::ports::ObjectStore;
use crate::utils::log_utils::Logger;

pub const DEFAULT_PRESIGN_EXPIRY_SECS: u64 = 3600;

/// Namespace and region taken from an OCI compatibility endpoint,
/// `https://NAMESPACE.compat.objectstorage.REGION.oraclecloud.com`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointParts {
    pub namespace: String,
    pub region: String,
}

impl EndpointParts {
    /// # Errors
    ///
    /// Returns `StorageError::EndpointFormat` when the host does not follow the
    /// compatibility layout.
    pub fn parse(endpoint: &str) -> Result<Self, StorageError> {
        let fail = |reason: &str| StorageError::EndpointFormat {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = endpoint.trim();
        let without_scheme = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);
        let host = without_scheme
            .split('/')
            .next()
            .and_then(|authority| authority.split(':').next())
            .unwrap_or_default();

        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() < 5 {
            return Err(fail("expected NAMESPACE.compat.objectstorage.REGION.<domain>"));
        }
        let [namespace, compat, service, region, ..] = labels.as_slice() else {
            return Err(fail("expected NAMESPACE.compat.objectstorage.REGION.<domain>"));
        };
        if *compat != "compat" || *service != "objectstorage" {
            return Err(fail("host is not an object storage compatibility endpoint"));
        }
        if namespace.is_empty() || region.is_empty() {
            return Err(fail("namespace and region must not be empty"));
        }

        Ok(Self {
            namespace: (*namespace).to_string(),
            region: (*region).to_string(),
        })
    }

    /// Public object URL in the requested layout. No network access.
    pub fn object_url(&self, bucket: &str, key: &str, style: UrlStyle) -> String {
        let ns = &self.namespace;
        let region = &self.region;
        match style {
            UrlStyle::Legacy => {
                format!("https://objectstorage.{region}.oraclecloud.com/n/{ns}/b/{bucket}/o/{key}")
            }
            UrlStyle::Oci2024 => format!(
                "https://{ns}.objectstorage.{region}.oci.customer-oci.com/n/{ns}/b/{bucket}/o/{key}"
            ),
        }
    }
}

/// Build the public URL of `bucket/key` from the configured endpoint.
///
/// Pure string construction; the bucket's access policy is not checked.
///
/// # Errors
///
/// Returns `StorageError::EndpointFormat` for an unexpected endpoint.
pub fn public_url(
    endpoint: &str,
    bucket: &str,
    key: &str,
    style: UrlStyle,
    logger: &Logger,
) -> Result<String, StorageError> {
    let parts = EndpointParts::parse(endpoint)?;
    logger.debug(&format!(
        "Endpoint namespace '{}', region '{}'",
        parts.namespace, parts.region
    ));
    let url = parts.object_url(bucket, key, style);
    logger.debug(&format!("Built {style:?} public URL for {bucket}/{key}"));
    Ok(url)
}

/// Ask the store to sign a time-limited GET URL.
///
/// # Errors
///
/// Always propagates signing failures as `StorageError::Presign`.
pub fn presigned_url(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    expires_in_secs: u64,
    logger: &Logger,
) -> Result<String, StorageError> {
    let url = store.presign_get(bucket, key, expires_in_secs)?;
    logger.debug(&format!(
        "Presigned GET for {bucket}/{key}, valid {expires_in_secs} sec"
    ));
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_port_and_path() {
        let parts =
            EndpointParts::parse("https://ns1.compat.objectstorage.eu-frankfurt-1.oraclecloud.com:443/x")
                .unwrap();
        assert_eq!(parts.namespace, "ns1");
        assert_eq!(parts.region, "eu-frankfurt-1");
    }

    #[test]
    fn rejects_plain_s3_endpoint() {
        let err = EndpointParts::parse("https://s3.us-west-004.backblazeb2.com").unwrap_err();
        assert!(matches!(err, StorageError::EndpointFormat { .. }));
    }
}

//! # rc-storage-s3
//!
//! `ObjectStore` backed by an S3 bucket. Keys given by callers are stored
//! under a fixed prefix (`public/` by default) and read back through
//! presigned GET URLs.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use rc_core::error::{AppError, Result};
use rc_core::traits::ObjectStore;
use tracing::{debug, error};

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    key_prefix: String,
    url_ttl: Duration,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>, key_prefix: impl Into<String>, url_ttl: Duration) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key_prefix: key_prefix.into(),
            url_ttl,
        }
    }

    /// Builds a client from the default credential chain for `region`.
    pub async fn connect(
        region: &str,
        bucket: impl Into<String>,
        key_prefix: impl Into<String>,
        url_ttl: Duration,
    ) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(Client::new(&shared), bucket, key_prefix, url_ttl)
    }

    fn object_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let object_key = self.object_key(key);
        debug!(bucket = %self.bucket, key = %object_key, size = data.len(), "put object");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                error!(key = %object_key, error = %DisplayErrorContext(&e), "upload failed");
                AppError::Storage(format!("upload of {object_key} failed: {}", DisplayErrorContext(&e)))
            })?;
        Ok(())
    }

    async fn get_url(&self, key: &str) -> Result<String> {
        let presigning = PresigningConfig::expires_in(self.url_ttl)
            .map_err(|e| AppError::Storage(format!("invalid url lifetime: {e}")))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Storage(format!("could not sign {key}: {}", DisplayErrorContext(&e))))?;
        Ok(request.uri().to_string())
    }
}

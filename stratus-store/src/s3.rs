//! S3-compatible storage provider.
//!
//! Thin wrapper over `aws-sdk-s3`. The connection string is the endpoint
//! URL (useful for MinIO/localstack style deployments); leave it empty
//! to use the SDK's default endpoint resolution and credential chain.

use crate::error::{StoreError, StoreResult};
use crate::naming::sanitize_fragment;
use crate::options::StorageOptions;
use crate::provider::{CloudProviderKind, StorageProvider};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

/// Storage provider backed by an S3-compatible object store.
pub struct S3StorageProvider {
    client: Client,
    bucket: String,
}

impl S3StorageProvider {
    /// Connects to the endpoint named in `options`. No bucket I/O happens
    /// here; call `create_container_if_not_exists` before first use.
    pub async fn connect(options: &StorageOptions) -> StoreResult<Self> {
        options.validate()?;

        let base = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        let mut builder = aws_sdk_s3::config::Builder::from(&base).force_path_style(true);
        if !options.connection_string.trim().is_empty() {
            builder = builder.endpoint_url(options.connection_string.trim());
        }
        let client = Client::from_conf(builder.build());

        info!(bucket = %options.container_name, "connected S3 storage provider");
        Ok(Self {
            client,
            bucket: options.container_name.clone(),
        })
    }
}

#[async_trait]
impl StorageProvider for S3StorageProvider {
    fn kind(&self) -> CloudProviderKind {
        CloudProviderKind::S3
    }

    async fn save(&self, path: &str, bytes: &[u8]) -> StoreResult<()> {
        debug!(path, len = bytes.len(), "s3 put");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(bytes.to_vec()))
            .send()
            .await
            .map_err(|e| StoreError::Io(format!("put {path}: {e}")))?;
        Ok(())
    }

    async fn read(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let out = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(out) => out,
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(StoreError::Io(format!("get {path}: {service_err}")));
            }
        };

        let data = out
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Io(format!("get {path}: body: {e}")))?;
        Ok(Some(data.into_bytes().to_vec()))
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        // S3 deletes are idempotent already; a missing key still returns 204.
        debug!(path, "s3 delete");
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| StoreError::Io(format!("delete {path}: {e}")))?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = &continuation {
                req = req.continuation_token(token);
            }
            let out = req
                .send()
                .await
                .map_err(|e| StoreError::Io(format!("list {prefix}: {e}")))?;

            for object in out.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }

            match out.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        Ok(keys)
    }

    fn sanitize_blob_name(&self, raw: &str) -> String {
        sanitize_fragment(raw)
    }

    async fn create_container_if_not_exists(&self) -> StoreResult<()> {
        match self
            .client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(_) => {
                info!(bucket = %self.bucket, "created bucket");
                Ok(())
            }
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_bucket_already_owned_by_you()
                    || service_err.is_bucket_already_exists()
                {
                    return Ok(());
                }
                Err(StoreError::Container(
                    self.bucket.clone(),
                    service_err.to_string(),
                ))
            }
        }
    }

    async fn delete_container(&self) -> StoreResult<()> {
        // Buckets must be empty before deletion.
        let keys = self.list("").await?;
        for key in keys {
            self.delete(&key).await?;
        }
        self.client
            .delete_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StoreError::Container(self.bucket.clone(), e.to_string()))?;
        info!(bucket = %self.bucket, "deleted bucket");
        Ok(())
    }
}

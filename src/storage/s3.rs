use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use tracing::info;

use super::{check_reference, content_type_for, display_name, new_reference, Document, DocumentStore, StorageError};
use crate::config::S3Config;

/// S3 or any S3-compatible object store
pub struct S3DocumentStore {
    bucket: Bucket,
}

impl S3DocumentStore {
    pub fn new(config: &S3Config) -> Result<Self, StorageError> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse()
                .map_err(|e| StorageError::Remote(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Remote(format!("invalid credentials: {e}")))?;

        let bucket = Bucket::new(&config.bucket, region, credentials).map_err(remote)?;
        // custom endpoints (MinIO and friends) rarely support virtual-host addressing
        let bucket = if config.endpoint.is_some() {
            bucket.with_path_style()
        } else {
            bucket
        };

        info!("Using S3 bucket {}", config.bucket);
        Ok(Self { bucket })
    }
}

fn remote(err: S3Error) -> StorageError {
    StorageError::Remote(err.to_string())
}

fn check_status(reference: &str, status: u16) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(reference.to_string())),
        other => Err(StorageError::Remote(format!("unexpected status {other} for {reference}"))),
    }
}

fn from_response_error(reference: &str, err: S3Error) -> StorageError {
    match err {
        S3Error::HttpFailWithBody(404, _) => StorageError::NotFound(reference.to_string()),
        other => remote(other),
    }
}

#[async_trait]
impl DocumentStore for S3DocumentStore {
    async fn put(&self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let reference = new_reference(file_name);
        let response = self
            .bucket
            .put_object_with_content_type(&reference, &bytes, content_type)
            .await
            .map_err(|e| from_response_error(&reference, e))?;
        check_status(&reference, response.status_code())?;
        Ok(reference)
    }

    async fn get(&self, reference: &str) -> Result<Document, StorageError> {
        check_reference(reference)?;
        let response = self
            .bucket
            .get_object(reference)
            .await
            .map_err(|e| from_response_error(reference, e))?;
        check_status(reference, response.status_code())?;

        let file_name = display_name(reference);
        Ok(Document {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            bytes: response.bytes().to_vec(),
        })
    }

    async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        check_reference(reference)?;
        let response = self
            .bucket
            .delete_object(reference)
            .await
            .map_err(|e| from_response_error(reference, e))?;
        check_status(reference, response.status_code())
    }
}

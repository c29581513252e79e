//! Document attachments for policies.
//!
//! Backends hand out an opaque reference string which is what gets stored on
//! the policy row. References are always relative `policies/<uuid>-<name>` keys.

use std::path::{Component, Path};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{StorageBackend, StorageConfig};

mod local;
mod s3;

pub use local::LocalDocumentStore;
pub use s3::S3DocumentStore;

const KEY_PREFIX: &str = "policies";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("invalid document reference: {0}")]
    InvalidReference(String),

    #[error("storage is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object store error: {0}")]
    Remote(String),
}

/// A stored file read back for download
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store the bytes and return the reference to persist
    async fn put(&self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, StorageError>;
    async fn get(&self, reference: &str) -> Result<Document, StorageError>;
    async fn delete(&self, reference: &str) -> Result<(), StorageError>;
}

pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn DocumentStore>, StorageError> {
    match config.backend {
        StorageBackend::Local => Ok(Arc::new(LocalDocumentStore::new(&config.local_dir))),
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or(StorageError::NotConfigured("S3_BUCKET"))?;
            Ok(Arc::new(S3DocumentStore::new(s3)?))
        }
    }
}

/// New unique key for an upload, keeping a cleaned-up version of the client's file name
pub fn new_reference(file_name: &str) -> String {
    format!("{}/{}-{}", KEY_PREFIX, Uuid::new_v4().simple(), sanitize_file_name(file_name))
}

/// Reject anything that is not one of our own relative keys
pub fn check_reference(reference: &str) -> Result<(), StorageError> {
    let path = Path::new(reference);
    let well_formed = reference.starts_with(KEY_PREFIX)
        && path.components().all(|c| matches!(c, Component::Normal(_)));
    if well_formed {
        Ok(())
    } else {
        Err(StorageError::InvalidReference(reference.to_string()))
    }
}

/// File name shown to the user on download, with the uniqueness prefix stripped
pub fn display_name(reference: &str) -> String {
    let last = reference.rsplit('/').next().unwrap_or(reference);
    match last.split_once('-') {
        Some((_, name)) if !name.is_empty() => name.to_string(),
        _ => last.to_string(),
    }
}

fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Content type guessed from the file extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

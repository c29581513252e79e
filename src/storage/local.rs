use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{check_reference, content_type_for, display_name, new_reference, Document, DocumentStore, StorageError};

/// Files under a directory on the local disk
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, reference: &str) -> Result<PathBuf, StorageError> {
        check_reference(reference)?;
        Ok(self.root.join(reference))
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn put(&self, file_name: &str, _content_type: &str, bytes: Vec<u8>) -> Result<String, StorageError> {
        let reference = new_reference(file_name);
        let path = self.path_for(&reference)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!("Stored document at {}", path.display());
        Ok(reference)
    }

    async fn get(&self, reference: &str) -> Result<Document, StorageError> {
        let path = self.path_for(reference)?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(reference.to_string()),
            _ => StorageError::Io(e),
        })?;
        let file_name = display_name(reference);
        Ok(Document {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            bytes,
        })
    }

    async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        let path = self.path_for(reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(reference.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

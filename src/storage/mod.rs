//! External object storage for review images.

pub mod cloudinary;

use async_trait::async_trait;
use thiserror::Error;

pub use cloudinary::CloudinaryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// One object to upload.
#[derive(Debug, Clone)]
pub struct UploadObject {
    pub folder: String,
    pub public_id: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Where an uploaded object ended up.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Provider-side id, needed to delete the object again
    pub public_id: String,
    pub url: String,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn upload(&self, object: UploadObject) -> Result<StoredObject, StorageError>;

    async fn delete(&self, public_id: &str) -> Result<(), StorageError>;
}

use chrono::{Datelike, Utc};
use std::path::Path;
use std::sync::Arc;

use super::review::ReviewService;
use crate::auth::AuthUser;
use crate::error::{ServiceError, ServiceResult};
use crate::models::ReviewImage;
use crate::storage::{ObjectStorage, UploadObject};

pub const MAX_FILES_PER_UPLOAD: usize = 10;
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// One file taken from a multipart upload.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Pushes review images to object storage and records them.
///
/// Each file is uploaded, then persisted. When persisting fails the object
/// just uploaded is deleted again; images persisted earlier in the same
/// batch are kept.
pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    reviews: Arc<ReviewService>,
    folder: String,
}

pub(crate) fn validate_files(files: &[ImageFile]) -> ServiceResult<()> {
    if files.is_empty() {
        return Err(ServiceError::validation("images: at least one file is required"));
    }
    if files.len() > MAX_FILES_PER_UPLOAD {
        return Err(ServiceError::validation(format!(
            "images: at most {} files per upload",
            MAX_FILES_PER_UPLOAD
        )));
    }
    for file in files {
        let extension = Path::new(&file.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        if !extension.is_some_and(|e| ALLOWED_EXTENSIONS.contains(&e.as_str())) {
            return Err(ServiceError::validation(format!(
                "{}: only jpg, jpeg, png and gif files are allowed",
                file.file_name
            )));
        }
        if file.bytes.is_empty() {
            return Err(ServiceError::validation(format!("{}: file is empty", file.file_name)));
        }
        if file.bytes.len() > MAX_FILE_BYTES {
            return Err(ServiceError::validation(format!(
                "{}: file exceeds {} MiB",
                file.file_name,
                MAX_FILE_BYTES / (1024 * 1024)
            )));
        }
    }
    Ok(())
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>, reviews: Arc<ReviewService>, folder: String) -> Self {
        Self {
            storage,
            reviews,
            folder,
        }
    }

    pub async fn upload_review_images(
        &self,
        user: &AuthUser,
        review_id: i64,
        files: Vec<ImageFile>,
    ) -> ServiceResult<Vec<ReviewImage>> {
        self.reviews.authorize(user, review_id).await?;
        validate_files(&files)?;

        let now = Utc::now();
        let folder = format!("{}/{}", self.folder, now.year());
        let first_order = self.reviews.next_image_order(review_id).await?;

        let mut images = Vec::with_capacity(files.len());
        for (index, file) in files.into_iter().enumerate() {
            let public_id = format!("review_{}_{}_{}", review_id, now.timestamp(), index);
            let stored = self
                .storage
                .upload(UploadObject {
                    folder: folder.clone(),
                    public_id,
                    file_name: file.file_name,
                    bytes: file.bytes,
                })
                .await
                .map_err(|e| {
                    tracing::error!(review_id, error = %e, storage = self.storage.name(), "image upload failed");
                    ServiceError::from(e)
                })?;

            let order = first_order + index as i32;
            match self.reviews.persist_image(review_id, stored.url, order).await {
                Ok(image) => images.push(image),
                Err(e) => {
                    self.discard(&stored.public_id).await;
                    return Err(e);
                }
            }
        }

        tracing::info!(review_id, count = images.len(), "review images uploaded");
        Ok(images)
    }

    /// Best effort; a failure here leaves an orphaned object behind.
    async fn discard(&self, public_id: &str) {
        if let Err(e) = self.storage.delete(public_id).await {
            tracing::error!(public_id, error = %e, "failed to delete orphaned image");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Review};
    use crate::repository::memory::MemoryStore;
    use crate::repository::{
        MenuItemRepository, NewMenuItem, NewReview, NewReviewImage, NewStore, RepoError,
        RepoResult, ReviewChanges, ReviewFilter, ReviewRepository, StoreRepository,
        UserRepository,
    };
    use crate::storage::{StorageError, StoredObject};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStorage {
        uploaded: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStorage for RecordingStorage {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn upload(&self, object: UploadObject) -> Result<StoredObject, StorageError> {
            let public_id = format!("{}/{}", object.folder, object.public_id);
            self.uploaded.lock().unwrap().push(public_id.clone());
            Ok(StoredObject {
                url: format!("https://cdn.example.com/{}", public_id),
                public_id,
            })
        }

        async fn delete(&self, public_id: &str) -> Result<(), StorageError> {
            self.deleted.lock().unwrap().push(public_id.to_string());
            Ok(())
        }
    }

    /// Delegates to the memory store but refuses image inserts.
    struct RejectImages(Arc<MemoryStore>);

    #[async_trait]
    impl ReviewRepository for RejectImages {
        async fn create(&self, new: NewReview) -> RepoResult<Review> {
            ReviewRepository::create(self.0.as_ref(), new).await
        }
        async fn get_by_id(&self, id: i64) -> RepoResult<Option<Review>> {
            ReviewRepository::get_by_id(self.0.as_ref(), id).await
        }
        async fn list(&self, filter: &ReviewFilter) -> RepoResult<Vec<Review>> {
            ReviewRepository::list(self.0.as_ref(), filter).await
        }
        async fn list_liked_by(&self, user_id: i64) -> RepoResult<Vec<Review>> {
            self.0.list_liked_by(user_id).await
        }
        async fn update(&self, id: i64, changes: ReviewChanges) -> RepoResult<Option<Review>> {
            ReviewRepository::update(self.0.as_ref(), id, changes).await
        }
        async fn soft_delete(&self, id: i64) -> RepoResult<bool> {
            ReviewRepository::soft_delete(self.0.as_ref(), id).await
        }
        async fn add_image(&self, _new: NewReviewImage) -> RepoResult<ReviewImage> {
            Err(RepoError::Timeout)
        }
        async fn list_images(&self, review_id: i64) -> RepoResult<Vec<ReviewImage>> {
            self.0.list_images(review_id).await
        }
        async fn max_image_order(&self, review_id: i64) -> RepoResult<Option<i32>> {
            self.0.max_image_order(review_id).await
        }
    }

    async fn setup(reject_images: bool) -> (UploadService, Arc<RecordingStorage>, AuthUser, AuthUser, i64) {
        let repo = Arc::new(MemoryStore::new());
        let mut users = Vec::new();
        for email in ["owner@example.com", "other@example.com"] {
            let user = UserRepository::create(
                repo.as_ref(),
                NewUser {
                    email: email.into(),
                    name: email.into(),
                    password_hash: "x".into(),
                },
            )
            .await
            .unwrap();
            users.push(AuthUser {
                user_id: user.id,
                email: user.email,
            });
        }
        let store = StoreRepository::create(
            repo.as_ref(),
            NewStore {
                name: "S".into(),
                address: String::new(),
                phone: String::new(),
            },
        )
        .await
        .unwrap();
        let item = MenuItemRepository::create(
            repo.as_ref(),
            NewMenuItem {
                store_id: store.id,
                name: "I".into(),
                description: String::new(),
                price: None,
            },
        )
        .await
        .unwrap();
        let review = ReviewRepository::create(
            repo.as_ref(),
            NewReview {
                menu_item_id: item.id,
                user_id: users[0].user_id,
                rating: 4,
                title: String::new(),
                comment: String::new(),
            },
        )
        .await
        .unwrap();

        let review_repo: Arc<dyn ReviewRepository> = if reject_images {
            Arc::new(RejectImages(repo.clone()))
        } else {
            repo.clone()
        };
        let reviews = Arc::new(ReviewService::new(review_repo, repo.clone(), repo));
        let storage = Arc::new(RecordingStorage::default());
        let svc = UploadService::new(storage.clone(), reviews, "test".into());

        let other = users.pop().unwrap();
        let owner = users.pop().unwrap();
        (svc, storage, owner, other, review.id)
    }

    fn file(name: &str, size: usize) -> ImageFile {
        ImageFile {
            file_name: name.to_string(),
            bytes: vec![0xAB; size],
        }
    }

    #[test]
    fn test_validate_files() {
        assert!(validate_files(&[]).is_err());
        assert!(validate_files(&[file("a.JPG", 10), file("b.png", 10)]).is_ok());
        assert!(validate_files(&[file("a.bmp", 10)]).is_err());
        assert!(validate_files(&[file("noext", 10)]).is_err());
        assert!(validate_files(&[file("a.gif", 0)]).is_err());
        assert!(validate_files(&[file("big.jpeg", MAX_FILE_BYTES)]).is_ok());
        assert!(validate_files(&[file("big.jpeg", MAX_FILE_BYTES + 1)]).is_err());

        let eleven: Vec<ImageFile> = (0..11).map(|i| file(&format!("{}.jpg", i), 1)).collect();
        assert!(validate_files(&eleven).is_err());
        assert!(validate_files(&eleven[..10]).is_ok());
    }

    #[tokio::test]
    async fn test_upload_persists_in_order() {
        let (svc, storage, owner, _, review_id) = setup(false).await;
        let images = svc
            .upload_review_images(&owner, review_id, vec![file("a.jpg", 4), file("b.png", 4)])
            .await
            .unwrap();

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].image_order, 0);
        assert_eq!(images[1].image_order, 1);
        assert!(images[0].image_url.starts_with("https://cdn.example.com/test/"));
        assert_eq!(storage.uploaded.lock().unwrap().len(), 2);
        assert!(storage.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_owner_uploads_nothing() {
        let (svc, storage, _, other, review_id) = setup(false).await;
        let err = svc
            .upload_review_images(&other, review_id, vec![file("a.exe", 4)])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));
        assert!(storage.uploaded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_persist_deletes_uploaded_object() {
        let (svc, storage, owner, _, review_id) = setup(true).await;
        let err = svc
            .upload_review_images(&owner, review_id, vec![file("a.jpg", 4), file("b.jpg", 4)])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));

        let uploaded = storage.uploaded.lock().unwrap().clone();
        let deleted = storage.deleted.lock().unwrap().clone();
        assert_eq!(uploaded.len(), 1, "stops after the first failure");
        assert_eq!(deleted, uploaded);
    }
}

//! Resource services: validation, existence checks and ownership rules on
//! top of the repository contracts.

pub mod comment;
pub mod like;
pub mod menu_item;
pub mod review;
pub mod store;
pub mod upload;

pub use comment::{CommentService, CreateCommentRequest, UpdateCommentRequest};
pub use like::LikeService;
pub use menu_item::{CreateMenuItemRequest, MenuItemService, UpdateMenuItemRequest};
pub use review::{AddReviewImageRequest, CreateReviewRequest, ReviewService, UpdateReviewRequest};
pub use store::{CreateStoreRequest, StoreService, UpdateStoreRequest};
pub use upload::{ImageFile, UploadService};

use crate::error::ServiceError;

/// Reject strings that are present but blank after trimming.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!("{}: must not be blank", field)));
    }
    Ok(())
}

//! Postgres repositories over a shared `PgPool`.

mod comment;
mod menu_item;
mod review;
mod store;
mod user;

pub use comment::PgCommentRepository;
pub use menu_item::PgMenuItemRepository;
pub use review::{PgLikeRepository, PgReviewRepository};
pub use store::PgStoreRepository;
pub use user::PgUserRepository;

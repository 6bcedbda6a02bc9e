//! Gateway types module
//!
//! - [`ApiResponse<T>`]: unified `{message?, data?, error?}` envelope
//! - [`ApiResult<T>`] plus the `ok` / `created` / `message` helpers used by handlers

pub mod response;

pub use response::{ApiResponse, ApiResult, MessageOnly, created, message, ok};

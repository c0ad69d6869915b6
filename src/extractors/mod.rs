//! Request extractors whose rejections use the `AppError` envelope.

pub mod json;
pub mod pagination;

pub use json::JsonBody;
pub use pagination::{PageQuery, SearchQuery};

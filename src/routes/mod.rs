//! Router construction.

pub mod common;
pub mod items;

pub use common::common_routes;
pub use items::item_routes;

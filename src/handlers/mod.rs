//! HTTP handlers for items and service status.

pub mod common;
pub mod items;

//! HTTP request handlers.

pub mod health;
pub mod summary;
pub mod wind;

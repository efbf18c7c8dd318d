//! API handlers module

pub mod analytics;
pub mod gallery;
pub mod health;
pub mod library;
pub mod map_filter;
pub mod sample;

//! Typed data contract shared by the API server and its clients
//!
//! Every payload uses camelCase keys. The server builds these types from
//! database rows; the export client deserializes them from the API.

mod analytics;
mod catalog;
mod filters;
mod listing;

pub use analytics::*;
pub use catalog::*;
pub use filters::*;
pub use listing::*;

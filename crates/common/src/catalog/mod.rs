//! Catalog logic that runs over rows already loaded from the database
//!
//! - `map_data`: nested map document assembly
//! - `analytics`: contractor and block rollups
//! - `spatial`: station to block association
//! - `facets`: available filter options

pub mod analytics;
pub mod facets;
pub mod map_data;
pub mod spatial;

pub use analytics::{block_analytics, contractor_summary, BlockRows, ContractorRows};
pub use facets::{available_options, facet_rows, FacetRow};
pub use map_data::{assemble_map_data, contractor_nodes, CatalogRows};
pub use spatial::{plan_associations, Boundary};

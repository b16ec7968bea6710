//! Canonical search types shared by all indexers.

mod params;
mod types;

pub use params::QueryParams;
pub use types::*;

//! Indexer adapters.
//!
//! Each supported site family implements [`IndexerAdapter`]. Shared
//! behavior (token session, re-authentication retry) lives in
//! [`crate::session`] and is composed into each implementation.

mod types;
pub mod xtreme_zone;

pub use types::*;
pub use xtreme_zone::{XtremeZoneIndexer, XtremeZoneSettings};

//! Representations of duet's records, and the pure logic that turns fetched rows
//! into what a list page shows.
//!
//! Separated out to allow for use in other utilities.
#![deny(missing_docs)]

pub use duet_backend as db;

mod collection;
pub use collection::{Collection, UnknownCollection};

mod record;
pub use record::{Record, RecordId};

mod normalize;
pub use normalize::Normalizer;

pub mod date;

mod filter;
pub use filter::{ALL, DateWindow, FilterSpec, Predicate};

mod sort;
pub use sort::{Collation, SortKey, SortSpec};

mod group;
pub use group::{Group, GroupSpec};

mod engine;
pub use engine::{Engine, Listing};

pub mod export;

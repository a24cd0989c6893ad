//! # Stockroom
//!
//! Product-catalog administration core: a lenient query compiler, a unique
//! slug allocator, pagination arithmetic, dashboard aggregates, and the
//! client-side list-state synchronizer, all over a pluggable record store.
//!
//! The record store is an external collaborator behind the
//! [`store::CatalogStore`] trait; [`store::MemoryStore`] is the in-process
//! reference implementation, and [`query::filter`] renders the same
//! predicates to SQL through SeaQuery for database-backed stores.

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod pagination;
pub mod query;
pub mod slug;
pub mod store;
pub mod sync;

pub use config::CatalogConfig;
pub use error::{CatalogError, FieldError, StoreError};
pub use model::{NewOwner, NewProduct, Owner, Product, ProductPatch, ProductStatus};
pub use pagination::{Page, PageWindow, Pagination};
pub use query::{ListQuery, ProductFilter, SortDirection, SortField, SortSpec};
pub use store::{CatalogStore, MemoryStore, ProductChanges};
pub use sync::{FetchOutcome, FetchRequest, FilterState, ListSynchronizer};

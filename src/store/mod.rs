//! Record-store abstraction.
//!
//! The store is an external collaborator: it owns persistence, transactions,
//! and column-level uniqueness enforcement. [`CatalogStore`]
//! is the seam the rest of the crate works against; implementations range
//! from a SQL backend driving the statements produced by
//! [`crate::query::filter`] to the in-process [`MemoryStore`] used as the
//! reference semantics and test fixture.
//!
//! Every method is `&self`; implementations are expected to be safe to call
//! concurrently from independent callers. The crate itself holds no shared
//! mutable state.

pub mod memory;

#[doc(inline)]
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::model::{NewOwner, NewProduct, Owner, Product, ProductStatus};
use crate::pagination::PageWindow;
use crate::query::filter::{ProductFilter, SortSpec};

/// Field-by-field changes for a product update. `None` leaves the column
/// untouched. All values are pre-validated by the service layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub sku: Option<String>,
    pub name: Option<String>,
    /// Recomputed slug; present only when the name changed.
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub inventory: Option<i32>,
    pub image_url: Option<Option<String>>,
    pub status: Option<ProductStatus>,
    pub owner_id: Option<i32>,
}

/// Per-owner product rollup used by the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerRollup {
    pub owner_name: String,
    pub count: u64,
    pub value: Decimal,
}

/// The operations the catalog needs from its record store.
///
/// Mutations must enforce slug and sku uniqueness transactionally and report
/// violations as [`StoreError::UniqueViolation`]; the slug allocator's probe
/// is only a heuristic and callers retry on conflict.
pub trait CatalogStore {
    // Products

    /// Find one page of products matching the filter, in the given order.
    fn find_products(
        &self,
        filter: &ProductFilter,
        sort: SortSpec,
        window: PageWindow,
    ) -> Result<Vec<Product>, StoreError>;

    /// Count all products matching the filter, ignoring any window.
    fn count_products(&self, filter: &ProductFilter) -> Result<u64, StoreError>;

    fn product_by_id(&self, id: i32) -> Result<Option<Product>, StoreError>;

    fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError>;

    fn product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError>;

    /// Whether a product other than `exclude` already holds this slug.
    fn product_slug_taken(&self, slug: &str, exclude: Option<i32>) -> Result<bool, StoreError>;

    fn insert_product(&self, new: &NewProduct, slug: &str) -> Result<Product, StoreError>;

    /// Apply changes to a row; `Ok(None)` when the row no longer exists.
    fn update_product(
        &self,
        id: i32,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, StoreError>;

    /// Returns whether a row was deleted.
    fn delete_product(&self, id: i32) -> Result<bool, StoreError>;

    // Owners

    fn owner_by_id(&self, id: i32) -> Result<Option<Owner>, StoreError>;

    fn owner_by_slug(&self, slug: &str) -> Result<Option<Owner>, StoreError>;

    fn owner_slug_taken(&self, slug: &str) -> Result<bool, StoreError>;

    /// All owners with `id IN ids OR slug IN slugs`, one lookup.
    fn find_owners(&self, ids: &[i32], slugs: &[String]) -> Result<Vec<Owner>, StoreError>;

    fn insert_owner(&self, new: &NewOwner, slug: &str) -> Result<Owner, StoreError>;

    fn owners_with_product_counts(&self) -> Result<Vec<(Owner, u64)>, StoreError>;

    fn count_owners(&self) -> Result<u64, StoreError>;

    // Aggregates (dashboard reads)

    fn count_products_below_inventory(&self, threshold: i32) -> Result<u64, StoreError>;

    /// Products under the threshold, lowest inventory first.
    fn products_below_inventory(
        &self,
        threshold: i32,
        limit: usize,
    ) -> Result<Vec<Product>, StoreError>;

    /// Sum of `price * inventory` over all products.
    fn inventory_value(&self) -> Result<Decimal, StoreError>;

    /// Creation counts bucketed by month (`"YYYY-MM"`), ascending, for rows
    /// created at or after `since`.
    fn monthly_product_counts(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(String, u64)>, StoreError>;

    /// Product count and inventory value per owner, unordered.
    fn owner_product_rollup(&self) -> Result<Vec<OwnerRollup>, StoreError>;

    /// Most recently created products first.
    fn recent_products(&self, limit: usize) -> Result<Vec<Product>, StoreError>;
}

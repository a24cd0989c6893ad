//! Dashboard aggregates: happy path over the memory store, and the
//! degrade-to-defaults contract when the store is down.

use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use stockroom::dashboard;
use stockroom::pagination::PageWindow;
use stockroom::query::{ProductFilter, SortSpec};
use stockroom::store::{OwnerRollup, ProductChanges};
use stockroom::{
    CatalogConfig, CatalogStore, MemoryStore, NewOwner, NewProduct, Owner, Product, ProductStatus,
    StoreError,
};

fn owner(id: i32, name: &str) -> Owner {
    let now = Utc::now();
    Owner {
        id,
        slug: name.to_lowercase().replace(' ', "-"),
        name: name.into(),
        email: format!("{id}@example.com"),
        created_at: now,
        updated_at: now,
    }
}

fn product_at(
    id: i32,
    sku: &str,
    owner_id: i32,
    inventory: i32,
    price: Decimal,
    status: ProductStatus,
    created_at: DateTime<Utc>,
) -> Product {
    Product {
        id,
        slug: format!("product-{id}"),
        sku: sku.into(),
        name: format!("Product {id}"),
        description: None,
        price,
        inventory,
        image_url: None,
        status,
        owner_id,
        created_at,
        updated_at: created_at,
    }
}

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.load_owner(owner(1, "Acme")).unwrap();
    store.load_owner(owner(2, "Globex")).unwrap();

    let now = Utc::now();
    let last_month = now - Months::new(1);
    let cheap = Decimal::new(500, 2); // 5.00
    let dear = Decimal::new(2000, 2); // 20.00

    store
        .load_product(product_at(1, "A-1", 1, 100, dear, ProductStatus::Active, now))
        .unwrap();
    store
        .load_product(product_at(2, "A-2", 1, 5, cheap, ProductStatus::Active, now))
        .unwrap();
    store
        .load_product(product_at(
            3,
            "A-3",
            1,
            2,
            cheap,
            ProductStatus::Inactive,
            last_month,
        ))
        .unwrap();
    store
        .load_product(product_at(
            4,
            "G-1",
            2,
            50,
            cheap,
            ProductStatus::Discontinued,
            last_month,
        ))
        .unwrap();
    store
}

#[test]
fn stats_cover_counts_low_stock_and_value() {
    let store = seeded_store();
    let config = CatalogConfig::default();
    let stats = dashboard::dashboard_stats(&store, &config);

    assert_eq!(stats.total_products, 4);
    assert_eq!(stats.total_owners, 2);
    assert_eq!(stats.active_products, 2);
    assert_eq!(stats.inactive_products, 1);
    assert_eq!(stats.discontinued_products, 1);
    // Inventories 5 and 2 fall under the default threshold of 20
    assert_eq!(stats.low_inventory_count, 2);
    // 100*20 + 5*5 + 2*5 + 50*5 = 2285.00
    assert_eq!(stats.total_inventory_value, Decimal::new(228500, 2));
}

#[test]
fn status_counts_cover_every_status() {
    let store = seeded_store();
    let counts = dashboard::status_counts(&store);
    let by_status: Vec<_> = counts.iter().map(|c| (c.status, c.count)).collect();
    assert_eq!(
        by_status,
        vec![
            (ProductStatus::Active, 2),
            (ProductStatus::Inactive, 1),
            (ProductStatus::Discontinued, 1),
        ]
    );
}

#[test]
fn products_over_time_buckets_by_month_ascending() {
    let store = seeded_store();
    let config = CatalogConfig::default();
    let points = dashboard::products_over_time(&store, &config);

    assert_eq!(points.len(), 2);
    assert!(points[0].month < points[1].month);
    assert_eq!(points.iter().map(|p| p.count).sum::<u64>(), 4);
}

#[test]
fn products_by_owner_ranks_descending_and_truncates() {
    let store = seeded_store();
    let mut config = CatalogConfig::default();
    let rows = dashboard::products_by_owner(&store, &config);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].owner_name, "Acme");
    assert_eq!(rows[0].count, 3);
    assert_eq!(rows[1].owner_name, "Globex");

    config.top_owners_limit = 1;
    let rows = dashboard::products_by_owner(&store, &config);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].owner_name, "Acme");
}

#[test]
fn low_stock_lists_lowest_inventory_first() {
    let store = seeded_store();
    let config = CatalogConfig::default();
    let low = dashboard::low_stock_products(&store, &config);
    let inventories: Vec<_> = low.iter().map(|p| p.inventory).collect();
    assert_eq!(inventories, vec![2, 5]);
}

#[test]
fn recent_products_are_newest_first_and_limited() {
    let store = MemoryStore::new();
    store.load_owner(owner(1, "Acme")).unwrap();
    let base = Utc::now();
    for i in 1..=8 {
        store
            .load_product(product_at(
                i,
                &format!("R-{i}"),
                1,
                10,
                Decimal::ONE,
                ProductStatus::Active,
                base + Duration::seconds(i64::from(i)),
            ))
            .unwrap();
    }

    let config = CatalogConfig::default();
    let recent = dashboard::recent_products(&store, &config);
    assert_eq!(recent.len(), config.recent_products_limit);
    assert_eq!(recent[0].sku, "R-8");
}

/// A store whose every read fails, for the degrade-to-defaults contract.
struct DownStore;

impl DownStore {
    fn err<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

impl CatalogStore for DownStore {
    fn find_products(
        &self,
        _: &ProductFilter,
        _: SortSpec,
        _: PageWindow,
    ) -> Result<Vec<Product>, StoreError> {
        self.err()
    }
    fn count_products(&self, _: &ProductFilter) -> Result<u64, StoreError> {
        self.err()
    }
    fn product_by_id(&self, _: i32) -> Result<Option<Product>, StoreError> {
        self.err()
    }
    fn product_by_slug(&self, _: &str) -> Result<Option<Product>, StoreError> {
        self.err()
    }
    fn product_by_sku(&self, _: &str) -> Result<Option<Product>, StoreError> {
        self.err()
    }
    fn product_slug_taken(&self, _: &str, _: Option<i32>) -> Result<bool, StoreError> {
        self.err()
    }
    fn insert_product(&self, _: &NewProduct, _: &str) -> Result<Product, StoreError> {
        self.err()
    }
    fn update_product(&self, _: i32, _: &ProductChanges) -> Result<Option<Product>, StoreError> {
        self.err()
    }
    fn delete_product(&self, _: i32) -> Result<bool, StoreError> {
        self.err()
    }
    fn owner_by_id(&self, _: i32) -> Result<Option<Owner>, StoreError> {
        self.err()
    }
    fn owner_by_slug(&self, _: &str) -> Result<Option<Owner>, StoreError> {
        self.err()
    }
    fn owner_slug_taken(&self, _: &str) -> Result<bool, StoreError> {
        self.err()
    }
    fn find_owners(&self, _: &[i32], _: &[String]) -> Result<Vec<Owner>, StoreError> {
        self.err()
    }
    fn insert_owner(&self, _: &NewOwner, _: &str) -> Result<Owner, StoreError> {
        self.err()
    }
    fn owners_with_product_counts(&self) -> Result<Vec<(Owner, u64)>, StoreError> {
        self.err()
    }
    fn count_owners(&self) -> Result<u64, StoreError> {
        self.err()
    }
    fn count_products_below_inventory(&self, _: i32) -> Result<u64, StoreError> {
        self.err()
    }
    fn products_below_inventory(&self, _: i32, _: usize) -> Result<Vec<Product>, StoreError> {
        self.err()
    }
    fn inventory_value(&self) -> Result<Decimal, StoreError> {
        self.err()
    }
    fn monthly_product_counts(
        &self,
        _: DateTime<Utc>,
    ) -> Result<Vec<(String, u64)>, StoreError> {
        self.err()
    }
    fn owner_product_rollup(&self) -> Result<Vec<OwnerRollup>, StoreError> {
        self.err()
    }
    fn recent_products(&self, _: usize) -> Result<Vec<Product>, StoreError> {
        self.err()
    }
}

#[test]
fn dashboard_degrades_to_defaults_when_the_store_is_down() {
    let store = DownStore;
    let config = CatalogConfig::default();

    assert_eq!(
        dashboard::dashboard_stats(&store, &config),
        Default::default()
    );
    assert!(dashboard::status_counts(&store).is_empty());
    assert!(dashboard::products_over_time(&store, &config).is_empty());
    assert!(dashboard::products_by_owner(&store, &config).is_empty());
    assert!(dashboard::low_stock_products(&store, &config).is_empty());
    assert!(dashboard::recent_products(&store, &config).is_empty());
}

#[test]
fn list_surfaces_store_failure_as_generic_error() {
    let err = stockroom::catalog::list_products(&DownStore, "").unwrap_err();
    assert!(matches!(err, stockroom::CatalogError::Store(_)));
}

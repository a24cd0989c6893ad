//! In-process reference implementation of [`CatalogStore`].
//!
//! Backed by an `RwLock`; enforces slug and sku uniqueness the way a SQL
//! store's unique constraints would, including on the insert/update path, so
//! the slug allocator's retry-on-conflict discipline can be exercised in
//! tests without a database.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::model::{NewOwner, NewProduct, Owner, Product};
use crate::pagination::PageWindow;
use crate::query::filter::{ProductFilter, SortDirection, SortField, SortSpec};
use crate::store::{CatalogStore, OwnerRollup, ProductChanges};

#[derive(Debug, Default)]
struct Inner {
    products: Vec<Product>,
    owners: Vec<Owner>,
    next_product_id: i32,
    next_owner_id: i32,
}

/// An in-memory catalog store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    /// Load a fully-specified product row, e.g. a test fixture with a chosen
    /// `created_at`. Uniqueness rules still apply.
    pub fn load_product(&self, product: Product) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner
            .products
            .iter()
            .any(|p| p.slug == product.slug || p.id == product.id)
        {
            return Err(StoreError::UniqueViolation { field: "slug" });
        }
        if inner.products.iter().any(|p| p.sku == product.sku) {
            return Err(StoreError::UniqueViolation { field: "sku" });
        }
        inner.next_product_id = inner.next_product_id.max(product.id);
        inner.products.push(product);
        Ok(())
    }

    /// Load a fully-specified owner row. Uniqueness rules still apply.
    pub fn load_owner(&self, owner: Owner) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner
            .owners
            .iter()
            .any(|o| o.slug == owner.slug || o.id == owner.id)
        {
            return Err(StoreError::UniqueViolation { field: "slug" });
        }
        inner.next_owner_id = inner.next_owner_id.max(owner.id);
        inner.owners.push(owner);
        Ok(())
    }
}

fn compare(a: &Product, b: &Product, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Sku => a.sku.cmp(&b.sku),
        SortField::Price => a.price.cmp(&b.price),
        SortField::Inventory => a.inventory.cmp(&b.inventory),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

impl CatalogStore for MemoryStore {
    fn find_products(
        &self,
        filter: &ProductFilter,
        sort: SortSpec,
        window: PageWindow,
    ) -> Result<Vec<Product>, StoreError> {
        let inner = self.read()?;
        let mut matched: Vec<Product> = inner
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            let ord = compare(a, b, sort.field);
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        Ok(matched
            .into_iter()
            .skip(window.skip as usize)
            .take(window.take as usize)
            .collect())
    }

    fn count_products(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
        let inner = self.read()?;
        Ok(inner.products.iter().filter(|p| filter.matches(p)).count() as u64)
    }

    fn product_by_id(&self, id: i32) -> Result<Option<Product>, StoreError> {
        let inner = self.read()?;
        Ok(inner.products.iter().find(|p| p.id == id).cloned())
    }

    fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        let inner = self.read()?;
        Ok(inner.products.iter().find(|p| p.slug == slug).cloned())
    }

    fn product_by_sku(&self, sku: &str) -> Result<Option<Product>, StoreError> {
        let inner = self.read()?;
        Ok(inner.products.iter().find(|p| p.sku == sku).cloned())
    }

    fn product_slug_taken(&self, slug: &str, exclude: Option<i32>) -> Result<bool, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .products
            .iter()
            .any(|p| p.slug == slug && Some(p.id) != exclude))
    }

    fn insert_product(&self, new: &NewProduct, slug: &str) -> Result<Product, StoreError> {
        let mut inner = self.write()?;
        if inner.products.iter().any(|p| p.slug == slug) {
            return Err(StoreError::UniqueViolation { field: "slug" });
        }
        if inner.products.iter().any(|p| p.sku == new.sku) {
            return Err(StoreError::UniqueViolation { field: "sku" });
        }
        inner.next_product_id += 1;
        let now = Utc::now();
        let product = Product {
            id: inner.next_product_id,
            slug: slug.to_string(),
            sku: new.sku.clone(),
            name: new.name.clone(),
            description: new.description.clone(),
            price: new.price,
            inventory: new.inventory,
            image_url: new.image_url.clone(),
            status: new.status,
            owner_id: new.owner_id,
            created_at: now,
            updated_at: now,
        };
        inner.products.push(product.clone());
        Ok(product)
    }

    fn update_product(
        &self,
        id: i32,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, StoreError> {
        let mut inner = self.write()?;
        let Some(index) = inner.products.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(slug) = &changes.slug {
            if inner.products.iter().any(|p| p.id != id && &p.slug == slug) {
                return Err(StoreError::UniqueViolation { field: "slug" });
            }
        }
        if let Some(sku) = &changes.sku {
            if inner.products.iter().any(|p| p.id != id && &p.sku == sku) {
                return Err(StoreError::UniqueViolation { field: "sku" });
            }
        }
        let product = &mut inner.products[index];
        if let Some(sku) = &changes.sku {
            product.sku = sku.clone();
        }
        if let Some(name) = &changes.name {
            product.name = name.clone();
        }
        if let Some(slug) = &changes.slug {
            product.slug = slug.clone();
        }
        if let Some(description) = &changes.description {
            product.description = description.clone();
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(inventory) = changes.inventory {
            product.inventory = inventory;
        }
        if let Some(image_url) = &changes.image_url {
            product.image_url = image_url.clone();
        }
        if let Some(status) = changes.status {
            product.status = status;
        }
        if let Some(owner_id) = changes.owner_id {
            product.owner_id = owner_id;
        }
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    fn delete_product(&self, id: i32) -> Result<bool, StoreError> {
        let mut inner = self.write()?;
        let before = inner.products.len();
        inner.products.retain(|p| p.id != id);
        Ok(inner.products.len() < before)
    }

    fn owner_by_id(&self, id: i32) -> Result<Option<Owner>, StoreError> {
        let inner = self.read()?;
        Ok(inner.owners.iter().find(|o| o.id == id).cloned())
    }

    fn owner_by_slug(&self, slug: &str) -> Result<Option<Owner>, StoreError> {
        let inner = self.read()?;
        Ok(inner.owners.iter().find(|o| o.slug == slug).cloned())
    }

    fn owner_slug_taken(&self, slug: &str) -> Result<bool, StoreError> {
        let inner = self.read()?;
        Ok(inner.owners.iter().any(|o| o.slug == slug))
    }

    fn find_owners(&self, ids: &[i32], slugs: &[String]) -> Result<Vec<Owner>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .owners
            .iter()
            .filter(|o| ids.contains(&o.id) || slugs.iter().any(|s| s == &o.slug))
            .cloned()
            .collect())
    }

    fn insert_owner(&self, new: &NewOwner, slug: &str) -> Result<Owner, StoreError> {
        let mut inner = self.write()?;
        if inner.owners.iter().any(|o| o.slug == slug) {
            return Err(StoreError::UniqueViolation { field: "slug" });
        }
        inner.next_owner_id += 1;
        let now = Utc::now();
        let owner = Owner {
            id: inner.next_owner_id,
            slug: slug.to_string(),
            name: new.name.clone(),
            email: new.email.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.owners.push(owner.clone());
        Ok(owner)
    }

    fn owners_with_product_counts(&self) -> Result<Vec<(Owner, u64)>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .owners
            .iter()
            .map(|o| {
                let count = inner.products.iter().filter(|p| p.owner_id == o.id).count();
                (o.clone(), count as u64)
            })
            .collect())
    }

    fn count_owners(&self) -> Result<u64, StoreError> {
        let inner = self.read()?;
        Ok(inner.owners.len() as u64)
    }

    fn count_products_below_inventory(&self, threshold: i32) -> Result<u64, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .products
            .iter()
            .filter(|p| p.inventory < threshold)
            .count() as u64)
    }

    fn products_below_inventory(
        &self,
        threshold: i32,
        limit: usize,
    ) -> Result<Vec<Product>, StoreError> {
        let inner = self.read()?;
        let mut low: Vec<Product> = inner
            .products
            .iter()
            .filter(|p| p.inventory < threshold)
            .cloned()
            .collect();
        low.sort_by_key(|p| p.inventory);
        low.truncate(limit);
        Ok(low)
    }

    fn inventory_value(&self) -> Result<Decimal, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .products
            .iter()
            .map(|p| p.price * Decimal::from(p.inventory))
            .sum())
    }

    fn monthly_product_counts(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(String, u64)>, StoreError> {
        let inner = self.read()?;
        let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
        for product in inner.products.iter().filter(|p| p.created_at >= since) {
            *buckets
                .entry(product.created_at.format("%Y-%m").to_string())
                .or_insert(0) += 1;
        }
        Ok(buckets.into_iter().collect())
    }

    fn owner_product_rollup(&self) -> Result<Vec<OwnerRollup>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .owners
            .iter()
            .map(|o| {
                let mut count = 0u64;
                let mut value = Decimal::ZERO;
                for p in inner.products.iter().filter(|p| p.owner_id == o.id) {
                    count += 1;
                    value += p.price * Decimal::from(p.inventory);
                }
                OwnerRollup {
                    owner_name: o.name.clone(),
                    count,
                    value,
                }
            })
            .collect())
    }

    fn recent_products(&self, limit: usize) -> Result<Vec<Product>, StoreError> {
        let inner = self.read()?;
        let mut products: Vec<Product> = inner.products.to_vec();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products.truncate(limit);
        Ok(products)
    }
}

//! Catalog operations over a record store.
//!
//! This is the create/read/update/delete and listing surface: raw query
//! strings in, typed pages and entities out. Every function is stateless and
//! takes the store as an argument; there is no shared in-process state.
//!
//! Slug uniqueness follows the retry-on-conflict discipline documented in
//! [`crate::slug`]: a unique-violation on the slug column during insert or
//! update triggers exactly one re-probe and retry before surfacing a
//! conflict to the caller.

use serde::Serialize;

use crate::error::{CatalogError, StoreError};
use crate::model::{NewOwner, NewProduct, Owner, Product, ProductPatch};
use crate::pagination::{Page, PageWindow, Pagination};
use crate::query::filter::ProductFilter;
use crate::query::owner_resolver::resolve_owner_ids;
use crate::query::params::ListQuery;
use crate::slug::{slugify, unique_owner_slug, unique_product_slug};
use crate::store::{CatalogStore, ProductChanges};

/// List products for a raw request query string.
///
/// Parsing is lenient and never fails; the only error source is the store.
/// A page past the end yields an empty `data` with the true totals.
pub fn list_products(
    store: &dyn CatalogStore,
    raw_query: &str,
) -> Result<Page<Product>, CatalogError> {
    let query = ListQuery::parse(raw_query);
    let owner_ids = resolve_owner_ids(store, &query.owner_tokens)?;
    let filter = ProductFilter::from_query(&query, owner_ids);
    let window = PageWindow::of(query.page, query.limit);

    log::debug!(
        "listing products: filter={filter:?} sort={:?} window={window:?}",
        query.sort
    );

    let data = store.find_products(&filter, query.sort, window)?;
    let total = store.count_products(&filter)?;

    Ok(Page {
        data,
        pagination: Pagination::new(query.page, query.limit, total),
    })
}

/// Look up a product by path segment: a fully numeric segment resolves as an
/// id, anything else as a slug.
pub fn get_product(store: &dyn CatalogStore, id_or_slug: &str) -> Result<Product, CatalogError> {
    let found = match id_or_slug.parse::<i32>() {
        Ok(id) => store.product_by_id(id)?,
        Err(_) => store.product_by_slug(id_or_slug)?,
    };
    found.ok_or(CatalogError::NotFound("product"))
}

/// Create a product: validate, reject duplicate sku, require the owner to
/// exist, allocate a slug, insert.
pub fn create_product(
    store: &dyn CatalogStore,
    input: &NewProduct,
) -> Result<Product, CatalogError> {
    let input = input.validated()?;

    if store.product_by_sku(&input.sku)?.is_some() {
        return Err(sku_conflict());
    }
    if store.owner_by_id(input.owner_id)?.is_none() {
        return Err(CatalogError::NotFound("owner"));
    }

    let base = slugify(&input.name);
    let slug = unique_product_slug(store, &base, None)?;
    match store.insert_product(&input, &slug) {
        Ok(product) => Ok(product),
        Err(StoreError::UniqueViolation { field: "slug" }) => {
            // Lost a slug race between probe and insert; re-probe once
            log::warn!("slug {slug} was taken concurrently, re-probing");
            let slug = unique_product_slug(store, &base, None)?;
            store
                .insert_product(&input, &slug)
                .map_err(map_product_write_error)
        }
        Err(e) => Err(map_product_write_error(e)),
    }
}

/// Update a product resolved by id-or-slug. The slug is recomputed only when
/// the name actually changes, excluding the product's own row.
pub fn update_product(
    store: &dyn CatalogStore,
    id_or_slug: &str,
    patch: &ProductPatch,
) -> Result<Product, CatalogError> {
    let existing = get_product(store, id_or_slug)?;
    let patch = patch.validated()?;

    if let Some(sku) = &patch.sku {
        if sku != &existing.sku && store.product_by_sku(sku)?.is_some() {
            return Err(sku_conflict());
        }
    }
    if let Some(owner_id) = patch.owner_id {
        if owner_id != existing.owner_id && store.owner_by_id(owner_id)?.is_none() {
            return Err(CatalogError::NotFound("owner"));
        }
    }

    let renamed = patch
        .name
        .as_deref()
        .filter(|name| *name != existing.name);
    let base = renamed.map(slugify);
    let slug = match &base {
        Some(base) => Some(unique_product_slug(store, base, Some(existing.id))?),
        None => None,
    };

    let mut changes = ProductChanges {
        sku: patch.sku.clone(),
        name: patch.name.clone(),
        slug,
        description: patch.description.clone(),
        price: patch.price,
        inventory: patch.inventory,
        image_url: patch.image_url.clone(),
        status: patch.status,
        owner_id: patch.owner_id,
    };

    match store.update_product(existing.id, &changes) {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(CatalogError::NotFound("product")),
        Err(StoreError::UniqueViolation { field: "slug" }) => {
            let base = match &base {
                Some(base) => base,
                // A slug conflict without a rename cannot be retried
                None => return Err(slug_conflict()),
            };
            log::warn!("slug conflict while renaming product {}, re-probing", existing.id);
            changes.slug = Some(unique_product_slug(store, base, Some(existing.id))?);
            match store.update_product(existing.id, &changes) {
                Ok(Some(product)) => Ok(product),
                Ok(None) => Err(CatalogError::NotFound("product")),
                Err(e) => Err(map_product_write_error(e)),
            }
        }
        Err(e) => Err(map_product_write_error(e)),
    }
}

/// Delete a product resolved by id-or-slug.
pub fn delete_product(store: &dyn CatalogStore, id_or_slug: &str) -> Result<(), CatalogError> {
    let existing = get_product(store, id_or_slug)?;
    if store.delete_product(existing.id)? {
        Ok(())
    } else {
        Err(CatalogError::NotFound("product"))
    }
}

/// An owner with its product count, as returned by [`list_owners`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    #[serde(flatten)]
    pub owner: Owner,
    pub product_count: u64,
}

/// All owners with product counts, name ascending.
pub fn list_owners(store: &dyn CatalogStore) -> Result<Vec<OwnerSummary>, CatalogError> {
    let mut owners: Vec<OwnerSummary> = store
        .owners_with_product_counts()?
        .into_iter()
        .map(|(owner, product_count)| OwnerSummary {
            owner,
            product_count,
        })
        .collect();
    owners.sort_by(|a, b| a.owner.name.cmp(&b.owner.name));
    Ok(owners)
}

/// Look up an owner by path segment, id first for numeric segments.
pub fn get_owner(store: &dyn CatalogStore, id_or_slug: &str) -> Result<Owner, CatalogError> {
    let found = match id_or_slug.parse::<i32>() {
        Ok(id) => store.owner_by_id(id)?,
        Err(_) => store.owner_by_slug(id_or_slug)?,
    };
    found.ok_or(CatalogError::NotFound("owner"))
}

/// Create an owner with a slug unique in the owner namespace.
pub fn create_owner(store: &dyn CatalogStore, input: &NewOwner) -> Result<Owner, CatalogError> {
    let input = input.validated()?;
    let base = slugify(&input.name);
    let slug = unique_owner_slug(store, &base)?;
    match store.insert_owner(&input, &slug) {
        Ok(owner) => Ok(owner),
        Err(StoreError::UniqueViolation { field: "slug" }) => {
            log::warn!("owner slug {slug} was taken concurrently, re-probing");
            let slug = unique_owner_slug(store, &base)?;
            store.insert_owner(&input, &slug).map_err(|e| match e {
                StoreError::UniqueViolation { .. } => slug_conflict(),
                other => CatalogError::Store(other),
            })
        }
        Err(e) => Err(CatalogError::Store(e)),
    }
}

fn sku_conflict() -> CatalogError {
    CatalogError::Conflict {
        field: "sku",
        message: "Product with this SKU already exists".into(),
    }
}

fn slug_conflict() -> CatalogError {
    CatalogError::Conflict {
        field: "slug",
        message: "Could not allocate a unique slug".into(),
    }
}

fn map_product_write_error(err: StoreError) -> CatalogError {
    match err {
        StoreError::UniqueViolation { field: "sku" } => sku_conflict(),
        StoreError::UniqueViolation { .. } => slug_conflict(),
        other => CatalogError::Store(other),
    }
}

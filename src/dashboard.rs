//! Read-only dashboard metrics.
//!
//! Best-effort by contract: a store failure here must never take the
//! dashboard down, so every function catches the error, logs it, and returns
//! its documented zero/empty default instead of propagating.

use chrono::{Months, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::CatalogConfig;
use crate::error::StoreError;
use crate::model::{Product, ProductStatus};
use crate::query::filter::ProductFilter;
use crate::store::CatalogStore;

/// Headline dashboard numbers. All zeros when the store is unreachable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: u64,
    pub total_owners: u64,
    pub active_products: u64,
    pub inactive_products: u64,
    pub discontinued_products: u64,
    pub low_inventory_count: u64,
    pub total_inventory_value: Decimal,
}

/// One slice of the status breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ProductStatus,
    pub count: u64,
}

/// Creation count for one month bucket (`"YYYY-MM"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}

/// Per-owner product count and inventory value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerProducts {
    pub owner_name: String,
    pub count: u64,
    pub value: Decimal,
}

fn count_with_status(store: &dyn CatalogStore, status: ProductStatus) -> Result<u64, StoreError> {
    store.count_products(&ProductFilter {
        statuses: vec![status],
        ..ProductFilter::default()
    })
}

/// Headline stats; zeros on store failure.
pub fn dashboard_stats(store: &dyn CatalogStore, config: &CatalogConfig) -> DashboardStats {
    let fetch = || -> Result<DashboardStats, StoreError> {
        Ok(DashboardStats {
            total_products: store.count_products(&ProductFilter::default())?,
            total_owners: store.count_owners()?,
            active_products: count_with_status(store, ProductStatus::Active)?,
            inactive_products: count_with_status(store, ProductStatus::Inactive)?,
            discontinued_products: count_with_status(store, ProductStatus::Discontinued)?,
            low_inventory_count: store
                .count_products_below_inventory(config.low_stock_threshold)?,
            total_inventory_value: store.inventory_value()?,
        })
    };
    fetch().unwrap_or_else(|e| {
        log::error!("dashboard_stats failed: {e}");
        DashboardStats::default()
    })
}

/// Product counts per status; empty on store failure.
pub fn status_counts(store: &dyn CatalogStore) -> Vec<StatusCount> {
    let fetch = || -> Result<Vec<StatusCount>, StoreError> {
        ProductStatus::ALL
            .iter()
            .map(|&status| {
                Ok(StatusCount {
                    status,
                    count: count_with_status(store, status)?,
                })
            })
            .collect()
    };
    fetch().unwrap_or_else(|e| {
        log::error!("status_counts failed: {e}");
        Vec::new()
    })
}

/// Monthly creation counts over the trailing window; empty on store failure.
pub fn products_over_time(store: &dyn CatalogStore, config: &CatalogConfig) -> Vec<MonthlyCount> {
    let months = config.trailing_months.max(1);
    let now = Utc::now();
    let since = now.checked_sub_months(Months::new(months)).unwrap_or(now);
    match store.monthly_product_counts(since) {
        Ok(buckets) => buckets
            .into_iter()
            .map(|(month, count)| MonthlyCount { month, count })
            .collect(),
        Err(e) => {
            log::error!("products_over_time failed: {e}");
            Vec::new()
        }
    }
}

/// Per-owner rollup ranked by product count descending, truncated to the
/// configured top-N; empty on store failure.
pub fn products_by_owner(store: &dyn CatalogStore, config: &CatalogConfig) -> Vec<OwnerProducts> {
    match store.owner_product_rollup() {
        Ok(rollup) => {
            let mut rows: Vec<OwnerProducts> = rollup
                .into_iter()
                .map(|r| OwnerProducts {
                    owner_name: r.owner_name,
                    count: r.count,
                    value: r.value,
                })
                .collect();
            rows.sort_by(|a, b| b.count.cmp(&a.count));
            rows.truncate(config.top_owners_limit);
            rows
        }
        Err(e) => {
            log::error!("products_by_owner failed: {e}");
            Vec::new()
        }
    }
}

/// Products under the low-stock threshold, lowest inventory first; empty on
/// store failure.
pub fn low_stock_products(store: &dyn CatalogStore, config: &CatalogConfig) -> Vec<Product> {
    store
        .products_below_inventory(config.low_stock_threshold, config.low_stock_limit)
        .unwrap_or_else(|e| {
            log::error!("low_stock_products failed: {e}");
            Vec::new()
        })
}

/// Most recently created products; empty on store failure.
pub fn recent_products(store: &dyn CatalogStore, config: &CatalogConfig) -> Vec<Product> {
    store
        .recent_products(config.recent_products_limit)
        .unwrap_or_else(|e| {
            log::error!("recent_products failed: {e}");
            Vec::new()
        })
}

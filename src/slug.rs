//! Slug derivation and unique allocation.
//!
//! A slug is computed once at entity creation and recomputed (against the
//! same collection, excluding the entity's own row) whenever the source name
//! changes. Product and Owner slugs live in separate namespaces.
//!
//! The check-then-allocate sequence here is NOT atomic: two concurrent
//! creations sharing a normalized base can both pass the probe and then race
//! on persist. The store's unique constraint is the correctness boundary,
//! not this probe; callers must treat a [`StoreError::UniqueViolation`] from
//! the surrounding create/update as a retryable conflict (re-probe with a
//! fresh suffix) rather than a crash. An in-process lock would not help,
//! since writers may be distributed across processes.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::StoreError;
use crate::store::CatalogStore;

/// Probe bound before giving up on numeric suffixes.
pub const MAX_SLUG_ATTEMPTS: u32 = 1000;

/// Fallback for names that normalize to nothing.
pub const SLUG_FALLBACK: &str = "item";

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));
static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9-]").expect("slug charset regex is valid"));
static HYPHEN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("hyphen regex is valid"));

/// Normalize a display name into a URL-safe slug base.
///
/// Lowercase, trim, whitespace runs to a single hyphen, strip everything
/// outside `[a-z0-9-]`, collapse repeated hyphens, trim leading/trailing
/// hyphens; an empty result becomes `"item"`.
pub fn slugify(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let hyphenated = WHITESPACE_RUN.replace_all(&lowered, "-");
    let stripped = NON_SLUG_CHARS.replace_all(&hyphenated, "");
    let collapsed = HYPHEN_RUN.replace_all(&stripped, "-");
    let trimmed = collapsed.trim_matches('-');
    if trimmed.is_empty() {
        SLUG_FALLBACK.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Probe `base`, then `base-2`, `base-3`, ... until `taken` reports a free
/// candidate; after [`MAX_SLUG_ATTEMPTS`] fall back to a timestamp suffix to
/// guarantee termination with near-certain uniqueness.
fn allocate<F>(base: &str, mut taken: F) -> Result<String, StoreError>
where
    F: FnMut(&str) -> Result<bool, StoreError>,
{
    let mut candidate = base.to_string();
    let mut suffix = 2u32;
    for _ in 0..MAX_SLUG_ATTEMPTS {
        if !taken(&candidate)? {
            return Ok(candidate);
        }
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    Ok(format!("{base}-{}", Utc::now().timestamp_millis()))
}

/// Allocate a slug unique within the product collection. `exclude` skips the
/// entity's own row when renaming in place.
pub fn unique_product_slug(
    store: &dyn CatalogStore,
    base: &str,
    exclude: Option<i32>,
) -> Result<String, StoreError> {
    allocate(base, |candidate| store.product_slug_taken(candidate, exclude))
}

/// Allocate a slug unique within the owner collection.
pub fn unique_owner_slug(store: &dyn CatalogStore, base: &str) -> Result<String, StoreError> {
    allocate(base, |candidate| store.owner_slug_taken(candidate))
}

//! Resolution of mixed owner tokens (numeric ids or slugs) to internal ids.
//!
//! One store lookup resolves `id IN candidate_ids OR slug IN candidate_slugs`
//! into actual rows. Unmatched tokens are silently ignored; they contribute
//! nothing to the filter but never invalidate the query. An empty input
//! yields an empty output, which downstream means "no owner constraint".

use std::collections::BTreeSet;

use crate::error::StoreError;
use crate::store::CatalogStore;

/// Split tokens into id candidates (full integer parse) and slug candidates
/// (trimmed; blanks dropped).
pub(crate) fn classify_tokens(tokens: &[String]) -> (Vec<i32>, Vec<String>) {
    let mut ids = Vec::new();
    let mut slugs = Vec::new();
    for token in tokens {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.parse::<i32>() {
            Ok(id) => ids.push(id),
            Err(_) => slugs.push(trimmed.to_string()),
        }
    }
    (ids, slugs)
}

/// Resolve caller-supplied owner tokens to the distinct set of matching
/// internal ids.
pub fn resolve_owner_ids(
    store: &dyn CatalogStore,
    tokens: &[String],
) -> Result<BTreeSet<i32>, StoreError> {
    let (ids, slugs) = classify_tokens(tokens);
    if ids.is_empty() && slugs.is_empty() {
        return Ok(BTreeSet::new());
    }
    let owners = store.find_owners(&ids, &slugs)?;
    Ok(owners.into_iter().map(|o| o.id).collect())
}

//! Query compilation for product listings.
//!
//! Turns untrusted list-request parameters into a bounded, typed plan:
//!
//! - [`params`]: lenient parsing of the raw query string into a [`ListQuery`]
//! - [`filter`]: the compiled predicate, evaluated in-process or rendered to
//!   SQL through SeaQuery
//! - [`owner_resolver`]: mixed id/slug owner tokens resolved to internal ids
//!
//! Parsing never fails; invalid input degrades to defaults because this
//! faces arbitrary caller-supplied query strings.

pub mod filter;
pub mod owner_resolver;
pub mod params;

#[doc(inline)]
pub use filter::{build_count_select, build_list_select, ProductFilter, Products, SortDirection, SortField, SortSpec};
#[doc(inline)]
pub use owner_resolver::resolve_owner_ids;
#[doc(inline)]
pub use params::{ListQuery, LIMIT_DEFAULT, LIMIT_MAX, PAGE_DEFAULT, SEARCH_MAX_LEN};

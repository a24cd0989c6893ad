//! Client-side filter/search/sort/page synchronizer.
//!
//! The canonical state is a shareable query string ([`FilterState`] is its
//! typed form); every UI affordance reads from it and writes to it. The
//! controller is a pure state machine: the host drives it with explicit
//! millisecond timestamps and fetch-completion callbacks, which keeps the
//! debounce and ordering logic deterministic and testable without a runtime.
//!
//! Each canonical-state write bumps a monotonic version and issues exactly
//! one [`FetchRequest`]. A completion for anything but the newest version is
//! reported as [`FetchOutcome::Stale`] and must be discarded by the host,
//! never rendered; that is the whole ordering/cancellation story, since only
//! one logical update applies per cooperative turn.

use url::form_urlencoded;

use crate::model::ProductStatus;
use crate::query::filter::{SortDirection, SortField, SortSpec};
use crate::query::params::ListQuery;

/// Quiet interval before buffered free-text commits to the canonical state.
pub const SEARCH_DEBOUNCE_MS: u64 = 400;

/// Typed form of the canonical query string.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Committed search text; empty means no search constraint.
    pub search: String,
    pub statuses: Vec<ProductStatus>,
    /// Raw owner tokens (ids or slugs) as they appear in the query string.
    pub owners: Vec<String>,
    pub sort: SortSpec,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            statuses: Vec::new(),
            owners: Vec::new(),
            sort: SortSpec::default(),
            page: 1,
        }
    }
}

impl FilterState {
    /// Parse a shared query string leniently; unknown values degrade to
    /// defaults exactly as on the server side.
    pub fn from_query_string(query: &str) -> Self {
        let parsed = ListQuery::parse(query);
        Self {
            search: parsed.search.unwrap_or_default(),
            statuses: parsed.statuses,
            owners: parsed.owner_tokens,
            sort: parsed.sort,
            page: parsed.page,
        }
    }

    /// Render the canonical query string. Field order is fixed so equal
    /// states always produce byte-identical strings.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if !self.search.is_empty() {
            serializer.append_pair("search", &self.search);
        }
        for status in &self.statuses {
            serializer.append_pair("status", status.as_str());
        }
        for owner in &self.owners {
            serializer.append_pair("owner", owner);
        }
        serializer.append_pair("sortBy", self.sort.field.as_param());
        serializer.append_pair("sortOrder", self.sort.direction.as_param());
        serializer.append_pair("page", &self.page.to_string());
        serializer.finish()
    }
}

/// Whether a fetch for the current canonical state is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    FetchPending,
}

/// The single authoritative fetch issued for a canonical-state write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub version: u64,
    pub query: String,
}

/// Result of reporting a fetch completion back to the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response corresponds to the newest canonical state; render it.
    Applied,
    /// An older in-flight response; discard it silently.
    Stale,
}

#[derive(Debug, Clone)]
struct SearchDraft {
    text: String,
    deadline_ms: u64,
}

/// The filter/search/sort/page controller.
#[derive(Debug)]
pub struct ListSynchronizer {
    state: FilterState,
    version: u64,
    phase: SyncPhase,
    draft: Option<SearchDraft>,
}

impl ListSynchronizer {
    pub fn new(initial: FilterState) -> Self {
        Self {
            state: initial,
            version: 0,
            phase: SyncPhase::Idle,
            draft: None,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Version of the newest canonical state; completions for anything older
    /// are stale.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn issue(&mut self) -> FetchRequest {
        self.version += 1;
        self.phase = SyncPhase::FetchPending;
        FetchRequest {
            version: self.version,
            query: self.state.to_query_string(),
        }
    }

    /// Buffer a free-text edit. Nothing is written to the canonical state
    /// until the quiet interval elapses; each edit restarts the timer.
    pub fn edit_search(&mut self, text: &str, now_ms: u64) {
        self.draft = Some(SearchDraft {
            text: text.to_string(),
            deadline_ms: now_ms + SEARCH_DEBOUNCE_MS,
        });
    }

    /// Advance the debounce clock. When the buffered text has been quiet for
    /// the full interval it commits (trimmed) to the canonical `search` and
    /// resets the page; committing text equal to the canonical value is a
    /// no-op write and issues nothing.
    pub fn poll(&mut self, now_ms: u64) -> Option<FetchRequest> {
        let due = matches!(&self.draft, Some(d) if d.deadline_ms <= now_ms);
        if !due {
            return None;
        }
        let draft = self.draft.take()?;
        let committed = draft.text.trim();
        if committed == self.state.search {
            return None;
        }
        self.state.search = committed.to_string();
        self.state.page = 1;
        Some(self.issue())
    }

    /// Toggle a status filter entry; resets the page.
    pub fn toggle_status(&mut self, status: ProductStatus) -> FetchRequest {
        match self.state.statuses.iter().position(|s| *s == status) {
            Some(index) => {
                self.state.statuses.remove(index);
            }
            None => self.state.statuses.push(status),
        }
        self.state.page = 1;
        self.issue()
    }

    /// Toggle an owner filter entry; resets the page.
    pub fn toggle_owner(&mut self, token: &str) -> FetchRequest {
        match self.state.owners.iter().position(|o| o == token) {
            Some(index) => {
                self.state.owners.remove(index);
            }
            None => self.state.owners.push(token.to_string()),
        }
        self.state.page = 1;
        self.issue()
    }

    /// Sort-column interaction: the active column reverses direction, an
    /// inactive column becomes active ascending. Resets the page.
    pub fn sort_on(&mut self, field: SortField) -> FetchRequest {
        if self.state.sort.field == field {
            self.state.sort.direction = self.state.sort.direction.toggled();
        } else {
            self.state.sort = SortSpec {
                field,
                direction: SortDirection::Asc,
            };
        }
        self.state.page = 1;
        self.issue()
    }

    /// Explicit page navigation; touches nothing but the page.
    pub fn go_to_page(&mut self, page: u32) -> FetchRequest {
        self.state.page = page.max(1);
        self.issue()
    }

    /// Clear status/owner filters only, leaving search and sort untouched.
    /// A no-op reset (nothing was set) performs no canonical-state write.
    pub fn reset_filters(&mut self) -> Option<FetchRequest> {
        if self.state.statuses.is_empty() && self.state.owners.is_empty() {
            return None;
        }
        self.state.statuses.clear();
        self.state.owners.clear();
        self.state.page = 1;
        Some(self.issue())
    }

    /// Report a fetch completion. Only the newest version applies; anything
    /// else is stale and must not overwrite newer results.
    pub fn complete_fetch(&mut self, version: u64) -> FetchOutcome {
        if version == self.version {
            self.phase = SyncPhase::Idle;
            FetchOutcome::Applied
        } else {
            FetchOutcome::Stale
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_query_string_round_trips() {
        let state = FilterState {
            search: "usb hub".into(),
            statuses: vec![ProductStatus::Active, ProductStatus::Inactive],
            owners: vec!["7".into(), "acme-corp".into()],
            sort: SortSpec {
                field: SortField::Price,
                direction: SortDirection::Asc,
            },
            page: 3,
        };
        let query = state.to_query_string();
        assert_eq!(FilterState::from_query_string(&query), state);
    }

    #[test]
    fn debounced_edits_commit_exactly_once() {
        let mut sync = ListSynchronizer::new(FilterState::default());
        sync.edit_search("a", 0);
        sync.edit_search("ab", 50);
        sync.edit_search("abc", 100);

        // Quiet interval not yet elapsed since the last edit
        assert_eq!(sync.poll(450), None);

        let request = sync.poll(500).expect("debounce should fire");
        assert_eq!(request.version, 1);
        assert!(request.query.contains("search=abc"));
        assert_eq!(sync.state().search, "abc");
        assert_eq!(sync.state().page, 1);

        // Nothing left to commit
        assert_eq!(sync.poll(1000), None);
    }

    #[test]
    fn committing_unchanged_search_is_a_no_op() {
        let mut sync = ListSynchronizer::new(FilterState {
            search: "widget".into(),
            ..FilterState::default()
        });
        sync.edit_search("  widget  ", 0);
        assert_eq!(sync.poll(400), None);
        assert_eq!(sync.version(), 0);
    }

    #[test]
    fn search_commit_resets_page() {
        let mut sync = ListSynchronizer::new(FilterState {
            page: 5,
            ..FilterState::default()
        });
        sync.edit_search("hub", 0);
        let request = sync.poll(400).unwrap();
        assert!(request.query.contains("page=1"));
    }

    #[test]
    fn status_toggle_adds_then_removes() {
        let mut sync = ListSynchronizer::new(FilterState {
            page: 4,
            ..FilterState::default()
        });
        let request = sync.toggle_status(ProductStatus::Active);
        assert!(request.query.contains("status=ACTIVE"));
        assert_eq!(sync.state().page, 1);

        let request = sync.toggle_status(ProductStatus::Active);
        assert!(!request.query.contains("status=ACTIVE"));
    }

    #[test]
    fn sort_interaction_toggles_and_activates() {
        let mut sync = ListSynchronizer::new(FilterState::default());

        // Inactive column becomes active ascending
        let request = sync.sort_on(SortField::Price);
        assert!(request.query.contains("sortBy=price"));
        assert!(request.query.contains("sortOrder=asc"));

        // Active column reverses
        let request = sync.sort_on(SortField::Price);
        assert!(request.query.contains("sortOrder=desc"));

        // Page always resets
        sync.go_to_page(7);
        sync.sort_on(SortField::Name);
        assert_eq!(sync.state().page, 1);
    }

    #[test]
    fn page_navigation_touches_only_the_page() {
        let mut sync = ListSynchronizer::new(FilterState {
            search: "hub".into(),
            statuses: vec![ProductStatus::Active],
            ..FilterState::default()
        });
        let request = sync.go_to_page(3);
        assert!(request.query.contains("page=3"));
        assert!(request.query.contains("search=hub"));
        assert!(request.query.contains("status=ACTIVE"));
        assert_eq!(sync.state().page, 3);
    }

    #[test]
    fn reset_clears_filters_but_not_search_or_sort() {
        let mut sync = ListSynchronizer::new(FilterState {
            search: "hub".into(),
            statuses: vec![ProductStatus::Active],
            owners: vec!["7".into()],
            sort: SortSpec {
                field: SortField::Price,
                direction: SortDirection::Asc,
            },
            page: 4,
        });
        let request = sync.reset_filters().expect("filters were set");
        assert!(!request.query.contains("status="));
        assert!(!request.query.contains("owner="));
        assert!(request.query.contains("search=hub"));
        assert!(request.query.contains("sortBy=price"));
        assert_eq!(sync.state().page, 1);
    }

    #[test]
    fn no_op_reset_issues_nothing() {
        let mut sync = ListSynchronizer::new(FilterState {
            search: "hub".into(),
            ..FilterState::default()
        });
        assert_eq!(sync.reset_filters(), None);
        assert_eq!(sync.version(), 0);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut sync = ListSynchronizer::new(FilterState::default());
        let first = sync.toggle_status(ProductStatus::Active);
        let second = sync.go_to_page(2);

        // The older response arrives after the newer state was issued
        assert_eq!(sync.complete_fetch(first.version), FetchOutcome::Stale);
        assert_eq!(sync.phase(), SyncPhase::FetchPending);

        assert_eq!(sync.complete_fetch(second.version), FetchOutcome::Applied);
        assert_eq!(sync.phase(), SyncPhase::Idle);
    }

    #[test]
    fn out_of_order_arrival_keeps_newest_results() {
        let mut sync = ListSynchronizer::new(FilterState::default());
        let v1 = sync.toggle_status(ProductStatus::Active).version;
        let v2 = sync.toggle_status(ProductStatus::Inactive).version;

        // Newest finishes first; the older one must remain stale after
        assert_eq!(sync.complete_fetch(v2), FetchOutcome::Applied);
        assert_eq!(sync.complete_fetch(v1), FetchOutcome::Stale);
    }

    #[test]
    fn versions_increase_monotonically_per_write() {
        let mut sync = ListSynchronizer::new(FilterState::default());
        let a = sync.toggle_status(ProductStatus::Active).version;
        let b = sync.go_to_page(2).version;
        sync.edit_search("x", 0);
        let c = sync.poll(400).unwrap().version;
        assert!(a < b && b < c);
    }
}

//! Lenient parsing of raw list-request parameters.
//!
//! Parsing never rejects a request. Out-of-range or unparsable values fall
//! back to defaults, unknown status/sort tokens are dropped silently, and
//! over-long search text is treated as absent. This leniency is observable
//! client-facing behavior and is kept deliberately.

use url::form_urlencoded;

use crate::model::ProductStatus;
use crate::query::filter::{SortDirection, SortField, SortSpec};

pub const PAGE_DEFAULT: u32 = 1;
pub const LIMIT_DEFAULT: u32 = 10;
pub const LIMIT_MAX: u32 = 100;
pub const SEARCH_MAX_LEN: usize = 500;

/// A validated, normalized list request. Constructed fresh per request and
/// discarded after use; all downstream logic operates on this, never on raw
/// strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub statuses: Vec<ProductStatus>,
    /// Raw owner tokens (ids or slugs), resolved later in one store lookup.
    pub owner_tokens: Vec<String>,
    pub sort: SortSpec,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: PAGE_DEFAULT,
            limit: LIMIT_DEFAULT,
            search: None,
            statuses: Vec::new(),
            owner_tokens: Vec::new(),
            sort: SortSpec::default(),
        }
    }
}

impl ListQuery {
    /// Parse a raw query string (with or without a leading `?`).
    pub fn parse(query: &str) -> Self {
        let trimmed = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(form_urlencoded::parse(trimmed.as_bytes()))
    }

    /// Parse from already-decoded key/value pairs. For single-valued
    /// parameters the first occurrence wins; `status` and `owner` repeat.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut page = None;
        let mut limit = None;
        let mut search = None;
        let mut sort_by = None;
        let mut sort_order = None;
        let mut statuses = Vec::new();
        let mut owner_tokens = Vec::new();

        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "page" if page.is_none() => page = Some(value.to_string()),
                "limit" if limit.is_none() => limit = Some(value.to_string()),
                "search" if search.is_none() => search = Some(value.to_string()),
                "sortBy" if sort_by.is_none() => sort_by = Some(value.to_string()),
                "sortOrder" if sort_order.is_none() => sort_order = Some(value.to_string()),
                "status" => {
                    if let Some(status) = ProductStatus::parse(value) {
                        statuses.push(status);
                    }
                }
                "owner" => {
                    if !value.is_empty() {
                        owner_tokens.push(value.to_string());
                    }
                }
                _ => {}
            }
        }

        let page = match page.as_deref().and_then(lenient_int) {
            Some(p) if p >= 1 => clamp_u32(p),
            _ => PAGE_DEFAULT,
        };
        let limit = match limit.as_deref().and_then(lenient_int) {
            Some(l) => clamp_u32(l).clamp(1, LIMIT_MAX),
            None => LIMIT_DEFAULT,
        };
        let search = search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && s.chars().count() <= SEARCH_MAX_LEN)
            .map(str::to_string);

        let sort = SortSpec {
            field: sort_by
                .as_deref()
                .and_then(SortField::parse)
                .unwrap_or(SortField::CreatedAt),
            direction: sort_order
                .as_deref()
                .and_then(SortDirection::parse)
                .unwrap_or(SortDirection::Desc),
        };

        Self {
            page,
            limit,
            search,
            statuses,
            owner_tokens,
            sort,
        }
    }
}

/// Leading-integer parse: optional sign, then digits, trailing garbage
/// ignored. `None` when no digits are present at all.
fn lenient_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    // Cap absurdly long digit runs instead of overflowing
    let value: i64 = digits.parse().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_yields_defaults() {
        let q = ListQuery::parse("");
        assert_eq!(q, ListQuery::default());
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
        assert_eq!(q.sort.field, SortField::CreatedAt);
        assert_eq!(q.sort.direction, SortDirection::Desc);
    }

    #[test]
    fn page_defaults_on_garbage_or_out_of_range() {
        assert_eq!(ListQuery::parse("page=abc").page, 1);
        assert_eq!(ListQuery::parse("page=0").page, 1);
        assert_eq!(ListQuery::parse("page=-4").page, 1);
        assert_eq!(ListQuery::parse("page=3").page, 3);
        // parseInt-style leading-integer behavior
        assert_eq!(ListQuery::parse("page=12abc").page, 12);
    }

    #[test]
    fn limit_is_clamped_into_bounds() {
        assert_eq!(ListQuery::parse("limit=0").limit, 1);
        assert_eq!(ListQuery::parse("limit=-5").limit, 1);
        assert_eq!(ListQuery::parse("limit=250").limit, 100);
        assert_eq!(ListQuery::parse("limit=25").limit, 25);
        assert_eq!(ListQuery::parse("limit=junk").limit, 10);
    }

    #[test]
    fn search_is_trimmed_and_bounded() {
        assert_eq!(
            ListQuery::parse("search=%20widget%20").search.as_deref(),
            Some("widget")
        );
        assert_eq!(ListQuery::parse("search=%20%20").search, None);
        let long = format!("search={}", "x".repeat(SEARCH_MAX_LEN + 1));
        assert_eq!(ListQuery::parse(&long).search, None);
        let max = format!("search={}", "x".repeat(SEARCH_MAX_LEN));
        assert!(ListQuery::parse(&max).search.is_some());
    }

    #[test]
    fn search_limit_counts_characters_not_bytes() {
        // 300 two-byte characters exceed 500 bytes but not 500 characters
        let q = format!("search={}", "é".repeat(300));
        assert!(ListQuery::parse(&q).search.is_some());

        let q = format!("search={}", "é".repeat(SEARCH_MAX_LEN + 1));
        assert_eq!(ListQuery::parse(&q).search, None);
    }

    #[test]
    fn unknown_statuses_are_dropped_silently() {
        let q = ListQuery::parse("status=ACTIVE&status=BOGUS&status=DISCONTINUED");
        assert_eq!(
            q.statuses,
            vec![ProductStatus::Active, ProductStatus::Discontinued]
        );
        assert!(ListQuery::parse("status=BOGUS").statuses.is_empty());
    }

    #[test]
    fn owner_tokens_repeat_and_blanks_drop() {
        let q = ListQuery::parse("owner=7&owner=acme-corp&owner=");
        assert_eq!(q.owner_tokens, vec!["7", "acme-corp"]);
    }

    #[test]
    fn unrecognized_sort_falls_back() {
        let q = ListQuery::parse("sortBy=evil&sortOrder=sideways");
        assert_eq!(q.sort, SortSpec::default());

        let q = ListQuery::parse("sortBy=price&sortOrder=asc");
        assert_eq!(q.sort.field, SortField::Price);
        assert_eq!(q.sort.direction, SortDirection::Asc);
    }

    #[test]
    fn first_occurrence_wins_for_single_params() {
        let q = ListQuery::parse("page=2&page=9");
        assert_eq!(q.page, 2);
    }

    #[test]
    fn leading_question_mark_is_tolerated() {
        assert_eq!(ListQuery::parse("?page=2").page, 2);
    }
}

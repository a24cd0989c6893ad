//! The compiled listing predicate and sort order.
//!
//! [`ProductFilter`] is the single source of truth for filter semantics:
//! `matches` evaluates it against a row in-process (the in-memory store uses
//! this), and `to_condition` renders the equivalent SeaQuery condition for
//! SQL-backed stores. An empty set on any dimension means "no constraint on
//! that dimension", never "match nothing".

use std::collections::BTreeSet;

use sea_query::{Asterisk, Cond, Expr, ExprTrait, Iden, Order, SelectStatement};

use crate::model::{Product, ProductStatus};
use crate::pagination::PageWindow;
use crate::query::params::ListQuery;

/// Columns of the products table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Products {
    Table,
    Id,
    Slug,
    Sku,
    Name,
    Description,
    Price,
    Inventory,
    ImageUrl,
    Status,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

impl Iden for Products {
    fn unquoted(&self) -> &str {
        match self {
            Products::Table => "products",
            Products::Id => "id",
            Products::Slug => "slug",
            Products::Sku => "sku",
            Products::Name => "name",
            Products::Description => "description",
            Products::Price => "price",
            Products::Inventory => "inventory",
            Products::ImageUrl => "image_url",
            Products::Status => "status",
            Products::OwnerId => "owner_id",
            Products::CreatedAt => "created_at",
            Products::UpdatedAt => "updated_at",
        }
    }
}

/// Columns a listing may be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Sku,
    Price,
    Inventory,
    Status,
    CreatedAt,
}

impl SortField {
    /// Parse a `sortBy` token; unrecognized values yield `None` and the
    /// caller falls back to `createdAt`.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "name" => Some(SortField::Name),
            "sku" => Some(SortField::Sku),
            "price" => Some(SortField::Price),
            "inventory" => Some(SortField::Inventory),
            "status" => Some(SortField::Status),
            "createdAt" => Some(SortField::CreatedAt),
            _ => None,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Sku => "sku",
            SortField::Price => "price",
            SortField::Inventory => "inventory",
            SortField::Status => "status",
            SortField::CreatedAt => "createdAt",
        }
    }

    fn column(&self) -> Products {
        match self {
            SortField::Name => Products::Name,
            SortField::Sku => Products::Sku,
            SortField::Price => Products::Price,
            SortField::Inventory => Products::Inventory,
            SortField::Status => Products::Status,
            SortField::CreatedAt => Products::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn order(&self) -> Order {
        match self {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// A single-field total order. Ties are left to store-default ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// The compiled predicate over the products collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive substring, OR-matched across name, sku, description.
    pub search: Option<String>,
    pub statuses: Vec<ProductStatus>,
    pub owner_ids: BTreeSet<i32>,
}

impl ProductFilter {
    /// Combine a parsed query with the resolved owner id set.
    pub fn from_query(query: &ListQuery, owner_ids: BTreeSet<i32>) -> Self {
        Self {
            search: query.search.clone(),
            statuses: query.statuses.clone(),
            owner_ids,
        }
    }

    /// Whether every present constraint dimension admits this row.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(term) = &self.search {
            let needle = term.to_lowercase();
            let hit = product.name.to_lowercase().contains(&needle)
                || product.sku.to_lowercase().contains(&needle)
                || product
                    .description
                    .as_deref()
                    .map(|d| d.to_lowercase().contains(&needle))
                    .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&product.status) {
            return false;
        }
        if !self.owner_ids.is_empty() && !self.owner_ids.contains(&product.owner_id) {
            return false;
        }
        true
    }

    /// Render the predicate as a SeaQuery condition. Present constraints are
    /// ANDed; the search term expands to an OR of ILIKE matches.
    pub fn to_condition(&self) -> Cond {
        // Imported here rather than at module level: PgExpr's blanket impl
        // would otherwise shadow `str::contains` in `matches` above.
        use sea_query::extension::postgres::PgExpr;

        let mut cond = Cond::all();
        if let Some(term) = &self.search {
            let pattern = format!("%{}%", escape_like(term));
            cond = cond.add(
                Cond::any()
                    .add(Expr::col(Products::Name).ilike(pattern.clone()))
                    .add(Expr::col(Products::Sku).ilike(pattern.clone()))
                    .add(Expr::col(Products::Description).ilike(pattern)),
            );
        }
        if !self.statuses.is_empty() {
            cond = cond.add(
                Expr::col(Products::Status).is_in(self.statuses.iter().map(|s| s.as_str())),
            );
        }
        if !self.owner_ids.is_empty() {
            cond = cond.add(Expr::col(Products::OwnerId).is_in(self.owner_ids.iter().copied()));
        }
        cond
    }
}

/// Build the page-select statement for a SQL-backed store.
pub fn build_list_select(filter: &ProductFilter, sort: SortSpec, window: PageWindow) -> SelectStatement {
    let mut query = SelectStatement::default();
    query
        .column(Asterisk)
        .from(Products::Table)
        .cond_where(filter.to_condition())
        .order_by(sort.field.column(), sort.direction.order())
        .limit(window.take)
        .offset(window.skip);
    query
}

/// Build the matching COUNT(*) statement, without ordering or windowing.
pub fn build_count_select(filter: &ProductFilter) -> SelectStatement {
    let mut query = SelectStatement::default();
    query
        .expr(Expr::cust("COUNT(*)"))
        .from(Products::Table)
        .cond_where(filter.to_condition());
    query
}

/// Escape LIKE wildcards with backslash (the Postgres default escape).
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

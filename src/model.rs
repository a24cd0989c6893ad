//! Catalog entities and validated input types.
//!
//! `Product` and `Owner` are the store-backed rows; slugs are unique within
//! each collection (the two namespaces are independent) and the sku is unique
//! across all products in its uppercase canonical form.
//!
//! `NewProduct`, `ProductPatch`, and `NewOwner` are the write-side inputs.
//! Validation collects every field-level failure instead of stopping at the
//! first one, so callers can surface the whole set at once.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, FieldError};

pub const SKU_MAX_LENGTH: usize = 50;

static SKU_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9_-]+$").expect("sku format regex is valid"));

/// Product lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Active,
    Inactive,
    Discontinued,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 3] = [
        ProductStatus::Active,
        ProductStatus::Inactive,
        ProductStatus::Discontinued,
    ];

    /// Parse a wire token. Unknown tokens yield `None`; the query parser
    /// drops them silently rather than rejecting the request.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "ACTIVE" => Some(ProductStatus::Active),
            "INACTIVE" => Some(ProductStatus::Inactive),
            "DISCONTINUED" => Some(ProductStatus::Discontinued),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Inactive => "INACTIVE",
            ProductStatus::Discontinued => "DISCONTINUED",
        }
    }
}

/// A catalog product row. Ids and timestamps are store-assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub slug: String,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub inventory: i32,
    pub image_url: Option<String>,
    pub status: ProductStatus,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product owner row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product. `validated()` returns the canonical form:
/// sku uppercased, name trimmed, empty image URL collapsed to `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub inventory: i32,
    pub image_url: Option<String>,
    pub status: ProductStatus,
    pub owner_id: i32,
}

impl NewProduct {
    /// Validate and canonicalize. All field failures are collected.
    pub fn validated(&self) -> Result<NewProduct, CatalogError> {
        let mut errors = Vec::new();

        let sku = self.sku.trim().to_uppercase();
        if sku.is_empty() {
            errors.push(FieldError::new("sku", "SKU is required"));
        } else if sku.len() > SKU_MAX_LENGTH {
            errors.push(FieldError::new(
                "sku",
                format!("SKU must be at most {SKU_MAX_LENGTH} characters"),
            ));
        } else if !SKU_FORMAT.is_match(&sku) {
            errors.push(FieldError::new(
                "sku",
                "SKU can only contain letters, numbers, hyphens and underscores",
            ));
        }

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }

        if self.price.is_sign_negative() {
            errors.push(FieldError::new("price", "Price cannot be negative"));
        }
        if self.inventory < 0 {
            errors.push(FieldError::new("inventory", "Inventory cannot be negative"));
        }
        if self.owner_id <= 0 {
            errors.push(FieldError::new("ownerId", "Owner ID must be positive"));
        }

        if !errors.is_empty() {
            return Err(CatalogError::Validation(errors));
        }

        Ok(NewProduct {
            sku,
            name,
            description: normalize_optional(&self.description),
            price: self.price,
            inventory: self.inventory,
            image_url: normalize_optional(&self.image_url),
            status: self.status,
            owner_id: self.owner_id,
        })
    }
}

/// Partial update for a product. `None` leaves a field untouched; the
/// double-`Option` fields distinguish "clear" (`Some(None)`) from "leave".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub inventory: Option<i32>,
    pub image_url: Option<Option<String>>,
    pub status: Option<ProductStatus>,
    pub owner_id: Option<i32>,
}

impl ProductPatch {
    /// Validate and canonicalize the fields that are present.
    pub fn validated(&self) -> Result<ProductPatch, CatalogError> {
        let mut errors = Vec::new();

        let sku = match &self.sku {
            Some(raw) => {
                let sku = raw.trim().to_uppercase();
                if sku.is_empty() {
                    errors.push(FieldError::new("sku", "SKU cannot be empty"));
                } else if sku.len() > SKU_MAX_LENGTH {
                    errors.push(FieldError::new(
                        "sku",
                        format!("SKU must be at most {SKU_MAX_LENGTH} characters"),
                    ));
                } else if !SKU_FORMAT.is_match(&sku) {
                    errors.push(FieldError::new(
                        "sku",
                        "SKU can only contain letters, numbers, hyphens and underscores",
                    ));
                }
                Some(sku)
            }
            None => None,
        };

        let name = match &self.name {
            Some(raw) => {
                let name = raw.trim().to_string();
                if name.is_empty() {
                    errors.push(FieldError::new("name", "Name cannot be empty"));
                }
                Some(name)
            }
            None => None,
        };

        if matches!(self.price, Some(p) if p.is_sign_negative()) {
            errors.push(FieldError::new("price", "Price cannot be negative"));
        }
        if matches!(self.inventory, Some(i) if i < 0) {
            errors.push(FieldError::new("inventory", "Inventory cannot be negative"));
        }
        if matches!(self.owner_id, Some(id) if id <= 0) {
            errors.push(FieldError::new("ownerId", "Owner ID must be positive"));
        }

        if !errors.is_empty() {
            return Err(CatalogError::Validation(errors));
        }

        Ok(ProductPatch {
            sku,
            name,
            description: self.description.as_ref().map(normalize_optional),
            price: self.price,
            inventory: self.inventory,
            image_url: self.image_url.as_ref().map(normalize_optional),
            status: self.status,
            owner_id: self.owner_id,
        })
    }
}

/// Input for creating an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOwner {
    pub name: String,
    pub email: String,
}

impl NewOwner {
    pub fn validated(&self) -> Result<NewOwner, CatalogError> {
        let mut errors = Vec::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }

        let email = self.email.trim().to_string();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        } else if !email.contains('@') {
            errors.push(FieldError::new("email", "Email is not valid"));
        }

        if !errors.is_empty() {
            return Err(CatalogError::Validation(errors));
        }

        Ok(NewOwner { name, email })
    }
}

fn normalize_optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

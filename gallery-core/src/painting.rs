//! Painting records and the rules that hang directly off a single record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

/// Painting identifier, assigned by the store at creation.
pub type PaintingId = Uuid;

/// Image shown when a painting has no usable main image.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

// ============================================================================
// STATUS
// ============================================================================

/// Availability of a painting.
///
/// Drives purchase-control enablement and the badge shown in catalog views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintingStatus {
    #[default]
    Available,
    Sold,
    NotForSale,
    Reserved,
}

impl PaintingStatus {
    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaintingStatus::Available => "AVAILABLE",
            PaintingStatus::Sold => "SOLD",
            PaintingStatus::NotForSale => "NOT_FOR_SALE",
            PaintingStatus::Reserved => "RESERVED",
        }
    }

    /// Human label used on the detail page.
    pub fn label(&self) -> &'static str {
        match self {
            PaintingStatus::NotForSale => "Not for Sale",
            other => other.as_str(),
        }
    }

    /// Badge text for catalog tiles. Available paintings carry no badge.
    pub fn badge(&self) -> Option<String> {
        match self {
            PaintingStatus::Available => None,
            other => Some(other.label().to_uppercase()),
        }
    }

    /// Whether a purchase inquiry may be started for this status.
    pub fn accepts_inquiries(&self) -> bool {
        !matches!(self, PaintingStatus::Sold | PaintingStatus::NotForSale)
    }

    pub fn all() -> &'static [PaintingStatus] {
        &[
            PaintingStatus::Available,
            PaintingStatus::Sold,
            PaintingStatus::NotForSale,
            PaintingStatus::Reserved,
        ]
    }
}

impl fmt::Display for PaintingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaintingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AVAILABLE" => Ok(PaintingStatus::Available),
            "SOLD" => Ok(PaintingStatus::Sold),
            "NOT_FOR_SALE" => Ok(PaintingStatus::NotForSale),
            "RESERVED" => Ok(PaintingStatus::Reserved),
            other => Err(ValidationError::InvalidValue {
                field: "status".to_string(),
                reason: format!("unknown painting status '{}'", other),
            }),
        }
    }
}

// ============================================================================
// PAINTING
// ============================================================================

/// A catalog record representing one artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Painting {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: PaintingId,
    pub slug: String,
    pub title: String,
    pub medium: String,
    pub dimensions: String,
    pub year: Option<i32>,
    pub description: String,
    pub status: PaintingStatus,
    /// Price in INR, displayed verbatim.
    pub price: Option<f64>,
    pub main_image_url: String,
    /// Supplementary images in display order.
    pub additional_image_urls: Vec<String>,
    pub is_featured_home: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Painting {
    /// Main image, degraded to the placeholder when absent.
    pub fn display_image(&self) -> &str {
        if self.main_image_url.trim().is_empty() {
            PLACEHOLDER_IMAGE
        } else {
            &self.main_image_url
        }
    }

    /// Formatted price, if one is set.
    pub fn display_price(&self) -> Option<String> {
        self.price.map(format_inr)
    }

    /// The writable part of this record.
    pub fn to_draft(&self) -> PaintingDraft {
        PaintingDraft {
            slug: self.slug.clone(),
            title: self.title.clone(),
            medium: self.medium.clone(),
            dimensions: self.dimensions.clone(),
            year: self.year,
            description: self.description.clone(),
            status: self.status,
            price: self.price,
            main_image_url: self.main_image_url.clone(),
            additional_image_urls: self.additional_image_urls.clone(),
            is_featured_home: self.is_featured_home,
        }
    }
}

/// Fields written by admin create and edit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PaintingDraft {
    pub slug: String,
    pub title: String,
    pub medium: String,
    pub dimensions: String,
    pub year: Option<i32>,
    pub description: String,
    pub status: PaintingStatus,
    pub price: Option<f64>,
    pub main_image_url: String,
    pub additional_image_urls: Vec<String>,
    pub is_featured_home: bool,
}

impl PaintingDraft {
    /// Check required fields before anything is written.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("title", &self.title),
            ("slug", &self.slug),
            ("medium", &self.medium),
            ("main_image_url", &self.main_image_url),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::RequiredFieldMissing {
                    field: field.to_string(),
                });
            }
        }

        if self.slug.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidValue {
                field: "slug".to_string(),
                reason: "must not contain whitespace".to_string(),
            });
        }

        if let Some(price) = self.price {
            if !price.is_finite() || price <= 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: "price".to_string(),
                    reason: "must be a positive number".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Filter for count queries against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaintingFilter {
    pub status: Option<PaintingStatus>,
    pub featured: Option<bool>,
}

impl PaintingFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(status: PaintingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn featured() -> Self {
        Self {
            featured: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, painting: &Painting) -> bool {
        self.status.map_or(true, |s| painting.status == s)
            && self.featured.map_or(true, |f| painting.is_featured_home == f)
    }
}

// ============================================================================
// PRICE FORMATTING
// ============================================================================

/// Format an INR amount with Indian digit grouping, e.g. `₹1,50,000`.
pub fn format_inr(amount: f64) -> String {
    let paise_total = (amount.abs() * 100.0).round() as u64;
    let rupees = paise_total / 100;
    let paise = paise_total % 100;

    let mut out = String::from("₹");
    out.push_str(&group_indian(rupees));
    if paise != 0 {
        if paise % 10 == 0 {
            out.push_str(&format!(".{}", paise / 10));
        } else {
            out.push_str(&format!(".{:02}", paise));
        }
    }
    out
}

fn group_indian(n: u64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, ch) in head.chars().enumerate() {
        if i > 0 && (head.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(tail);
    out
}

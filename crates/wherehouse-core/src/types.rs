//! # Domain Types
//!
//! Core domain types used throughout WhereHouse.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                        │
//! │  │      User       │ owns   │    Location     │◄──┐ parent_location_id │
//! │  │  id, username   │───────►│  id, qr_code    │───┘ (same owner)       │
//! │  │  password_hash  │        └────────┬────────┘                        │
//! │  └────────┬────────┘                 │ location_id (set-null)          │
//! │           │ owns                     ▼                                  │
//! │           │                 ┌─────────────────┐      ┌──────────────┐  │
//! │           └────────────────►│      Item       │◄────►│     Tag      │  │
//! │                             │  id, qr_code    │ItemTag│ global name │  │
//! │                             └─────────────────┘      └──────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Items and locations have:
//! - `id`: numeric primary key, used for relations
//! - `qr_code`: opaque 32-hex-character code printed on the physical label

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// User
// =============================================================================

/// An account that owns locations and items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Salted PBKDF2 record; never leaves the server.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub is_admin: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub last_login_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Location
// =============================================================================

/// A place items are stored in. Locations form a tree per owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub qr_code: String,
    /// `None` for a root location.
    pub parent_location_id: Option<i64>,
    pub user_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Location {
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_location_id.is_none()
    }
}

/// A location with its immediate children and the items stored directly in it.
///
/// Only one level deep; grandchildren are fetched by asking for the child.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LocationDetails {
    pub location: Location,
    pub children: Vec<Location>,
    pub items: Vec<ItemSummary>,
}

// =============================================================================
// Item
// =============================================================================

/// A physical thing being tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    /// Monetary value in cents.
    pub value_cents: Option<i64>,
    pub manufacturer: Option<String>,
    pub serial_number: Option<String>,
    pub model_number: Option<String>,
    #[ts(as = "Option<String>")]
    pub purchase_date: Option<DateTime<Utc>>,
    pub qr_code: String,
    /// Absent when the item is not stored anywhere (or its location was deleted).
    pub location_id: Option<i64>,
    pub user_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Associated tags, ordered by tag id.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Item {
    /// Returns the value as a Money type.
    #[inline]
    pub fn value(&self) -> Option<Money> {
        self.value_cents.map(Money::from_cents)
    }

    /// Ids of the associated tags.
    pub fn tag_ids(&self) -> Vec<i64> {
        self.tags.iter().map(|t| t.id).collect()
    }
}

/// Compact item view used in location listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ItemSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub value_cents: Option<i64>,
    pub qr_code: String,
    pub location_id: Option<i64>,
}

// =============================================================================
// Tag
// =============================================================================

/// A label shared by all users. Names are unique (case-sensitive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    /// Display colour such as `#ff8800`.
    pub color: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// "Item carries tag". Composite key (item_id, tag_id); no ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ItemTag {
    pub item_id: i64,
    pub tag_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Label Template
// =============================================================================

/// Geometry of a printable label sheet, in inches. Shared by all users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LabelTemplate {
    pub id: i64,
    pub name: String,
    pub template_name: String,
    pub page_width: f64,
    pub page_height: f64,
    pub labels_per_row: i64,
    pub labels_per_column: i64,
    pub label_width: f64,
    pub label_height: f64,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    pub left_margin: f64,
    pub top_margin: f64,
    pub is_default: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl LabelTemplate {
    /// Number of labels on one sheet.
    #[inline]
    pub fn labels_per_sheet(&self) -> i64 {
        self.labels_per_row * self.labels_per_column
    }
}

// =============================================================================
// Search Results
// =============================================================================

/// Matches for one search query, each list sorted by id ascending.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchResults {
    pub items: Vec<Item>,
    pub locations: Vec<Location>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.locations.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with_value(value_cents: Option<i64>) -> Item {
        let now = Utc::now();
        Item {
            id: 1,
            name: "Cordless Drill".into(),
            description: None,
            notes: None,
            value_cents,
            manufacturer: None,
            serial_number: None,
            model_number: None,
            purchase_date: None,
            qr_code: "0".repeat(32),
            location_id: None,
            user_id: 1,
            created_at: now,
            updated_at: now,
            tags: vec![],
        }
    }

    #[test]
    fn test_item_value() {
        assert_eq!(item_with_value(Some(12999)).value(), Some(Money::from_cents(12999)));
        assert_eq!(item_with_value(None).value(), None);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            username: "admin".into(),
            email: String::new(),
            password_hash: "secret-record".into(),
            is_admin: true,
            created_at: Utc::now(),
            last_login_at: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-record"));
        assert!(!json.contains("password_hash"));
    }
}

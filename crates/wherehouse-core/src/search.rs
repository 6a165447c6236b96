//! # Search Matching
//!
//! Case-insensitive substring search over items and locations.
//!
//! ## Fields Searched
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Item      name, description, notes, manufacturer, serial_number,      │
//! │            model_number, names of associated tags                      │
//! │  Location  name, description                                           │
//! │                                                                         │
//! │  Any single field containing the needle includes the entity.           │
//! │  Absent optional fields never match.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Owner scoping happens in the repository; this module only matches.

use crate::error::{CoreResult, ValidationError};
use crate::types::{Item, Location};

/// A parsed, non-blank search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    /// Parses a raw query.
    ///
    /// Blank or whitespace-only input is rejected. Otherwise the text is
    /// lower-cased and kept as-is, surrounding spaces included.
    ///
    /// ```rust
    /// use wherehouse_core::search::SearchQuery;
    ///
    /// assert!(SearchQuery::parse("  ").is_err());
    /// assert_eq!(SearchQuery::parse("Drill").unwrap().needle(), "drill");
    /// ```
    pub fn parse(raw: &str) -> CoreResult<Self> {
        if raw.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "query".to_string(),
            }
            .into());
        }
        Ok(SearchQuery {
            needle: raw.to_lowercase(),
        })
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    fn hit(&self, field: &str) -> bool {
        field.to_lowercase().contains(&self.needle)
    }

    fn hit_opt(&self, field: Option<&str>) -> bool {
        field.is_some_and(|f| self.hit(f))
    }

    pub fn matches_item(&self, item: &Item) -> bool {
        self.hit(&item.name)
            || self.hit_opt(item.description.as_deref())
            || self.hit_opt(item.notes.as_deref())
            || self.hit_opt(item.manufacturer.as_deref())
            || self.hit_opt(item.serial_number.as_deref())
            || self.hit_opt(item.model_number.as_deref())
            || item.tags.iter().any(|t| self.hit(&t.name))
    }

    pub fn matches_location(&self, location: &Location) -> bool {
        self.hit(&location.name) || self.hit_opt(location.description.as_deref())
    }
}

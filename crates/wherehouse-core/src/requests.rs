//! # Requests
//!
//! Create requests and partial-update patches accepted by the repositories.
//!
//! Required fields use `Option<T>` in patches (absent = unchanged, they can
//! never be cleared). Nullable fields use [`Patch<T>`] so that "leave it" and
//! "clear it" stay distinguishable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::money::Money;
use crate::patch::Patch;
use crate::validation::{
    validate_color, validate_email, validate_name, validate_optional_text, validate_password,
    validate_tag_name, validate_username, validate_value_cents, DESCRIPTION_MAX, DETAIL_MAX,
    NOTES_MAX,
};

// =============================================================================
// Locations
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLocation {
    pub name: String,
    pub description: Option<String>,
    pub parent_location_id: Option<i64>,
}

impl NewLocation {
    pub fn validate(&self) -> CoreResult<()> {
        validate_name(&self.name)?;
        validate_optional_text("description", self.description.as_deref(), DESCRIPTION_MAX)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub description: Patch<String>,
    /// `Clear` turns the location into a root.
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub parent_location_id: Patch<i64>,
}

impl LocationPatch {
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_optional_text(
            "description",
            self.description.value().map(String::as_str),
            DESCRIPTION_MAX,
        )?;
        Ok(())
    }
}

// =============================================================================
// Items
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    /// Decimal string on the wire, e.g. `"129.99"`.
    pub value: Option<Money>,
    pub manufacturer: Option<String>,
    pub serial_number: Option<String>,
    pub model_number: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub location_id: Option<i64>,
    /// Initial tags; duplicates collapse.
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

impl NewItem {
    pub fn validate(&self) -> CoreResult<()> {
        validate_name(&self.name)?;
        validate_optional_text("description", self.description.as_deref(), DESCRIPTION_MAX)?;
        validate_optional_text("notes", self.notes.as_deref(), NOTES_MAX)?;
        validate_optional_text("manufacturer", self.manufacturer.as_deref(), DETAIL_MAX)?;
        validate_optional_text("serial_number", self.serial_number.as_deref(), DETAIL_MAX)?;
        validate_optional_text("model_number", self.model_number.as_deref(), DETAIL_MAX)?;
        if let Some(value) = self.value {
            validate_value_cents(value.cents())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub description: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub notes: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub value: Patch<Money>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub manufacturer: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub serial_number: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub model_number: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub purchase_date: Patch<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub location_id: Patch<i64>,
    /// `Some` replaces the whole tag set; `None` leaves it alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<i64>>,
}

impl ItemPatch {
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_optional_text("description", text(&self.description), DESCRIPTION_MAX)?;
        validate_optional_text("notes", text(&self.notes), NOTES_MAX)?;
        validate_optional_text("manufacturer", text(&self.manufacturer), DETAIL_MAX)?;
        validate_optional_text("serial_number", text(&self.serial_number), DETAIL_MAX)?;
        validate_optional_text("model_number", text(&self.model_number), DETAIL_MAX)?;
        if let Some(value) = self.value.value() {
            validate_value_cents(value.cents())?;
        }
        Ok(())
    }
}

fn text(patch: &Patch<String>) -> Option<&str> {
    patch.value().map(String::as_str)
}

// =============================================================================
// Tags
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
    pub color: Option<String>,
}

impl NewTag {
    pub fn validate(&self) -> CoreResult<()> {
        validate_tag_name(&self.name)?;
        if let Some(color) = &self.color {
            validate_color(color)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub color: Patch<String>,
}

impl TagPatch {
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(name) = &self.name {
            validate_tag_name(name)?;
        }
        if let Some(color) = self.color.value() {
            validate_color(color)?;
        }
        Ok(())
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl NewUser {
    pub fn validate(&self) -> CoreResult<()> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(())
    }
}

/// Admin edits to an account. The username is immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New plain-text password; stored re-hashed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl UserPatch {
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_item_patch_from_json() {
        let patch: ItemPatch = serde_json::from_str(
            r#"{"name": "Impact Driver", "notes": null, "location_id": 7, "tag_ids": [3, 3, 1]}"#,
        )
        .unwrap();

        assert_eq!(patch.name.as_deref(), Some("Impact Driver"));
        assert_eq!(patch.description, Patch::Unchanged);
        assert_eq!(patch.notes, Patch::Clear);
        assert_eq!(patch.location_id, Patch::Set(7));
        assert_eq!(patch.tag_ids, Some(vec![3, 3, 1]));
    }

    #[test]
    fn test_item_patch_checks_text_lengths() {
        let patch = ItemPatch {
            notes: Patch::Set("n".repeat(NOTES_MAX + 1)),
            ..Default::default()
        };
        assert_eq!(patch.validate().unwrap_err().kind(), ErrorKind::InvalidArgument);

        let patch = ItemPatch {
            notes: Patch::Set("n".repeat(NOTES_MAX)),
            manufacturer: Patch::Clear,
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_item_value_is_a_decimal_string() {
        let req: NewItem =
            serde_json::from_str(r#"{"name": "Drill", "value": "129.99"}"#).unwrap();
        assert_eq!(req.value, Some(Money::from_cents(12999)));

        let patch: ItemPatch = serde_json::from_str(r#"{"value": "-0.50"}"#).unwrap();
        assert_eq!(patch.value, Patch::Set(Money::from_cents(-50)));
        assert!(patch.validate().is_err());

        let patch: ItemPatch = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(patch.value, Patch::Clear);

        assert!(serde_json::from_str::<NewItem>(r#"{"name": "Drill", "value": "1.999"}"#).is_err());
    }

    #[test]
    fn test_location_patch_clear_parent() {
        let patch: LocationPatch =
            serde_json::from_str(r#"{"parent_location_id": null}"#).unwrap();
        assert_eq!(patch.parent_location_id, Patch::Clear);
        assert!(patch.name.is_none());
    }

    #[test]
    fn test_blank_name_rejected() {
        let req = NewLocation {
            name: "   ".into(),
            ..Default::default()
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let patch = ItemPatch {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_negative_value_rejected() {
        let req = NewItem {
            name: "Drill".into(),
            value: Some(Money::from_cents(-1)),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_long_color_rejected() {
        let req = NewTag {
            name: "garage".into(),
            color: Some("#ff00ff00".into()),
        };
        assert!(req.validate().is_err());
    }
}

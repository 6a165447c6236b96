//! # Tri-State Patch
//!
//! Partial updates must tell three situations apart for every nullable field:
//!
//! ```text
//! ┌──────────────────────┬──────────────────┬────────────────────────────┐
//! │ JSON body            │ Patch<T>         │ Effect on stored field     │
//! ├──────────────────────┼──────────────────┼────────────────────────────┤
//! │ field omitted        │ Unchanged        │ left as it is              │
//! │ "field": null        │ Clear            │ set to NULL                │
//! │ "field": value       │ Set(value)       │ replaced (even with "")    │
//! └──────────────────────┴──────────────────┴────────────────────────────┘
//! ```
//!
//! Fields of this type must be declared with `#[serde(default)]` so that an
//! omitted key deserialises to `Unchanged`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Change to apply to one nullable field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Leave the stored value untouched.
    #[default]
    Unchanged,
    /// Remove the stored value.
    Clear,
    /// Replace the stored value.
    Set(T),
}

impl<T> Patch<T> {
    /// True when this patch leaves the field alone.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }

    /// The new value, if this patch sets one.
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Set(v) => Some(v),
            _ => None,
        }
    }

    /// Writes the patch into a nullable field.
    pub fn apply(self, target: &mut Option<T>) {
        match self {
            Patch::Unchanged => {}
            Patch::Clear => *target = None,
            Patch::Set(v) => *target = Some(v),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Unchanged => Patch::Unchanged,
            Patch::Clear => Patch::Clear,
            Patch::Set(v) => Patch::Set(f(v)),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    /// `Some(v)` sets, `None` clears.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Clear,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; omission is handled by
        // `#[serde(default)]` on the containing field.
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    /// Pair with `skip_serializing_if = "Patch::is_unchanged"`.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Set(v) => serializer.serialize_some(v),
            Patch::Clear | Patch::Unchanged => serializer.serialize_none(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        description: Patch<String>,
    }

    #[test]
    fn test_omitted_null_and_value_are_distinct() {
        let omitted: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(omitted.description, Patch::Unchanged);

        let cleared: Body = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Patch::Clear);

        let set: Body = serde_json::from_str(r#"{"description": "Top shelf"}"#).unwrap();
        assert_eq!(set.description, Patch::Set("Top shelf".to_string()));
    }

    #[test]
    fn test_empty_string_is_a_value_not_unchanged() {
        let body: Body = serde_json::from_str(r#"{"description": ""}"#).unwrap();
        assert_eq!(body.description, Patch::Set(String::new()));
    }

    #[test]
    fn test_apply() {
        let mut field = Some("old".to_string());
        Patch::Unchanged.apply(&mut field);
        assert_eq!(field.as_deref(), Some("old"));

        Patch::Set("new".to_string()).apply(&mut field);
        assert_eq!(field.as_deref(), Some("new"));

        Patch::<String>::Clear.apply(&mut field);
        assert_eq!(field, None);
    }
}

//! # Hierarchy Rules
//!
//! Checks that keep each owner's location tree acyclic.
//!
//! ## Re-parenting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  move L under P                                                         │
//! │                                                                         │
//! │  P == L ?                              ──yes──► InvalidOperation        │
//! │     │ no                                                                │
//! │  chain = [P, parent(P), parent(parent(P)), ... root]                   │
//! │  chain empty? (P missing / not owned)  ──yes──► NotFound                │
//! │     │ no                                                                │
//! │  L ∈ chain ?                           ──yes──► InvalidOperation        │
//! │     │ no                                                                │
//! │     ▼                                                                   │
//! │  allowed                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ancestor chain itself is read from storage by the caller (one recursive
//! query). These functions only decide.

use crate::error::CoreError;

/// A re-parent rule a proposed move breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparentRule {
    /// The new parent is the location itself.
    SelfParent,
    /// The new parent does not exist for this owner.
    MissingParent,
    /// The new parent sits somewhere below the location.
    Descendant,
}

impl ReparentRule {
    /// Stable name for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ReparentRule::SelfParent => "self_parent",
            ReparentRule::MissingParent => "missing_parent",
            ReparentRule::Descendant => "descendant",
        }
    }

    /// The error reported for moving `location_id` under `new_parent_id`.
    pub fn into_error(self, location_id: i64, new_parent_id: i64) -> CoreError {
        match self {
            ReparentRule::SelfParent => {
                CoreError::InvalidOperation("A location cannot be its own parent".to_string())
            }
            ReparentRule::MissingParent => CoreError::not_found("Parent location", new_parent_id),
            ReparentRule::Descendant => CoreError::InvalidOperation(format!(
                "Location {} is a descendant of location {}; moving it there would create a cycle",
                new_parent_id, location_id
            )),
        }
    }
}

/// Decides whether `location_id` may be moved under `new_parent_id`,
/// returning the rule the move breaks if it may not.
///
/// `parent_chain` is the proposed parent followed by its ancestors up to the
/// root, restricted to the owner's locations. An empty chain means the
/// proposed parent does not exist for this owner.
pub fn broken_rule(location_id: i64, new_parent_id: i64, parent_chain: &[i64]) -> Option<ReparentRule> {
    if new_parent_id == location_id {
        return Some(ReparentRule::SelfParent);
    }
    if parent_chain.first() != Some(&new_parent_id) {
        return Some(ReparentRule::MissingParent);
    }
    if parent_chain.contains(&location_id) {
        return Some(ReparentRule::Descendant);
    }
    None
}

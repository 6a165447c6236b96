//! # Tag Association
//!
//! Replacing an item's tag set is done as a diff against what is stored:
//!
//! ```text
//!   current {1, 2, 3}      desired [3, 4, 4]
//!        │                      │
//!        └──────────┬───────────┘
//!                   ▼
//!   to_remove {1, 2}        to_add {4}        (3 untouched)
//! ```
//!
//! Duplicates in the desired list collapse and its order is ignored. Both
//! halves are applied inside one transaction by the repository.

use std::collections::BTreeSet;

/// Rows to delete and insert to turn one tag set into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub to_remove: Vec<i64>,
    pub to_add: Vec<i64>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Computes the diff from `current` to `desired`. Both outputs are sorted.
pub fn diff(current: &[i64], desired: &[i64]) -> TagDiff {
    let current: BTreeSet<i64> = current.iter().copied().collect();
    let desired: BTreeSet<i64> = desired.iter().copied().collect();

    TagDiff {
        to_remove: current.difference(&desired).copied().collect(),
        to_add: desired.difference(&current).copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff() {
        let d = diff(&[1, 2, 3], &[3, 4, 4]);
        assert_eq!(d.to_remove, vec![1, 2]);
        assert_eq!(d.to_add, vec![4]);
    }

    #[test]
    fn test_clear_all() {
        let d = diff(&[5, 6], &[]);
        assert_eq!(d.to_remove, vec![5, 6]);
        assert!(d.to_add.is_empty());
    }

    #[test]
    fn test_same_set_in_other_order_is_empty() {
        assert!(diff(&[1, 2], &[2, 1, 2]).is_empty());
    }
}

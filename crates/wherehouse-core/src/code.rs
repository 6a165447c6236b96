//! # Identity Namespace
//!
//! Issues the opaque codes printed on item and location labels.
//!
//! ## Code Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  16 bytes from the OS CSPRNG  ──hex──►  "9f86d081884c7d659a2feaa0c55ad015"
//! │                                          └──────── 32 lowercase chars ───┘
//! │                                                                         │
//! │  • Never derived from entity content                                   │
//! │  • One namespace shared by items and locations                         │
//! │  • No retry on collision: the UNIQUE index is the last line of defence │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Codes are opaque. Nothing in the system parses them for meaning; resolving
//! a code back to an entity is a lookup scoped to the requesting owner.

use std::fmt;

use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{Item, Location};

/// Random bytes per code (128 bits).
pub const CODE_BYTES: usize = 16;

/// Length of an issued code in characters.
pub const CODE_LEN: usize = CODE_BYTES * 2;

/// The two kinds of entity that share the code namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EntityKind {
    Item,
    Location,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Item => "Item",
            EntityKind::Location => "Location",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity a code resolves to for one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
#[ts(export)]
pub enum CodeTarget {
    Item(Item),
    Location(Location),
}

impl CodeTarget {
    pub fn kind(&self) -> EntityKind {
        match self {
            CodeTarget::Item(_) => EntityKind::Item,
            CodeTarget::Location(_) => EntityKind::Location,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            CodeTarget::Item(item) => &item.qr_code,
            CodeTarget::Location(location) => &location.qr_code,
        }
    }
}

/// Issues fresh opaque codes.
///
/// ```rust
/// use wherehouse_core::CodeIssuer;
///
/// let code = CodeIssuer::new().issue().unwrap();
/// assert_eq!(code.len(), 32);
/// ```
#[derive(Debug, Clone)]
pub struct CodeIssuer {
    rng: SystemRandom,
}

impl CodeIssuer {
    pub fn new() -> Self {
        CodeIssuer {
            rng: SystemRandom::new(),
        }
    }

    pub fn issue(&self) -> CoreResult<String> {
        let mut bytes = [0u8; CODE_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| CoreError::RandomUnavailable)?;
        Ok(hex::encode(bytes))
    }
}

impl Default for CodeIssuer {
    fn default() -> Self {
        Self::new()
    }
}

/// True when `code` has the shape of an issued code. Lookups use it to skip
/// the store for strings that cannot name anything.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LEN && code.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

//! # Link References
//!
//! Named byte regions inside a bytecode payload that must be overwritten with
//! a dependency's address before the code can be deployed.
//!
//! Deployment and runtime payloads each carry their own, independent list.

use crate::domain::value_objects::{Address, Bytes};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// LINK REFERENCE
// =============================================================================

/// A dependency name plus the regions of a payload that receive its address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    /// Name of the dependency contract type.
    pub name: String,
    /// Byte offsets of each region, ascending and without duplicates.
    pub offsets: BTreeSet<usize>,
    /// Width of each region in bytes.
    pub length: usize,
}

impl LinkReference {
    /// Creates a reference with the given offsets.
    pub fn new(
        name: impl Into<String>,
        offsets: impl IntoIterator<Item = usize>,
        length: usize,
    ) -> Self {
        Self {
            name: name.into(),
            offsets: offsets.into_iter().collect(),
            length,
        }
    }

    /// Creates a reference whose regions are address-wide.
    pub fn address(name: impl Into<String>, offsets: impl IntoIterator<Item = usize>) -> Self {
        Self::new(name, offsets, Address::LEN)
    }

    /// Iterates the `[start, end)` range of every region.
    pub fn regions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.offsets
            .iter()
            .map(move |&offset| (offset, offset.saturating_add(self.length)))
    }
}

// =============================================================================
// BYTECODE PAYLOAD
// =============================================================================

/// An immutable code payload together with its link references.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bytecode {
    /// Raw code bytes.
    pub code: Bytes,
    /// References to patch, in application order.
    #[serde(default)]
    pub link_references: Vec<LinkReference>,
}

impl Bytecode {
    /// Creates a payload with no link references.
    #[must_use]
    pub fn new(code: Bytes) -> Self {
        Self {
            code,
            link_references: Vec::new(),
        }
    }

    /// Creates a payload with link references.
    #[must_use]
    pub fn with_references(code: Bytes, link_references: Vec<LinkReference>) -> Self {
        Self {
            code,
            link_references,
        }
    }

    /// Returns true if the payload declares any link references.
    #[must_use]
    pub fn has_references(&self) -> bool {
        !self.link_references.is_empty()
    }

    /// Names of every dependency this payload references.
    pub fn reference_names(&self) -> impl Iterator<Item = &str> {
        self.link_references.iter().map(|r| r.name.as_str())
    }

    /// Total number of regions across all references.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.link_references.iter().map(|r| r.offsets.len()).sum()
    }
}

// =============================================================================
// TESTS
// =============================================================================

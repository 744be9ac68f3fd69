//! # Attr-Dict
//!
//! Caller-supplied mapping from link-reference name to the address that
//! should be written into that reference's regions.
//!
//! Values are held as raw bytes so that anything a caller hands over can be
//! checked; only 20-byte canonical addresses pass validation.

use crate::domain::contract_type::ContractType;
use crate::domain::value_objects::Address;
use crate::errors::LinkingError;
use std::collections::{BTreeMap, BTreeSet};

/// Name → raw address value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttrDict {
    entries: BTreeMap<String, Vec<u8>>,
}

impl AttrDict {
    /// Creates an empty attr-dict.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method adding a canonical address.
    #[must_use]
    pub fn with_address(mut self, name: impl Into<String>, address: Address) -> Self {
        self.insert_address(name, address);
        self
    }

    /// Inserts a canonical address.
    pub fn insert_address(&mut self, name: impl Into<String>, address: Address) {
        self.entries.insert(name.into(), address.as_bytes().to_vec());
    }

    /// Inserts an arbitrary value; it is checked when the dict is validated.
    pub fn insert_raw(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Returns the raw value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Address)> for AttrDict {
    fn from_iter<I: IntoIterator<Item = (N, Address)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (name, address) in iter {
            dict.insert_address(name, address);
        }
        dict
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Checks that `attr_dict` supplies exactly the names `contract` references,
/// each with a canonical address.
pub fn validate_attr_dict(contract: &ContractType, attr_dict: &AttrDict) -> Result<(), LinkingError> {
    if !contract.has_link_references() {
        return Err(LinkingError::NoLinkReferences {
            contract: contract.name().to_string(),
        });
    }

    let required = contract.required_link_names();
    let supplied: BTreeSet<&str> = attr_dict.names().collect();

    if required != supplied {
        return Err(LinkingError::AttrDictMismatch {
            missing: required
                .difference(&supplied)
                .map(ToString::to_string)
                .collect(),
            unexpected: supplied
                .difference(&required)
                .map(ToString::to_string)
                .collect(),
        });
    }

    for (name, value) in &attr_dict.entries {
        Address::try_from_canonical(value).map_err(|source| LinkingError::InvalidAddress {
            name: name.clone(),
            source,
        })?;
    }

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

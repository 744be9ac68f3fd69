//! # Placeholder Scanner
//!
//! Decides whether link-reference regions are still empty (all zero bytes).
//!
//! Emptiness is both the signal that a payload still needs linking and the
//! precondition for writing an address into a region. A linked address whose
//! bytes are all zero is indistinguishable from an unlinked placeholder; the
//! scanner reports such a region as empty.

use crate::domain::link_reference::{Bytecode, LinkReference};
use crate::errors::ValidationError;

/// Checks that `bytecode[offset..offset + length]` exists and is all zero.
pub fn validate_empty_bytes(
    offset: usize,
    length: usize,
    bytecode: &[u8],
) -> Result<(), ValidationError> {
    let region = offset
        .checked_add(length)
        .and_then(|end| bytecode.get(offset..end))
        .ok_or(ValidationError::RegionOutOfBounds {
            offset,
            length,
            payload_len: bytecode.len(),
        })?;

    if region.iter().all(|&b| b == 0) {
        Ok(())
    } else {
        Err(ValidationError::RegionNotEmpty { offset, length })
    }
}

/// Returns true if the region exists and is all zero.
#[must_use]
pub fn is_empty_region(offset: usize, length: usize, bytecode: &[u8]) -> bool {
    validate_empty_bytes(offset, length, bytecode).is_ok()
}

/// Returns false if every referenced region is empty, true otherwise.
///
/// Linking is all or nothing: a single populated region marks the whole
/// payload as pre-linked.
#[must_use]
pub fn is_prelinked_bytecode(bytecode: &[u8], link_refs: &[LinkReference]) -> bool {
    link_refs.iter().any(|link_ref| {
        link_ref
            .offsets
            .iter()
            .any(|&offset| !is_empty_region(offset, link_ref.length, bytecode))
    })
}

/// Returns true if the payload declares references and none are populated.
#[must_use]
pub fn payload_needs_linking(payload: &Bytecode) -> bool {
    payload.has_references()
        && !is_prelinked_bytecode(payload.code.as_slice(), &payload.link_references)
}

// =============================================================================
// TESTS
// =============================================================================

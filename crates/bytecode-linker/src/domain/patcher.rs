//! # Bytecode Patcher
//!
//! Writes resolved addresses into a payload's link-reference regions.
//!
//! Patching is a pure transformation: the input payload is never touched and
//! a new payload is returned only once every region has been written. Regions
//! are applied in reference-list order, then ascending offset.

use crate::domain::attr_dict::AttrDict;
use crate::domain::link_reference::LinkReference;
use crate::domain::scanner::validate_empty_bytes;
use crate::domain::value_objects::Bytes;
use crate::errors::LinkingError;
use tracing::trace;

/// Returns `bytecode` with `value` written over `[offset, offset + value.len())`.
///
/// The region must currently be empty.
pub fn apply_link_ref(
    name: &str,
    offset: usize,
    value: &[u8],
    bytecode: &mut [u8],
) -> Result<(), LinkingError> {
    validate_empty_bytes(offset, value.len(), bytecode).map_err(|source| {
        LinkingError::PatchTargetNotEmpty {
            name: name.to_string(),
            offset,
            source,
        }
    })?;

    bytecode[offset..offset + value.len()].copy_from_slice(value);
    trace!(reference = name, offset, length = value.len(), "Applied link reference");
    Ok(())
}

/// Applies every reference in `link_refs` to `bytecode`, resolving names
/// through `attr_dict`.
///
/// An empty reference list returns the payload unchanged.
pub fn apply_all_link_refs(
    bytecode: &Bytes,
    link_refs: &[LinkReference],
    attr_dict: &AttrDict,
) -> Result<Bytes, LinkingError> {
    if link_refs.is_empty() {
        return Ok(bytecode.clone());
    }

    let mut linked = bytecode.as_slice().to_vec();

    for link_ref in link_refs {
        let value = attr_dict
            .get(&link_ref.name)
            .ok_or_else(|| LinkingError::AttrDictMismatch {
                missing: vec![link_ref.name.clone()],
                unexpected: vec![],
            })?;

        if value.len() != link_ref.length {
            return Err(LinkingError::ValueLengthMismatch {
                name: link_ref.name.clone(),
                length: link_ref.length,
                value_len: value.len(),
            });
        }

        for &offset in &link_ref.offsets {
            apply_link_ref(&link_ref.name, offset, value, &mut linked)?;
        }
    }

    Ok(Bytes::from(linked))
}

// =============================================================================
// TESTS
// =============================================================================

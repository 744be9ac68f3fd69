//! # Domain Invariants
//!
//! Structural invariants a payload and its link references must satisfy
//! before a contract type can be created from them.
//!
//! - Every region lies inside the payload (`offset + length <= len`).
//! - Every reference spans at least one byte.
//! - Every reference names at least one offset.
//! - Regions of one payload never overlap.
//! - Payloads stay within the configured size limits.

use crate::domain::config::LinkerConfig;
use crate::domain::link_reference::Bytecode;

// =============================================================================
// PAYLOAD KIND
// =============================================================================

/// Which of a contract type's two payloads a check refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// Code sent to create the contract.
    Deployment,
    /// Code stored on chain after creation.
    Runtime,
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deployment => write!(f, "deployment"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Every region must lie inside the payload.
#[must_use]
pub fn check_reference_bounds(kind: PayloadKind, payload: &Bytecode) -> Vec<InvariantViolation> {
    let payload_len = payload.code.len();
    payload
        .link_references
        .iter()
        .flat_map(|link_ref| {
            link_ref.offsets.iter().filter_map(move |&offset| {
                let in_bounds = offset
                    .checked_add(link_ref.length)
                    .is_some_and(|end| end <= payload_len);
                (!in_bounds).then(|| InvariantViolation::ReferenceOutOfBounds {
                    payload: kind,
                    name: link_ref.name.clone(),
                    offset,
                    length: link_ref.length,
                    payload_len,
                })
            })
        })
        .collect()
}

/// Every reference must span at least one byte.
#[must_use]
pub fn check_reference_length(kind: PayloadKind, payload: &Bytecode) -> Vec<InvariantViolation> {
    payload
        .link_references
        .iter()
        .filter(|link_ref| link_ref.length == 0)
        .map(|link_ref| InvariantViolation::ZeroLengthReference {
            payload: kind,
            name: link_ref.name.clone(),
        })
        .collect()
}

/// Every reference must name at least one region.
#[must_use]
pub fn check_reference_offsets(kind: PayloadKind, payload: &Bytecode) -> Vec<InvariantViolation> {
    payload
        .link_references
        .iter()
        .filter(|link_ref| link_ref.offsets.is_empty())
        .map(|link_ref| InvariantViolation::EmptyOffsets {
            payload: kind,
            name: link_ref.name.clone(),
        })
        .collect()
}

/// Regions must not overlap, within or across references.
#[must_use]
pub fn check_no_overlap(kind: PayloadKind, payload: &Bytecode) -> Vec<InvariantViolation> {
    let mut regions: Vec<(usize, usize, &str)> = payload
        .link_references
        .iter()
        .flat_map(|link_ref| {
            link_ref
                .regions()
                .map(move |(start, end)| (start, end, link_ref.name.as_str()))
        })
        .collect();
    regions.sort_unstable();

    regions
        .windows(2)
        .filter(|pair| pair[1].0 < pair[0].1)
        .map(|pair| InvariantViolation::OverlappingReferences {
            payload: kind,
            first: pair[0].2.to_string(),
            second: pair[1].2.to_string(),
            offset: pair[1].0,
        })
        .collect()
}

/// Payload must fit the configured limit for its kind.
#[must_use]
pub fn check_code_size(
    kind: PayloadKind,
    payload: &Bytecode,
    config: &LinkerConfig,
) -> Option<InvariantViolation> {
    if !config.enforce_size_limits {
        return None;
    }
    let max = match kind {
        PayloadKind::Deployment => config.max_init_code_size,
        PayloadKind::Runtime => config.max_code_size,
    };
    let size = payload.code.len();
    (size > max).then_some(InvariantViolation::CodeSizeExceeded {
        payload: kind,
        size,
        max,
    })
}

/// Check all invariants for one payload.
#[must_use]
pub fn check_payload(
    kind: PayloadKind,
    payload: &Bytecode,
    config: &LinkerConfig,
) -> InvariantCheckResult {
    let mut violations = Vec::new();
    violations.extend(check_reference_length(kind, payload));
    violations.extend(check_reference_offsets(kind, payload));
    violations.extend(check_reference_bounds(kind, payload));
    violations.extend(check_no_overlap(kind, payload));
    violations.extend(check_code_size(kind, payload, config));

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

/// Check all invariants for both payloads of a contract type.
#[must_use]
pub fn check_all_invariants(
    deployment: Option<&Bytecode>,
    runtime: Option<&Bytecode>,
    config: &LinkerConfig,
) -> InvariantCheckResult {
    let violations: Vec<InvariantViolation> = [
        deployment.map(|p| (PayloadKind::Deployment, p)),
        runtime.map(|p| (PayloadKind::Runtime, p)),
    ]
    .into_iter()
    .flatten()
    .flat_map(|(kind, payload)| match check_payload(kind, payload, config) {
        InvariantCheckResult::Valid => Vec::new(),
        InvariantCheckResult::Invalid(found) => found,
    })
    .collect();

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A region extends past the end of its payload.
    ReferenceOutOfBounds {
        payload: PayloadKind,
        name: String,
        offset: usize,
        length: usize,
        payload_len: usize,
    },
    /// A reference has length zero.
    ZeroLengthReference { payload: PayloadKind, name: String },
    /// A reference lists no offsets.
    EmptyOffsets { payload: PayloadKind, name: String },
    /// Two regions share bytes.
    OverlappingReferences {
        payload: PayloadKind,
        first: String,
        second: String,
        offset: usize,
    },
    /// Payload exceeds its size limit.
    CodeSizeExceeded {
        payload: PayloadKind,
        size: usize,
        max: usize,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReferenceOutOfBounds {
                payload,
                name,
                offset,
                length,
                payload_len,
            } => write!(
                f,
                "{payload} reference `{name}` at offset {offset} of length {length} exceeds {payload_len} bytes"
            ),
            Self::ZeroLengthReference { payload, name } => {
                write!(f, "{payload} reference `{name}` has zero length")
            }
            Self::EmptyOffsets { payload, name } => {
                write!(f, "{payload} reference `{name}` has no offsets")
            }
            Self::OverlappingReferences {
                payload,
                first,
                second,
                offset,
            } => write!(
                f,
                "{payload} references `{first}` and `{second}` overlap at offset {offset}"
            ),
            Self::CodeSizeExceeded { payload, size, max } => {
                write!(f, "{payload} code size exceeded: {size} > {max} bytes")
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

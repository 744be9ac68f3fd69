//! # Error Types
//!
//! All error types for bytecode linking.
//!
//! `LinkingError` is the single error domain callers handle for anything the
//! link lifecycle rejects. Lower-level `ValidationError`s raised by the
//! placeholder scanner and address checks are converted into it at the
//! patcher and attr-dict boundaries.

use crate::domain::invariants::InvariantViolation;
use crate::domain::value_objects::{Address, Hash};
use thiserror::Error;

// =============================================================================
// VALIDATION ERRORS
// =============================================================================

/// Low-level check failures from the placeholder scanner and address parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The region contains non-zero bytes.
    #[error("region at offset {offset} of length {length} is not empty")]
    RegionNotEmpty { offset: usize, length: usize },

    /// The region extends past the end of the payload.
    #[error("region at offset {offset} of length {length} exceeds payload of {payload_len} bytes")]
    RegionOutOfBounds {
        offset: usize,
        length: usize,
        payload_len: usize,
    },

    /// The value is not a raw fixed-width address.
    #[error("expected a {expected}-byte canonical address, got {actual} bytes")]
    InvalidAddressLength { expected: usize, actual: usize },
}

// =============================================================================
// LINKING ERRORS
// =============================================================================

/// Operations gated on the link state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedOperation {
    /// Preparing a deployment transaction.
    Construct,
    /// Attaching to an already deployed address.
    Bind,
}

impl std::fmt::Display for GatedOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Construct => write!(f, "deployed"),
            Self::Bind => write!(f, "instantiated"),
        }
    }
}

/// Errors raised by the link lifecycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkingError {
    /// Construct or bind attempted while the bytecode is unlinked.
    #[error("contract `{contract}` cannot be {operation} until its bytecode is linked")]
    NotLinked {
        contract: String,
        operation: GatedOperation,
    },

    /// Link attempted on a contract type that is already linked.
    #[error("bytecode for contract `{contract}` does not require linking")]
    AlreadyLinked { contract: String },

    /// Link attempted on a contract type without any link references.
    #[error("contract `{contract}` has no link references")]
    NoLinkReferences { contract: String },

    /// The attr-dict keys do not match the required reference names.
    #[error("attr-dict does not match link references: missing {missing:?}, unexpected {unexpected:?}")]
    AttrDictMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// An attr-dict value is not a canonical address.
    #[error("address for `{name}` is not a canonical address: {source}")]
    InvalidAddress {
        name: String,
        #[source]
        source: ValidationError,
    },

    /// A bind target is not a canonical address.
    #[error("bind target is not a canonical address: {0}")]
    InvalidBindAddress(#[source] ValidationError),

    /// A patch target region already holds non-zero bytes.
    #[error("link reference `{name}` cannot be applied at offset {offset}: {source}")]
    PatchTargetNotEmpty {
        name: String,
        offset: usize,
        #[source]
        source: ValidationError,
    },

    /// A resolved value does not fill its reference's regions exactly.
    #[error("value for `{name}` is {value_len} bytes but its link reference spans {length}")]
    ValueLengthMismatch {
        name: String,
        length: usize,
        value_len: usize,
    },

    /// Construction requested without deployment bytecode.
    #[error("contract `{contract}` has no deployment bytecode")]
    MissingDeploymentBytecode { contract: String },

    /// The descriptor breaks a structural invariant.
    #[error("contract `{contract}` is malformed: {}", format_violations(.violations))]
    InvalidDescriptor {
        contract: String,
        violations: Vec<InvariantViolation>,
    },

    /// Linking completed but the result still reports unlinked regions.
    #[error("expected contract `{contract}` to be fully linked after patching (deployment {deployment:?}, runtime {runtime:?})")]
    InconsistentLinkState {
        contract: String,
        deployment: Option<Hash>,
        runtime: Option<Hash>,
    },
}

impl LinkingError {
    /// Returns true for internal-consistency failures (patcher or scanner
    /// defects), as opposed to rejected input.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InconsistentLinkState { .. })
    }
}

fn format_violations(violations: &[InvariantViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// MANIFEST ERRORS
// =============================================================================

/// Errors reading manifests and compiler output at the crate boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// Malformed JSON or unexpected shape.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// A hex field could not be decoded.
    #[error("invalid hex in `{field}`: {reason}")]
    InvalidHex { field: String, reason: String },

    /// The requested contract type is not present.
    #[error("contract type `{0}` not found")]
    ContractTypeNotFound(String),

    /// The same contract name appears under more than one source path.
    #[error("duplicate contract name `{0}` in compiler output")]
    DuplicateContractName(String),

    /// A compiler link reference does not point at a placeholder slot.
    #[error("slot `{slot}` at offset {offset} of length {length} is not a replaceable link placeholder")]
    InvalidPlaceholder {
        slot: String,
        offset: usize,
        length: usize,
    },

    /// The descriptor built from the document was rejected.
    #[error(transparent)]
    Linking(#[from] LinkingError),
}

impl From<serde_json::Error> for ManifestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Configuration rejected by `validate()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A size limit is unusable.
    #[error("invalid limit for `{field}`: {value}")]
    InvalidLimit { field: &'static str, value: usize },
}

// =============================================================================
// PROVIDER ERRORS
// =============================================================================

/// Errors from the construction/binding capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No contract code lives at the address.
    #[error("no contract code at address: {0:?}")]
    NoCodeAt(Address),

    /// The deployment was rejected by the provider.
    #[error("deployment rejected: {0}")]
    DeploymentRejected(String),

    /// The provider could not be reached.
    #[error("provider unavailable")]
    Unavailable,
}

// =============================================================================
// SERVICE ERRORS
// =============================================================================

/// Errors returned by the linking service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Lifecycle rejection.
    #[error("linking error: {0}")]
    Linking(#[from] LinkingError),

    /// Manifest or compiler-output rejection.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Provider failure.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Code found at the bind address differs from the linked runtime bytecode.
    #[error("code at {address:?} does not match runtime bytecode of `{contract}`")]
    CodeMismatch { contract: String, address: Address },

    /// The service configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

// =============================================================================
// TELEMETRY ERRORS
// =============================================================================

/// Errors raised while installing the log subscriber.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    /// A global subscriber is already installed.
    #[error("log subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}

// =============================================================================
// TESTS
// =============================================================================

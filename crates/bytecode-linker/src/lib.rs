//! # Bytecode Linker
//!
//! Link-reference resolution for contract bytecode, and the gate that keeps
//! unlinked bytecode away from deployment and binding.
//!
//! ## Purpose
//!
//! Compiled contracts that call external libraries carry empty slots where
//! each library's address belongs. A contract type moves from Unlinked to
//! Linked by patching every slot in both its deployment and runtime
//! payloads; only a Linked contract type can be deployed or bound to an
//! address.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Patch only empty regions | `domain/scanner.rs` - `validate_empty_bytes()` |
//! | Value length equals reference length | `domain/patcher.rs` - `apply_all_link_refs()` |
//! | Attr-dict names match reference names exactly | `domain/attr_dict.rs` - `validate_attr_dict()` |
//! | Link values are raw 20-byte addresses | `domain/value_objects.rs` - `Address::try_from_canonical()` |
//! | Linking yields a Linked descriptor | `domain/contract_type.rs` - `ContractType::link()` |
//! | Construct/bind require Linked | `domain/contract_type.rs` - `ensure_linked()` |
//! | References inside the payload, non-overlapping | `domain/invariants.rs` - `check_all_invariants()` |
//!
//! ## Layout
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Domain | `domain/` | Scanning, patching, lifecycle |
//! | Ports | `ports/` | `LinkingApi` (inbound), `ContractProvider` (outbound) |
//! | Adapters | `adapters/` | Manifest, compiler output, in-memory provider |
//! | Service | `service.rs` | `LinkingService` with statistics |
//! | Telemetry | `telemetry.rs` | Log subscriber setup |
//!
//! ## Usage Example
//!
//! ```ignore
//! use bytecode_linker::prelude::*;
//!
//! let service = create_test_service();
//! let escrow = service.load_contract_type(&manifest_json, "Escrow")?;
//! let linked = service.link(&escrow, &AttrDict::new().with_address("SafeSendLib", lib))?;
//! let instance = service.deploy(&linked, Bytes::new()).await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;
pub mod telemetry;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Value objects
    pub use crate::domain::value_objects::{Address, Bytes, Hash};

    // Descriptors
    pub use crate::domain::attr_dict::{validate_attr_dict, AttrDict};
    pub use crate::domain::config::LinkerConfig;
    pub use crate::domain::contract_type::{
        BoundContract, ContractType, DeploymentRequest, LinkState,
    };
    pub use crate::domain::link_reference::{Bytecode, LinkReference};

    // Domain services
    pub use crate::domain::patcher::{apply_all_link_refs, apply_link_ref};
    pub use crate::domain::scanner::{is_prelinked_bytecode, validate_empty_bytes};
    pub use crate::domain::services::{compute_contract_address, keccak256};

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::LinkingApi;
    pub use crate::ports::outbound::ContractProvider;

    // Adapters
    pub use crate::adapters::{CompilerOutput, InMemoryProvider, Manifest};

    // Errors
    pub use crate::errors::{
        GatedOperation, LinkingError, ManifestError, ProviderError, ServiceError,
        ValidationError,
    };

    // Service
    pub use crate::service::{create_test_service, LinkingService, ServiceConfig, ServiceStats};

    // Telemetry
    pub use crate::telemetry::{init_logging, LoggingConfig};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # Linkable Contract Type
//!
//! A contract type descriptor and the link lifecycle around it.
//!
//! ## States
//!
//! | State | `needs_linking` | Permitted |
//! |-------|-----------------|-----------|
//! | Unlinked | true | `link` |
//! | Linked | false | `constructor`, `bind` |
//!
//! The state is computed once, by [`ContractType::factory`], from the
//! placeholder regions of both payloads. Descriptors are never mutated:
//! `link` returns a new descriptor built through the same factory, so every
//! holder of the unlinked value keeps a valid, unchanged copy.

use crate::domain::attr_dict::{validate_attr_dict, AttrDict};
use crate::domain::config::LinkerConfig;
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::link_reference::Bytecode;
use crate::domain::patcher::apply_all_link_refs;
use crate::domain::scanner::payload_needs_linking;
use crate::domain::services::keccak256;
use crate::domain::value_objects::{Address, Bytes, Hash};
use crate::errors::{GatedOperation, LinkingError};
use std::collections::BTreeSet;
use tracing::{debug, error};

// =============================================================================
// LINK STATE
// =============================================================================

/// Lifecycle state of a contract type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkState {
    /// Every referenced region is still an empty placeholder.
    Unlinked,
    /// Ready for construction and binding.
    Linked,
}

// =============================================================================
// CONTRACT TYPE
// =============================================================================

/// Contract type descriptor: ABI, both payloads and the derived link state.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractType {
    name: String,
    abi: Option<serde_json::Value>,
    deployment: Option<Bytecode>,
    runtime: Option<Bytecode>,
    config: LinkerConfig,
    needs_linking: bool,
}

impl ContractType {
    /// Creates a descriptor, checking payload invariants and computing the
    /// initial link state.
    pub fn factory(
        name: impl Into<String>,
        deployment: Option<Bytecode>,
        runtime: Option<Bytecode>,
        config: &LinkerConfig,
    ) -> Result<Self, LinkingError> {
        let name = name.into();

        if let InvariantCheckResult::Invalid(violations) =
            check_all_invariants(deployment.as_ref(), runtime.as_ref(), config)
        {
            return Err(LinkingError::InvalidDescriptor {
                contract: name,
                violations,
            });
        }

        let needs_linking = deployment.as_ref().is_some_and(payload_needs_linking)
            || runtime.as_ref().is_some_and(payload_needs_linking);

        debug!(
            contract = %name,
            needs_linking,
            deployment_refs = deployment.as_ref().map_or(0, Bytecode::region_count),
            runtime_refs = runtime.as_ref().map_or(0, Bytecode::region_count),
            "Created contract type"
        );

        Ok(Self {
            name,
            abi: None,
            deployment,
            runtime,
            config: *config,
            needs_linking,
        })
    }

    /// Builder-style method attaching an opaque ABI.
    #[must_use]
    pub fn with_abi(mut self, abi: serde_json::Value) -> Self {
        self.abi = Some(abi);
        self
    }

    /// Contract type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opaque ABI, if one was supplied.
    #[must_use]
    pub fn abi(&self) -> Option<&serde_json::Value> {
        self.abi.as_ref()
    }

    /// Deployment payload.
    #[must_use]
    pub fn deployment_bytecode(&self) -> Option<&Bytecode> {
        self.deployment.as_ref()
    }

    /// Runtime payload.
    #[must_use]
    pub fn runtime_bytecode(&self) -> Option<&Bytecode> {
        self.runtime.as_ref()
    }

    /// Limits this descriptor was created under.
    #[must_use]
    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// True while the bytecode still holds empty placeholders.
    #[must_use]
    pub fn needs_linking(&self) -> bool {
        self.needs_linking
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn link_state(&self) -> LinkState {
        if self.needs_linking {
            LinkState::Unlinked
        } else {
            LinkState::Linked
        }
    }

    /// True if either payload declares link references.
    #[must_use]
    pub fn has_link_references(&self) -> bool {
        self.deployment.as_ref().is_some_and(Bytecode::has_references)
            || self.runtime.as_ref().is_some_and(Bytecode::has_references)
    }

    /// Union of reference names across both payloads.
    #[must_use]
    pub fn required_link_names(&self) -> BTreeSet<&str> {
        self.deployment
            .iter()
            .chain(self.runtime.iter())
            .flat_map(|payload| payload.reference_names())
            .collect()
    }

    /// Keccak-256 of the deployment code.
    #[must_use]
    pub fn deployment_code_hash(&self) -> Option<Hash> {
        self.deployment.as_ref().map(|p| keccak256(p.code.as_slice()))
    }

    /// Keccak-256 of the runtime code.
    #[must_use]
    pub fn runtime_code_hash(&self) -> Option<Hash> {
        self.runtime.as_ref().map(|p| keccak256(p.code.as_slice()))
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Returns a new, fully linked descriptor with every reference in both
    /// payloads resolved through `attr_dict`.
    pub fn link(&self, attr_dict: &AttrDict) -> Result<Self, LinkingError> {
        if !self.has_link_references() {
            return Err(LinkingError::NoLinkReferences {
                contract: self.name.clone(),
            });
        }
        if !self.needs_linking {
            return Err(LinkingError::AlreadyLinked {
                contract: self.name.clone(),
            });
        }

        validate_attr_dict(self, attr_dict)?;

        let deployment = self
            .deployment
            .as_ref()
            .map(|p| link_payload(p, attr_dict))
            .transpose()?;
        let runtime = self
            .runtime
            .as_ref()
            .map(|p| link_payload(p, attr_dict))
            .transpose()?;

        let mut linked = Self::factory(self.name.clone(), deployment, runtime, &self.config)?;
        linked.abi.clone_from(&self.abi);

        if linked.needs_linking {
            error!(contract = %self.name, "Bytecode still unlinked after patching");
            return Err(LinkingError::InconsistentLinkState {
                contract: self.name.clone(),
                deployment: linked.deployment_code_hash(),
                runtime: linked.runtime_code_hash(),
            });
        }

        Ok(linked)
    }

    /// Prepares a deployment transaction with ABI-encoded constructor
    /// arguments appended to the deployment code.
    pub fn constructor(&self, constructor_args: Bytes) -> Result<DeploymentRequest, LinkingError> {
        self.ensure_linked(GatedOperation::Construct)?;

        let deployment = self
            .deployment
            .as_ref()
            .ok_or_else(|| LinkingError::MissingDeploymentBytecode {
                contract: self.name.clone(),
            })?;

        Ok(DeploymentRequest {
            contract: self.name.clone(),
            bytecode: deployment.code.clone(),
            constructor_args,
            expected_runtime_code: self.runtime.as_ref().map(|p| p.code.clone()),
        })
    }

    /// Attaches this contract type to an already deployed address.
    ///
    /// `address` must be a raw 20-byte canonical address.
    pub fn bind(&self, address: &[u8]) -> Result<BoundContract, LinkingError> {
        self.ensure_linked(GatedOperation::Bind)?;

        let address =
            Address::try_from_canonical(address).map_err(LinkingError::InvalidBindAddress)?;

        Ok(BoundContract {
            contract: self.name.clone(),
            address,
            runtime_code_hash: self.runtime_code_hash(),
        })
    }

    fn ensure_linked(&self, operation: GatedOperation) -> Result<(), LinkingError> {
        if self.needs_linking {
            return Err(LinkingError::NotLinked {
                contract: self.name.clone(),
                operation,
            });
        }
        Ok(())
    }
}

fn link_payload(payload: &Bytecode, attr_dict: &AttrDict) -> Result<Bytecode, LinkingError> {
    let code = apply_all_link_refs(&payload.code, &payload.link_references, attr_dict)?;
    Ok(Bytecode::with_references(code, payload.link_references.clone()))
}

// =============================================================================
// CONSTRUCTION / BINDING REQUESTS
// =============================================================================

/// A deployment ready to hand to a provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentRequest {
    /// Contract type name.
    pub contract: String,
    /// Linked deployment code.
    pub bytecode: Bytes,
    /// ABI-encoded constructor arguments.
    pub constructor_args: Bytes,
    /// Linked runtime code the deployment is expected to leave behind.
    pub expected_runtime_code: Option<Bytes>,
}

impl DeploymentRequest {
    /// Keccak-256 of the expected runtime code.
    #[must_use]
    pub fn expected_runtime_code_hash(&self) -> Option<Hash> {
        self.expected_runtime_code
            .as_ref()
            .map(|code| keccak256(code.as_slice()))
    }

    /// Transaction data: deployment code followed by constructor arguments.
    #[must_use]
    pub fn init_code(&self) -> Bytes {
        let mut data = Vec::with_capacity(self.bytecode.len() + self.constructor_args.len());
        data.extend_from_slice(self.bytecode.as_slice());
        data.extend_from_slice(self.constructor_args.as_slice());
        Bytes::from(data)
    }
}

/// A linked contract type attached to an address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundContract {
    /// Contract type name.
    pub contract: String,
    /// Canonical address the instance lives at.
    pub address: Address,
    /// Hash of the linked runtime code.
    pub runtime_code_hash: Option<Hash>,
}

// =============================================================================
// TESTS
// =============================================================================

//! # Linking Service
//!
//! Ties the linker to a contract provider.
//!
//! ## Flow
//!
//! 1. Load a contract type from a manifest or from compiler output
//! 2. Link it against library addresses
//! 3. Deploy it, or attach it to an existing deployment
//!
//! Deployment and attachment are refused until the contract type is Linked;
//! the provider is never reached with unlinked bytecode.

use crate::adapters::{CompilerOutput, InMemoryProvider, Manifest};
use crate::domain::attr_dict::AttrDict;
use crate::domain::config::LinkerConfig;
use crate::domain::contract_type::{BoundContract, ContractType};
use crate::domain::services::keccak256;
use crate::domain::value_objects::Bytes;
use crate::errors::{ConfigError, LinkingError, ProviderError, ServiceError};
use crate::ports::inbound::LinkingApi;
use crate::ports::outbound::ContractProvider;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Linking service configuration.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Limits applied to every contract type the service loads.
    pub linker: LinkerConfig,
    /// Compare the code found at an attach address with the linked runtime
    /// bytecode.
    pub verify_code_on_attach: bool,
}

impl ServiceConfig {
    /// Builder-style method to enable attach-time code verification.
    #[must_use]
    pub fn with_code_verification(mut self, enabled: bool) -> Self {
        self.verify_code_on_attach = enabled;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.linker.validate()
    }
}

/// Statistics for the linking service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Contract types loaded from manifests or compiler output.
    pub contracts_loaded: u64,
    /// Calls to `link`.
    pub link_attempts: u64,
    /// Links that produced a Linked contract type.
    pub links_succeeded: u64,
    /// Links that failed.
    pub links_failed: u64,
    /// Successful deployments.
    pub deployments: u64,
    /// Successful attachments.
    pub attachments: u64,
    /// Deploy/attach calls refused because the contract type was Unlinked.
    pub rejected_operations: u64,
}

/// The main linking service.
pub struct LinkingService<P: ContractProvider> {
    config: ServiceConfig,
    provider: Arc<P>,
    stats: Arc<RwLock<ServiceStats>>,
}

impl<P: ContractProvider> LinkingService<P> {
    /// Create a service with the default configuration.
    pub fn new(provider: P) -> Self {
        Self {
            config: ServiceConfig::default(),
            provider: Arc::new(provider),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        }
    }

    /// Create a service with a custom configuration.
    pub fn with_config(provider: P, config: ServiceConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        Ok(Self {
            config,
            provider: Arc::new(provider),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        })
    }

    /// Get current service statistics.
    #[must_use]
    pub fn stats(&self) -> ServiceStats {
        self.stats.read().clone()
    }

    /// Service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The underlying provider.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn record_loaded(&self, result: &Result<ContractType, ServiceError>) {
        if result.is_ok() {
            self.stats.write().contracts_loaded += 1;
        }
    }

    fn record_gate(&self, err: &LinkingError) {
        if matches!(err, LinkingError::NotLinked { .. }) {
            self.stats.write().rejected_operations += 1;
        }
    }
}

/// Create a service backed by an in-memory provider.
pub fn create_test_service() -> LinkingService<InMemoryProvider> {
    LinkingService::new(InMemoryProvider::default())
}

// =============================================================================
// LinkingApi Implementation
// =============================================================================

#[async_trait]
impl<P: ContractProvider> LinkingApi for LinkingService<P> {
    #[instrument(skip(self, manifest))]
    fn load_contract_type(&self, manifest: &str, name: &str) -> Result<ContractType, ServiceError> {
        let result = Manifest::from_json(manifest)
            .and_then(|m| m.contract_type(name, &self.config.linker))
            .map_err(ServiceError::from);
        self.record_loaded(&result);
        result
    }

    #[instrument(skip(self, compiler_output))]
    fn load_compiled_contract(
        &self,
        compiler_output: &str,
        name: &str,
    ) -> Result<ContractType, ServiceError> {
        let result = CompilerOutput::from_json(compiler_output)
            .and_then(|output| output.contract_type(name, &self.config.linker))
            .map_err(ServiceError::from);
        self.record_loaded(&result);
        result
    }

    #[instrument(skip(self, contract, attr_dict), fields(contract = %contract.name()))]
    fn link(&self, contract: &ContractType, attr_dict: &AttrDict) -> Result<ContractType, ServiceError> {
        self.stats.write().link_attempts += 1;

        match contract.link(attr_dict) {
            Ok(linked) => {
                self.stats.write().links_succeeded += 1;
                info!(libraries = attr_dict.len(), "Contract type linked");
                Ok(linked)
            }
            Err(e) => {
                self.stats.write().links_failed += 1;
                warn!(error = %e, "Linking failed");
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self, contract, constructor_args), fields(contract = %contract.name()))]
    async fn deploy(
        &self,
        contract: &ContractType,
        constructor_args: Bytes,
    ) -> Result<BoundContract, ServiceError> {
        let request = contract.constructor(constructor_args).map_err(|e| {
            self.record_gate(&e);
            warn!(error = %e, "Deployment refused");
            e
        })?;

        debug!(init_code_len = request.init_code().len(), "Submitting deployment");
        let address = self.provider.deploy(&request).await?;
        let bound = contract.bind(address.as_bytes())?;

        self.stats.write().deployments += 1;
        info!(address = %address, "Contract deployed");
        Ok(bound)
    }

    #[instrument(skip(self, contract, address), fields(contract = %contract.name()))]
    async fn attach(
        &self,
        contract: &ContractType,
        address: &[u8],
    ) -> Result<BoundContract, ServiceError> {
        let bound = contract.bind(address).map_err(|e| {
            self.record_gate(&e);
            warn!(error = %e, "Attach refused");
            e
        })?;

        let code = self.provider.code_at(bound.address).await?;
        if code.is_empty() {
            return Err(ProviderError::NoCodeAt(bound.address).into());
        }

        if self.config.verify_code_on_attach {
            if let Some(expected) = bound.runtime_code_hash {
                if keccak256(code.as_slice()) != expected {
                    warn!(address = %bound.address, "Runtime code mismatch");
                    return Err(ServiceError::CodeMismatch {
                        contract: bound.contract,
                        address: bound.address,
                    });
                }
            }
        }

        self.stats.write().attachments += 1;
        debug!(address = %bound.address, "Contract attached");
        Ok(bound)
    }
}

// =============================================================================
// TESTS
// =============================================================================

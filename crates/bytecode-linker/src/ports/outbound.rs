//! # Driven Ports (SPI - Outbound)
//!
//! The construction/binding capability the linker depends on. A provider
//! turns a fully linked deployment into a live contract and reports the code
//! stored at an address. It is only ever invoked after the contract type has
//! reached the Linked state.

use crate::domain::contract_type::DeploymentRequest;
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::ProviderError;
use async_trait::async_trait;

// =============================================================================
// CONTRACT PROVIDER
// =============================================================================

/// Interface to the chain the contracts are deployed on.
///
/// ## Implementation Notes
///
/// Implementations own transaction signing, submission and receipt polling.
/// The linker hands over a request whose bytecode is already fully linked.
#[async_trait]
pub trait ContractProvider: Send + Sync {
    /// Submit a deployment.
    ///
    /// # Returns
    ///
    /// * `Address` - Where the new contract lives
    async fn deploy(&self, request: &DeploymentRequest) -> Result<Address, ProviderError>;

    /// Get contract code.
    ///
    /// # Returns
    ///
    /// * `Bytes` - Runtime code at `address` (empty if none)
    async fn code_at(&self, address: Address) -> Result<Bytes, ProviderError>;

    /// Check whether contract code exists at `address`.
    async fn has_code(&self, address: Address) -> Result<bool, ProviderError> {
        Ok(!self.code_at(address).await?.is_empty())
    }
}

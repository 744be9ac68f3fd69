//! # Driving Ports (API - Inbound)
//!
//! The public API of the linker: load contract types from manifests or
//! compiler output, link them, and deploy or attach the linked result.

use crate::domain::attr_dict::AttrDict;
use crate::domain::contract_type::{BoundContract, ContractType};
use crate::domain::value_objects::Bytes;
use crate::errors::ServiceError;
use async_trait::async_trait;

/// Primary linking API.
#[async_trait]
pub trait LinkingApi: Send + Sync {
    /// Load contract type `name` from a manifest document.
    fn load_contract_type(&self, manifest: &str, name: &str) -> Result<ContractType, ServiceError>;

    /// Load contract type `name` from standard-json compiler output.
    fn load_compiled_contract(
        &self,
        compiler_output: &str,
        name: &str,
    ) -> Result<ContractType, ServiceError>;

    /// Produce a linked copy of `contract`.
    fn link(&self, contract: &ContractType, attr_dict: &AttrDict) -> Result<ContractType, ServiceError>;

    /// Deploy a linked contract type with ABI-encoded constructor arguments.
    async fn deploy(
        &self,
        contract: &ContractType,
        constructor_args: Bytes,
    ) -> Result<BoundContract, ServiceError>;

    /// Attach a linked contract type to an existing deployment.
    async fn attach(
        &self,
        contract: &ContractType,
        address: &[u8],
    ) -> Result<BoundContract, ServiceError>;
}

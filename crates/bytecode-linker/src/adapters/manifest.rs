//! # Manifest Reader
//!
//! Builds contract types from package manifest documents.
//!
//! Only the `contract_types` section is read:
//!
//! ```json
//! {
//!   "contract_types": {
//!     "Escrow": {
//!       "abi": [],
//!       "deployment_bytecode": {
//!         "bytecode": "0x6080...",
//!         "link_references": [{"name": "SafeSendLib", "offsets": [383], "length": 20}]
//!       },
//!       "runtime_bytecode": { "bytecode": "0x6080...", "link_references": [] }
//!     }
//!   }
//! }
//! ```
//!
//! Retrieving the document (IPFS, registry URIs, disk) is the caller's job.

use crate::domain::config::LinkerConfig;
use crate::domain::contract_type::ContractType;
use crate::domain::link_reference::{Bytecode, LinkReference};
use crate::domain::value_objects::Bytes;
use crate::errors::ManifestError;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ManifestDocument {
    #[serde(default)]
    contract_types: BTreeMap<String, ContractTypeEntry>,
}

#[derive(Debug, Deserialize)]
struct ContractTypeEntry {
    #[serde(default)]
    abi: Option<serde_json::Value>,
    #[serde(default)]
    deployment_bytecode: Option<BytecodeEntry>,
    #[serde(default)]
    runtime_bytecode: Option<BytecodeEntry>,
}

#[derive(Clone, Debug, Deserialize)]
struct BytecodeEntry {
    #[serde(default)]
    bytecode: Option<String>,
    #[serde(default)]
    link_references: Vec<LinkReference>,
}

impl BytecodeEntry {
    fn into_bytecode(self, field: &str) -> Result<Option<Bytecode>, ManifestError> {
        let Some(hex_code) = self.bytecode else {
            return Ok(None);
        };
        let code = Bytes::from_hex(&hex_code).map_err(|e| ManifestError::InvalidHex {
            field: field.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(Bytecode::with_references(code, self.link_references)))
    }
}

/// A parsed manifest.
#[derive(Debug)]
pub struct Manifest {
    contract_types: BTreeMap<String, ContractTypeEntry>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        let document: ManifestDocument = serde_json::from_str(text)?;
        Ok(Self {
            contract_types: document.contract_types,
        })
    }

    /// Names of every contract type, ascending.
    pub fn contract_type_names(&self) -> impl Iterator<Item = &str> {
        self.contract_types.keys().map(String::as_str)
    }

    /// Build contract type `name` through the contract type factory.
    pub fn contract_type(
        &self,
        name: &str,
        config: &LinkerConfig,
    ) -> Result<ContractType, ManifestError> {
        let entry = self
            .contract_types
            .get(name)
            .ok_or_else(|| ManifestError::ContractTypeNotFound(name.to_string()))?;

        let deployment = entry
            .deployment_bytecode
            .clone()
            .map(|e| e.into_bytecode(&format!("{name}.deployment_bytecode")))
            .transpose()?
            .flatten();
        let runtime = entry
            .runtime_bytecode
            .clone()
            .map(|e| e.into_bytecode(&format!("{name}.runtime_bytecode")))
            .transpose()?
            .flatten();

        debug!(
            contract = name,
            has_deployment = deployment.is_some(),
            has_runtime = runtime.is_some(),
            "Read contract type from manifest"
        );

        let contract = ContractType::factory(name, deployment, runtime, config)?;
        Ok(match &entry.abi {
            Some(abi) => contract.with_abi(abi.clone()),
            None => contract,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

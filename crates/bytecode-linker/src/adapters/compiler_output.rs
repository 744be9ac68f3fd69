//! # Compiler Output Normalizer
//!
//! Turns the `contracts` section of standard-json compiler output into
//! contract types.
//!
//! The compiler leaves `__$...$__`-style placeholder text in the hex object
//! wherever a library address belongs, and lists those slots under
//! `linkReferences` as `{source file: {library: [{start, length}]}}` with
//! byte positions. Each slot is checked to really be a placeholder, then
//! overwritten with zeros so the object decodes to bytes whose reference
//! regions are empty. The resulting contract type starts out Unlinked.

use crate::domain::config::LinkerConfig;
use crate::domain::contract_type::ContractType;
use crate::domain::link_reference::{Bytecode, LinkReference};
use crate::domain::value_objects::Bytes;
use crate::errors::ManifestError;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// `{start, length}` entry of a compiler link reference, in bytes.
#[derive(Clone, Copy, Debug, Deserialize)]
struct LinkSlot {
    start: usize,
    length: usize,
}

#[derive(Clone, Debug, Deserialize)]
struct CompiledBytecode {
    #[serde(default)]
    object: String,
    #[serde(default, rename = "linkReferences")]
    link_references: BTreeMap<String, BTreeMap<String, Vec<LinkSlot>>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct EvmOutput {
    #[serde(default)]
    bytecode: Option<CompiledBytecode>,
    #[serde(default, rename = "deployedBytecode")]
    deployed_bytecode: Option<CompiledBytecode>,
}

#[derive(Clone, Debug, Deserialize)]
struct CompiledContract {
    #[serde(default)]
    abi: Option<serde_json::Value>,
    #[serde(default)]
    evm: EvmOutput,
}

/// Compiled contracts indexed by contract name.
#[derive(Debug)]
pub struct CompilerOutput {
    contracts: HashMap<String, CompiledContract>,
    paths: BTreeMap<String, String>,
}

impl CompilerOutput {
    /// Parse the `{source path: {contract name: ...}}` map.
    ///
    /// Contract names must be unique across source paths.
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        let by_path: BTreeMap<String, BTreeMap<String, CompiledContract>> =
            serde_json::from_str(text)?;

        let mut contracts = HashMap::new();
        let mut paths = BTreeMap::new();
        for (path, compiled) in by_path {
            for (name, contract) in compiled {
                if contracts.insert(name.clone(), contract).is_some() {
                    return Err(ManifestError::DuplicateContractName(name));
                }
                paths.insert(name, path.clone());
            }
        }

        Ok(Self { contracts, paths })
    }

    /// Contract names mapped to the source path that defines them.
    #[must_use]
    pub fn names_and_paths(&self) -> &BTreeMap<String, String> {
        &self.paths
    }

    /// Build contract type `name` through the contract type factory.
    pub fn contract_type(
        &self,
        name: &str,
        config: &LinkerConfig,
    ) -> Result<ContractType, ManifestError> {
        let compiled = self
            .contracts
            .get(name)
            .ok_or_else(|| ManifestError::ContractTypeNotFound(name.to_string()))?;

        let deployment = compiled
            .evm
            .bytecode
            .as_ref()
            .map(|b| normalize_bytecode(b, &format!("{name}.evm.bytecode")))
            .transpose()?
            .flatten();
        let runtime = compiled
            .evm
            .deployed_bytecode
            .as_ref()
            .map(|b| normalize_bytecode(b, &format!("{name}.evm.deployedBytecode")))
            .transpose()?
            .flatten();

        let contract = ContractType::factory(name, deployment, runtime, config)?;
        Ok(match &compiled.abi {
            Some(abi) => contract.with_abi(abi.clone()),
            None => contract,
        })
    }
}

/// Normalize one compiled object. An empty object (interfaces, abstract
/// contracts) yields no payload.
fn normalize_bytecode(
    compiled: &CompiledBytecode,
    field: &str,
) -> Result<Option<Bytecode>, ManifestError> {
    let object = compiled
        .object
        .strip_prefix("0x")
        .unwrap_or(compiled.object.as_str());
    if object.is_empty() {
        return Ok(None);
    }

    let slots: Vec<LinkSlot> = compiled
        .link_references
        .values()
        .flat_map(|by_library| by_library.values())
        .flatten()
        .copied()
        .collect();
    let processed = zero_placeholders(object, &slots)?;

    let code = Bytes::from_hex(&processed).map_err(|e| ManifestError::InvalidHex {
        field: field.to_string(),
        reason: e.to_string(),
    })?;

    let link_references = process_link_references(&compiled.link_references);
    debug!(
        field,
        references = link_references.len(),
        "Normalized compiler bytecode"
    );

    Ok(Some(Bytecode::with_references(code, link_references)))
}

/// One `LinkReference` per library, merging slots that share a length.
fn process_link_references(
    link_refs: &BTreeMap<String, BTreeMap<String, Vec<LinkSlot>>>,
) -> Vec<LinkReference> {
    let mut references: Vec<LinkReference> = Vec::new();
    for (library, slots) in link_refs.values().flat_map(|by_library| by_library.iter()) {
        for slot in slots {
            match references
                .iter_mut()
                .find(|r| &r.name == library && r.length == slot.length)
            {
                Some(existing) => {
                    existing.offsets.insert(slot.start);
                }
                None => references.push(LinkReference::new(library.clone(), [slot.start], slot.length)),
            }
        }
    }
    references
}

/// Replace every placeholder slot of the hex `object` with zero digits.
fn zero_placeholders(object: &str, slots: &[LinkSlot]) -> Result<String, ManifestError> {
    let mut digits = object.as_bytes().to_vec();

    for slot in slots {
        let span = slot
            .start
            .checked_mul(2)
            .zip(slot.length.checked_mul(2))
            .and_then(|(begin, len)| Some((begin, begin.checked_add(len)?)));
        let text = span
            .and_then(|(begin, end)| object.get(begin..end))
            .unwrap_or_default();

        match span {
            Some((begin, end)) if text.len() == end - begin && is_placeholder_slot(text) => {
                digits[begin..end].fill(b'0');
            }
            _ => {
                return Err(ManifestError::InvalidPlaceholder {
                    slot: text.to_string(),
                    offset: slot.start,
                    length: slot.length,
                });
            }
        }
    }

    String::from_utf8(digits).map_err(|e| ManifestError::Malformed(e.to_string()))
}

fn is_placeholder_slot(slot: &str) -> bool {
    slot.starts_with("__") || slot.ends_with("__")
}

// =============================================================================
// TESTS
// =============================================================================

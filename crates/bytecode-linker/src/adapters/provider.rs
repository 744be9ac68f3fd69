//! # In-Memory Provider
//!
//! `ContractProvider` implementation for testing.
//! Deployments land on CREATE-derived addresses and leave the request's
//! expected runtime code behind; nothing is executed.

use crate::domain::contract_type::DeploymentRequest;
use crate::domain::services::compute_contract_address;
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::ProviderError;
use crate::ports::outbound::ContractProvider;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct ChainState {
    nonce: u64,
    code: HashMap<Address, Bytes>,
}

/// In-memory chain for testing.
#[derive(Debug)]
pub struct InMemoryProvider {
    deployer: Address,
    reject_deployments: bool,
    state: RwLock<ChainState>,
}

impl InMemoryProvider {
    /// Create an empty chain deploying from `deployer`.
    #[must_use]
    pub fn new(deployer: Address) -> Self {
        Self {
            deployer,
            reject_deployments: false,
            state: RwLock::new(ChainState::default()),
        }
    }

    /// Builder-style method pre-populating code at `address`.
    #[must_use]
    pub fn with_code(mut self, address: Address, code: Bytes) -> Self {
        self.state.get_mut().code.insert(address, code);
        self
    }

    /// Builder-style method making every deployment fail.
    #[must_use]
    pub fn rejecting_deployments(mut self) -> Self {
        self.reject_deployments = true;
        self
    }

    /// Number of deployments accepted so far.
    pub async fn deployment_count(&self) -> u64 {
        self.state.read().await.nonce
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new(Address::new([0xde; 20]))
    }
}

#[async_trait]
impl ContractProvider for InMemoryProvider {
    async fn deploy(&self, request: &DeploymentRequest) -> Result<Address, ProviderError> {
        if self.reject_deployments {
            return Err(ProviderError::DeploymentRejected(format!(
                "deployments disabled for {}",
                request.contract
            )));
        }

        let mut state = self.state.write().await;
        let address = compute_contract_address(self.deployer, state.nonce);
        state.nonce += 1;
        state.code.insert(
            address,
            request.expected_runtime_code.clone().unwrap_or_default(),
        );
        Ok(address)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ProviderError> {
        Ok(self
            .state
            .read()
            .await
            .code
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }
}

//! # Manifest Flows
//!
//! Contract types loaded from package manifests and from standard-json
//! compiler output, then linked and deployed through the service.

#[cfg(test)]
mod tests {
    use bytecode_linker::prelude::*;
    use serde_json::json;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const SAFE_SEND: Address = Address([0x5e; 20]);

    /// Escrow with one `SafeSendLib` slot in each payload.
    fn escrow_manifest() -> String {
        let deployment = format!("0x608060405234{}6000f3", "00".repeat(20));
        let runtime = format!("0x6080{}5b00", "00".repeat(20));
        json!({
            "manifest_version": "2",
            "package_name": "escrow",
            "version": "1.0.0",
            "contract_types": {
                "Escrow": {
                    "abi": [{"type": "constructor", "inputs": [{"name": "recipient", "type": "address"}]}],
                    "deployment_bytecode": {
                        "bytecode": deployment,
                        "link_references": [{"name": "SafeSendLib", "offsets": [6], "length": 20}]
                    },
                    "runtime_bytecode": {
                        "bytecode": runtime,
                        "link_references": [{"name": "SafeSendLib", "offsets": [2], "length": 20}]
                    }
                },
                "SafeSendLib": {
                    "abi": [],
                    "deployment_bytecode": {"bytecode": "0x6080604052"},
                    "runtime_bytecode": {"bytecode": "0x60806040"}
                }
            }
        })
        .to_string()
    }

    const PLACEHOLDER: &str = "__$4f2c8a1d9e3b7f6a0c5d8e2b1a9f3c7d4e$__";

    fn compiler_output() -> String {
        let bytecode = format!("6080{PLACEHOLDER}00");
        let deployed = format!("60{PLACEHOLDER}");
        json!({
            "contracts/Token.sol": {
                "Token": {
                    "abi": [],
                    "evm": {
                        "bytecode": {
                            "object": bytecode,
                            "linkReferences": {"contracts/SafeMath.sol": {"SafeMath": [{"start": 2, "length": 20}]}}
                        },
                        "deployedBytecode": {
                            "object": deployed,
                            "linkReferences": {"contracts/SafeMath.sol": {"SafeMath": [{"start": 1, "length": 20}]}}
                        }
                    }
                }
            },
            "contracts/SafeMath.sol": {
                "SafeMath": {
                    "abi": [],
                    "evm": {
                        "bytecode": {"object": "6080604052", "linkReferences": {}},
                        "deployedBytecode": {"object": "60806040", "linkReferences": {}}
                    }
                }
            }
        })
        .to_string()
    }

    // =============================================================================
    // MANIFEST
    // =============================================================================

    #[tokio::test]
    async fn test_manifest_library_then_dependent() {
        let service = create_test_service();
        let manifest = escrow_manifest();

        // The library has no references and deploys as-is.
        let library = service.load_contract_type(&manifest, "SafeSendLib").unwrap();
        assert_eq!(library.link_state(), LinkState::Linked);
        let library_instance = service.deploy(&library, Bytes::new()).await.unwrap();

        let escrow = service.load_contract_type(&manifest, "Escrow").unwrap();
        assert_eq!(escrow.link_state(), LinkState::Unlinked);

        let linked = service
            .link(
                &escrow,
                &AttrDict::new().with_address("SafeSendLib", library_instance.address),
            )
            .unwrap();
        let runtime = linked.runtime_bytecode().unwrap().code.as_slice();
        assert_eq!(&runtime[2..22], library_instance.address.as_bytes());

        let mut recipient = vec![0u8; 12];
        recipient.extend_from_slice(&[0x42; 20]);
        let escrow_instance = service
            .deploy(&linked, Bytes::from(recipient))
            .await
            .unwrap();
        assert_ne!(escrow_instance.address, library_instance.address);

        let stats = service.stats();
        assert_eq!(stats.contracts_loaded, 2);
        assert_eq!(stats.deployments, 2);
    }

    #[test]
    fn test_library_cannot_be_linked() {
        let service = create_test_service();
        let library = service
            .load_contract_type(&escrow_manifest(), "SafeSendLib")
            .unwrap();

        assert!(matches!(
            service.link(&library, &AttrDict::new()),
            Err(ServiceError::Linking(LinkingError::NoLinkReferences { .. }))
        ));
    }

    #[test]
    fn test_missing_contract_type() {
        let service = create_test_service();
        assert!(matches!(
            service.load_contract_type(&escrow_manifest(), "Wallet"),
            Err(ServiceError::Manifest(ManifestError::ContractTypeNotFound(_)))
        ));
        assert_eq!(service.stats().contracts_loaded, 0);
    }

    // =============================================================================
    // COMPILER OUTPUT
    // =============================================================================

    #[tokio::test]
    async fn test_compiler_output_link_and_deploy() {
        let service = create_test_service();
        let output = compiler_output();

        let token = service.load_compiled_contract(&output, "Token").unwrap();
        assert_eq!(token.link_state(), LinkState::Unlinked);
        assert_eq!(
            token.required_link_names().into_iter().collect::<Vec<_>>(),
            vec!["SafeMath"]
        );

        let safe_math = Address::new([0x3a; 20]);
        let linked = service
            .link(&token, &AttrDict::new().with_address("SafeMath", safe_math))
            .unwrap();

        let deployment = linked.deployment_bytecode().unwrap().code.as_slice();
        assert_eq!(deployment.len(), 23);
        assert_eq!(&deployment[2..22], safe_math.as_bytes());
        assert_eq!(deployment[22], 0x00);

        let runtime = linked.runtime_bytecode().unwrap().code.as_slice();
        assert_eq!(runtime[0], 0x60);
        assert_eq!(&runtime[1..21], safe_math.as_bytes());

        let instance = service.deploy(&linked, Bytes::new()).await.unwrap();
        let code = service.provider().code_at(instance.address).await.unwrap();
        assert_eq!(code.as_slice(), runtime);
    }

    #[test]
    fn test_compiler_output_library_already_linked() {
        let service = create_test_service();
        let safe_math = service
            .load_compiled_contract(&compiler_output(), "SafeMath")
            .unwrap();
        assert!(!safe_math.needs_linking());
        assert!(safe_math.constructor(Bytes::new()).is_ok());
    }
}

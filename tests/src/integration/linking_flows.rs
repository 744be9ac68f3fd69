//! # Linking Flows
//!
//! Contract types built directly from bytecode, linked through the service,
//! then deployed to and attached on the in-memory provider.

#[cfg(test)]
mod tests {
    use bytecode_linker::prelude::*;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const MATH: Address = Address([0x11; 20]);
    const STRINGS: Address = Address([0x22; 20]);

    /// Non-zero filler with a zeroed 20-byte slot at each offset.
    fn code_with_slots(len: usize, offsets: &[usize]) -> Vec<u8> {
        let mut code: Vec<u8> = (0..len).map(|i| 0x60 + (i % 16) as u8).collect();
        for &offset in offsets {
            code[offset..offset + 20].fill(0);
        }
        code
    }

    fn math_contract() -> (Vec<u8>, ContractType) {
        let original = code_with_slots(80, &[37]);
        let contract = ContractType::factory(
            "Calculator",
            Some(Bytecode::with_references(
                Bytes::from(original.clone()),
                vec![LinkReference::address("Math", [37])],
            )),
            None,
            &LinkerConfig::default(),
        )
        .unwrap();
        (original, contract)
    }

    fn two_library_contract() -> ContractType {
        let deployment = code_with_slots(120, &[4, 60, 90]);
        let runtime = code_with_slots(70, &[10, 40]);
        ContractType::factory(
            "Router",
            Some(Bytecode::with_references(
                Bytes::from(deployment),
                vec![
                    LinkReference::address("Math", [4, 90]),
                    LinkReference::address("Strings", [60]),
                ],
            )),
            Some(Bytecode::with_references(
                Bytes::from(runtime),
                vec![
                    LinkReference::address("Math", [40]),
                    LinkReference::address("Strings", [10]),
                ],
            )),
            &LinkerConfig::default(),
        )
        .unwrap()
    }

    fn libraries() -> AttrDict {
        AttrDict::new()
            .with_address("Math", MATH)
            .with_address("Strings", STRINGS)
    }

    // =============================================================================
    // SINGLE REFERENCE
    // =============================================================================

    #[test]
    fn test_math_slot_patched_and_rest_untouched() {
        let (original, contract) = math_contract();
        assert!(contract.needs_linking());

        let linked = contract
            .link(&AttrDict::new().with_address("Math", MATH))
            .unwrap();
        let code = linked.deployment_bytecode().unwrap().code.as_slice();

        assert!(!linked.needs_linking());
        assert_eq!(&code[37..57], MATH.as_bytes());
        assert_eq!(&code[..37], &original[..37]);
        assert_eq!(&code[57..], &original[57..]);
    }

    #[test]
    fn test_original_descriptor_unchanged_by_link() {
        let (original, contract) = math_contract();
        let _linked = contract
            .link(&AttrDict::new().with_address("Math", MATH))
            .unwrap();

        assert_eq!(contract.link_state(), LinkState::Unlinked);
        assert_eq!(
            contract.deployment_bytecode().unwrap().code.as_slice(),
            original.as_slice()
        );
    }

    #[test]
    fn test_linked_descriptor_cannot_be_relinked() {
        let (_, contract) = math_contract();
        let linked = contract
            .link(&AttrDict::new().with_address("Math", MATH))
            .unwrap();

        assert!(matches!(
            linked.link(&AttrDict::new().with_address("Math", STRINGS)),
            Err(LinkingError::AlreadyLinked { .. })
        ));
    }

    // =============================================================================
    // MULTIPLE LIBRARIES, BOTH PAYLOADS
    // =============================================================================

    #[test]
    fn test_every_region_in_both_payloads_patched() {
        let linked = two_library_contract().link(&libraries()).unwrap();

        let deployment = linked.deployment_bytecode().unwrap().code.as_slice();
        assert_eq!(&deployment[4..24], MATH.as_bytes());
        assert_eq!(&deployment[90..110], MATH.as_bytes());
        assert_eq!(&deployment[60..80], STRINGS.as_bytes());

        let runtime = linked.runtime_bytecode().unwrap().code.as_slice();
        assert_eq!(&runtime[40..60], MATH.as_bytes());
        assert_eq!(&runtime[10..30], STRINGS.as_bytes());
    }

    #[test]
    fn test_partial_attr_dict_rejected() {
        let err = two_library_contract()
            .link(&AttrDict::new().with_address("Math", MATH))
            .unwrap_err();

        assert_eq!(
            err,
            LinkingError::AttrDictMismatch {
                missing: vec!["Strings".to_string()],
                unexpected: vec![],
            }
        );
    }

    // =============================================================================
    // SERVICE: DEPLOY AND ATTACH
    // =============================================================================

    #[tokio::test]
    async fn test_deploy_then_attach_with_verification() {
        let config = ServiceConfig::default().with_code_verification(true);
        let service = LinkingService::with_config(InMemoryProvider::default(), config).unwrap();

        let linked = service.link(&two_library_contract(), &libraries()).unwrap();
        let deployed = service
            .deploy(&linked, Bytes::from(vec![0u8; 32]))
            .await
            .unwrap();

        let code = service.provider().code_at(deployed.address).await.unwrap();
        assert_eq!(Some(keccak256(code.as_slice())), linked.runtime_code_hash());

        let attached = service
            .attach(&linked, deployed.address.as_bytes())
            .await
            .unwrap();
        assert_eq!(attached.address, deployed.address);

        let stats = service.stats();
        assert_eq!(stats.links_succeeded, 1);
        assert_eq!(stats.deployments, 1);
        assert_eq!(stats.attachments, 1);
        assert_eq!(stats.rejected_operations, 0);
    }

    #[tokio::test]
    async fn test_unlinked_never_reaches_provider() {
        let service = create_test_service();
        let contract = two_library_contract();

        assert!(service.deploy(&contract, Bytes::new()).await.is_err());
        assert!(service.attach(&contract, MATH.as_bytes()).await.is_err());

        assert_eq!(service.provider().deployment_count().await, 0);
        assert_eq!(service.stats().rejected_operations, 2);
    }

    #[tokio::test]
    async fn test_deployments_follow_create_addresses() {
        let deployer = Address::new([0x5a; 20]);
        let service = LinkingService::new(InMemoryProvider::new(deployer));
        let linked = service.link(&two_library_contract(), &libraries()).unwrap();

        let first = service.deploy(&linked, Bytes::new()).await.unwrap();
        let second = service.deploy(&linked, Bytes::new()).await.unwrap();

        assert_eq!(first.address, compute_contract_address(deployer, 0));
        assert_eq!(second.address, compute_contract_address(deployer, 1));
    }

    #[test]
    fn test_constructor_appends_arguments() {
        let linked = two_library_contract().link(&libraries()).unwrap();
        let request = linked.constructor(Bytes::from(vec![0xab, 0xcd])).unwrap();

        let init_code = request.init_code();
        assert_eq!(init_code.len(), 122);
        assert_eq!(&init_code.as_slice()[120..], &[0xab, 0xcd]);
        assert_eq!(
            request.expected_runtime_code_hash(),
            linked.runtime_code_hash()
        );
    }
}

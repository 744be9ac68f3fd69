//! # Malformed Inputs
//!
//! Descriptors and attr-dicts built to slip unlinked or corrupted bytecode
//! past the linker. Every case must be refused with a typed error and leave
//! no partially patched payload behind.

#[cfg(test)]
mod tests {
    use bytecode_linker::prelude::*;
    use serde_json::json;

    fn slot_code(len: usize, offset: usize) -> Bytes {
        let mut code = vec![0xfe; len];
        code[offset..offset + 20].fill(0);
        Bytes::from(code)
    }

    fn single_ref(code: Bytes, reference: LinkReference) -> Result<ContractType, LinkingError> {
        ContractType::factory(
            "Target",
            Some(Bytecode::with_references(code, vec![reference])),
            None,
            &LinkerConfig::default(),
        )
    }

    // =============================================================================
    // DESCRIPTOR SHAPE
    // =============================================================================

    #[test]
    fn test_reference_past_payload_end() {
        let result = single_ref(slot_code(30, 0), LinkReference::address("Lib", [25]));
        match result {
            Err(LinkingError::InvalidDescriptor { violations, .. }) => {
                assert!(matches!(
                    violations[0],
                    InvariantViolation::ReferenceOutOfBounds { offset: 25, .. }
                ));
            }
            other => panic!("expected InvalidDescriptor, got {other:?}"),
        }
    }

    #[test]
    fn test_overlapping_references() {
        let code = Bytes::from(vec![0u8; 50]);
        let result = ContractType::factory(
            "Target",
            Some(Bytecode::with_references(
                code,
                vec![
                    LinkReference::address("A", [0]),
                    LinkReference::address("B", [10]),
                ],
            )),
            None,
            &LinkerConfig::default(),
        );
        assert!(matches!(result, Err(LinkingError::InvalidDescriptor { .. })));
    }

    #[test]
    fn test_offset_overflow_does_not_panic() {
        let result = single_ref(slot_code(30, 0), LinkReference::address("Lib", [usize::MAX]));
        assert!(matches!(result, Err(LinkingError::InvalidDescriptor { .. })));
    }

    #[test]
    fn test_reference_without_offsets_rejected() {
        let result = single_ref(
            Bytes::from(vec![0u8; 40]),
            LinkReference::new("Math", Vec::<usize>::new(), 20),
        );
        match result {
            Err(LinkingError::InvalidDescriptor { violations, .. }) => {
                assert!(matches!(
                    violations[0],
                    InvariantViolation::EmptyOffsets { .. }
                ));
            }
            other => panic!("expected InvalidDescriptor, got {other:?}"),
        }
    }

    #[test]
    fn test_compiler_slot_overflow_does_not_panic() {
        let placeholder = "__$0123456789abcdef0123456789abcdef01$__";
        let text = json!({
            "Lib.sol": {"User": {"evm": {"bytecode": {
                "object": format!("6080{placeholder}"),
                "linkReferences": {"Lib.sol": {"Lib": [{"start": 9_223_372_036_854_775_808_u64, "length": 20}]}}
            }}}}
        })
        .to_string();

        let service = create_test_service();
        assert!(matches!(
            service.load_compiled_contract(&text, "User"),
            Err(ServiceError::Manifest(ManifestError::InvalidPlaceholder { .. }))
        ));
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let config = LinkerConfig::default().with_max_init_code_size(16);
        let result = ContractType::factory(
            "Target",
            Some(Bytecode::new(Bytes::from(vec![0x60; 17]))),
            None,
            &config,
        );
        assert!(matches!(result, Err(LinkingError::InvalidDescriptor { .. })));
    }

    // =============================================================================
    // ATTR-DICT VALUES
    // =============================================================================

    #[test]
    fn test_checksum_string_instead_of_raw_address() {
        let contract = single_ref(slot_code(40, 10), LinkReference::address("Lib", [10])).unwrap();
        let mut attr_dict = AttrDict::new();
        attr_dict.insert_raw("Lib", b"0x5E5e5E5e5E5e5E5e5E5e5E5e5E5e5E5e5E5e5E5e".to_vec());

        assert!(matches!(
            contract.link(&attr_dict),
            Err(LinkingError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_short_address_rejected() {
        let contract = single_ref(slot_code(40, 10), LinkReference::address("Lib", [10])).unwrap();
        let mut attr_dict = AttrDict::new();
        attr_dict.insert_raw("Lib", vec![0x11; 19]);

        assert!(contract.link(&attr_dict).is_err());
    }

    #[test]
    fn test_unexpected_library_name_rejected() {
        let contract = single_ref(slot_code(40, 10), LinkReference::address("Lib", [10])).unwrap();
        let attr_dict = AttrDict::new()
            .with_address("Lib", Address::new([1; 20]))
            .with_address("Other", Address::new([2; 20]));

        assert_eq!(
            contract.link(&attr_dict).unwrap_err(),
            LinkingError::AttrDictMismatch {
                missing: vec![],
                unexpected: vec!["Other".to_string()],
            }
        );
    }

    #[test]
    fn test_zero_address_reported_as_internal() {
        let contract = single_ref(slot_code(40, 10), LinkReference::address("Lib", [10])).unwrap();
        let err = contract
            .link(&AttrDict::new().with_address("Lib", Address::ZERO))
            .unwrap_err();
        assert!(err.is_internal());
    }

    // =============================================================================
    // PATCH TARGETS
    // =============================================================================

    #[test]
    fn test_direct_patch_over_existing_address() {
        let mut code = slot_code(40, 10).into_vec();
        apply_link_ref("Lib", 10, &[0x11; 20], &mut code).unwrap();

        let before = code.clone();
        assert!(matches!(
            apply_link_ref("Lib", 10, &[0x22; 20], &mut code),
            Err(LinkingError::PatchTargetNotEmpty { offset: 10, .. })
        ));
        assert_eq!(code, before);
    }

    #[test]
    fn test_multi_region_failure_leaves_input_untouched() {
        // Second region already holds an address.
        let mut code = vec![0u8; 60];
        code[30..50].fill(0x77);
        let original = Bytes::from(code);
        let refs = vec![LinkReference::address("Lib", [0, 30])];
        let attr_dict = AttrDict::new().with_address("Lib", Address::new([0x11; 20]));

        assert!(apply_all_link_refs(&original, &refs, &attr_dict).is_err());
        assert!(original.as_slice()[..20].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bind_rejects_malformed_address() {
        let contract = single_ref(slot_code(40, 10), LinkReference::address("Lib", [10])).unwrap();
        let linked = contract
            .link(&AttrDict::new().with_address("Lib", Address::new([0x11; 20])))
            .unwrap();

        assert!(matches!(
            linked.bind(&[0xaa; 21]),
            Err(LinkingError::InvalidBindAddress(_))
        ));
        assert!(linked.bind(&[0xaa; 20]).is_ok());
    }
}

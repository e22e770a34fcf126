#![allow(clippy::unwrap_used, clippy::expect_used)]

use bimdiff_core::errors::{BimDiffError, ExError, ExErrorKind};
use bimdiff_core::{compare_models_with, DiffOptions, Element, ElementSnapshot, EngineConfig};

#[test]
fn test_missing_snapshot_verifiable_by_kind() {
    let err = BimDiffError::MissingSnapshot {
        role: "new".to_string(),
        version_id: "v7".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(ex_err.code(), "ERR_INVALID_INPUT");
    assert_eq!(ex_err.version_id(), Some("v7"));
    assert!(ex_err.message().contains("new snapshot missing"));
}

#[test]
fn test_duplicate_identity_carries_element_key() {
    let err = BimDiffError::DuplicateIdentity {
        version_id: "v1".to_string(),
        key: "globalId:w1".to_string(),
        first_position: 0,
        duplicate_position: 4,
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::AmbiguousIdentity);
    assert_eq!(ex_err.code(), "ERR_AMBIGUOUS_IDENTITY");
    assert_eq!(ex_err.element_key(), Some("globalId:w1"));
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::AmbiguousIdentity, "ERR_AMBIGUOUS_IDENTITY"),
        (ExErrorKind::InvalidConfig, "ERR_INVALID_CONFIG"),
        (ExErrorKind::Cancelled, "ERR_CANCELLED"),
        (ExErrorKind::Timeout, "ERR_TIMEOUT"),
        (ExErrorKind::Io, "ERR_IO"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::ExternalService, "ERR_EXTERNAL_SERVICE"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_empty_version_list_is_invalid_input() {
    let ex_err: ExError = BimDiffError::EmptyVersionList.into();
    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_cancelled_conversion() {
    let ex_err: ExError = BimDiffError::Cancelled {
        completed: 3,
        total: 12,
    }
    .into();
    assert_eq!(ex_err.kind(), ExErrorKind::Cancelled);
    assert!(ex_err.message().contains("3 of 12"));
}

#[test]
fn test_invalid_config_conversion() {
    let err = EngineConfig::from_toml_str("[critical]\nmax_listed = 0").unwrap_err();
    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::InvalidConfig);
    assert!(ex_err.message().contains("max_listed"));
}

#[test]
fn test_strict_comparison_error_has_full_context() {
    let snapshot = ElementSnapshot::new("v3")
        .with_element(Element::new(1, "IfcBeam").with_global_id("b1"))
        .with_element(Element::new(2, "IfcBeam").with_global_id("b1"));

    let ex_err = compare_models_with(&snapshot, &ElementSnapshot::new("v4"), &DiffOptions::strict())
        .unwrap_err();

    assert_eq!(ex_err.kind(), ExErrorKind::AmbiguousIdentity);
    assert_eq!(ex_err.op(), Some("compare_models"));
    assert_eq!(ex_err.version_id(), Some("v3"));
    assert_eq!(ex_err.element_key(), Some("globalId:b1"));
    let rendered = ex_err.to_string();
    assert!(rendered.starts_with("[ERR_AMBIGUOUS_IDENTITY] in operation 'compare_models'"));
}

#[test]
fn test_serde_and_io_errors_convert() {
    let serde_err = serde_json::from_str::<ElementSnapshot>("{").unwrap_err();
    let ex_err: ExError = BimDiffError::from(serde_err).into();
    assert_eq!(ex_err.kind(), ExErrorKind::Serialization);

    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let ex_err: ExError = BimDiffError::from(io_err).into();
    assert_eq!(ex_err.kind(), ExErrorKind::Io);
}

//! Tests for the `error` module.

use super::*;

#[test]
fn test_error_codes_are_unique() {
    let errors: Vec<Error> = vec![
        Error::DimensionMismatch {
            expected: 768,
            actual: 512,
        },
        Error::InvalidArgument("test".into()),
        Error::InvalidState("test".into()),
        Error::ChunkExceedsCapacity {
            actual: 100,
            max: 50,
        },
        Error::UnsupportedEcc("test".into()),
        Error::Resource("test".into()),
        Error::Io(std::io::Error::other("test")),
        Error::CorruptData("test".into()),
        Error::Serialization("test".into()),
        Error::Collaborator("test".into()),
        Error::Internal("test".into()),
    ];

    let codes: Vec<&str> = errors.iter().map(Error::code).collect();
    let mut unique_codes = codes.clone();
    unique_codes.sort_unstable();
    unique_codes.dedup();
    assert_eq!(codes.len(), unique_codes.len(), "error codes must be unique");

    for code in &codes {
        assert!(code.starts_with("KVID-"), "code {code} should start with KVID-");
    }
}

#[test]
fn test_corrupt_and_internal_are_unrecoverable() {
    assert!(!Error::CorruptData("x".into()).is_recoverable());
    assert!(!Error::Internal("x".into()).is_recoverable());
}

#[test]
fn test_other_variants_are_recoverable() {
    assert!(Error::DimensionMismatch {
        expected: 3,
        actual: 4
    }
    .is_recoverable());
    assert!(Error::InvalidArgument("x".into()).is_recoverable());
    assert!(Error::Resource("x".into()).is_recoverable());
}

#[test]
fn test_io_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: Error = io_err.into();
    assert_eq!(err.code(), "KVID-007");
}

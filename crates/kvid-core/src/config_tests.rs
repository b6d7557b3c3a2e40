//! Tests for config parsing and defaulting.

use super::*;

#[test]
fn empty_document_is_all_defaults() {
    let cfg = Config::from_toml_str("").unwrap();
    assert_eq!(cfg.hnsw.m, HnswSettings::default().m);
    assert_eq!(cfg.chunker.chunk_size, ChunkerSettings::default().chunk_size);
    assert_eq!(cfg.video.width, VideoSettings::default().width);
}

#[test]
fn partial_override_keeps_other_defaults() {
    let cfg = Config::from_toml_str(
        r#"
        [chunker]
        chunk_size = 1024
        "#,
    )
    .unwrap();
    assert_eq!(cfg.chunker.chunk_size, 1024);
    assert_eq!(cfg.chunker.overlap_size, ChunkerSettings::default().overlap_size);
    assert_eq!(cfg.hnsw.m, HnswSettings::default().m);
}

#[test]
fn full_document_round_trips_into_domain_types() {
    let cfg = Config::from_toml_str(
        r#"
        [hnsw]
        m = 24
        ef_construction = 300
        ml = 1.2
        seed = 7

        [qr]
        ecc = "high"
        version = 5

        [video]
        width = 256
        height = 256
        fps = 24
        "#,
    )
    .unwrap();

    let params: HnswParams = cfg.hnsw.into();
    assert_eq!(params.m, 24);
    assert_eq!(params.ef_construction, 300);
    assert_eq!(cfg.qr.ecc, crate::collaborators::EccLevel::High);
    assert_eq!(cfg.qr.version, Some(5));
    assert_eq!(cfg.video.fps, 24);
}

#[test]
fn malformed_toml_is_a_serialization_error() {
    let err = Config::from_toml_str("not valid = = toml").unwrap_err();
    assert_eq!(err.code(), "KVID-009");
}

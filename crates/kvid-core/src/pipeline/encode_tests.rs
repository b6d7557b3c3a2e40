//! Tests for the encode coordinator.

use super::*;
use crate::chunker::ChunkerConfig;
use crate::collaborators::qr::QrcodeGenerator;
use crate::collaborators::video::NativeContainerEncoder;
use tempfile::tempdir;

fn coordinator() -> EncodeCoordinator {
    EncodeCoordinator::new(
        ChunkerConfig::new(200, 20, true),
        Box::new(QrcodeGenerator::new()),
        Box::new(NativeContainerEncoder::new()),
    )
}

#[test]
fn starts_idle_and_moves_to_buffered_on_add_message() {
    let mut coord = coordinator();
    assert_eq!(coord.state(), CoordinatorState::Idle);
    coord.add_message("hello there, this is a short message.");
    assert_eq!(coord.state(), CoordinatorState::Buffered);
    assert!(coord.buffer_len() > 0);
}

#[test]
fn build_video_on_empty_buffer_is_rejected() {
    let mut coord = coordinator();
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.kvid");
    let err = coord
        .build_video(
            &path,
            BuildParams {
                width: 128,
                height: 128,
                fps: 10,
                ecc: EccLevel::Medium,
                version: None,
            },
        )
        .unwrap_err();
    assert_eq!(err.code(), "KVID-002");
    assert!(!path.exists());
}

#[test]
fn build_video_succeeds_and_resets_to_buffered_afterward() {
    let mut coord = coordinator();
    coord.add_message("first message");
    coord.add_message("second message");
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.kvid");

    let stats = coord
        .build_video(
            &path,
            BuildParams {
                width: 64,
                height: 64,
                fps: 10,
                ecc: EccLevel::Medium,
                version: None,
            },
        )
        .unwrap();

    assert_eq!(stats.total_frames, coord.buffer_len() as u32);
    assert!(path.exists());
    assert_eq!(coord.state(), CoordinatorState::Buffered);
    assert!(coord.stats().is_some());
}

#[test]
fn clear_resets_buffer_and_stats() {
    let mut coord = coordinator();
    coord.add_message("a message");
    coord.clear();
    assert_eq!(coord.state(), CoordinatorState::Idle);
    assert!(coord.stats().is_none());
}

#[test]
fn chunk_exceeding_capacity_is_rejected_without_writing_output() {
    let mut coord = EncodeCoordinator::new(
        ChunkerConfig::new(10_000, 0, false),
        Box::new(QrcodeGenerator::new()),
        Box::new(NativeContainerEncoder::new()),
    );
    coord.add_message(&"x".repeat(5000));
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.kvid");

    let err = coord
        .build_video(
            &path,
            BuildParams {
                width: 64,
                height: 64,
                fps: 10,
                ecc: EccLevel::Medium,
                version: None,
            },
        )
        .unwrap_err();
    assert_eq!(err.code(), "KVID-004");
    assert!(!path.exists());
    // buffer preserved for retry
    assert_eq!(coord.state(), CoordinatorState::Buffered);
}

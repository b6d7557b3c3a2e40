//! Tests for the `flat` index.

use super::*;
use crate::kernel::CosineKernel;
use tempfile::tempdir;

fn kernel(dim: usize) -> Box<dyn SimilarityKernel> {
    Box::new(CosineKernel::new(dim))
}

#[test]
fn add_and_get_vector_round_trips() {
    let mut idx = FlatIndex::new(kernel(3));
    idx.add(1, vec![1.0, 0.0, 0.0]).unwrap();
    assert_eq!(idx.size(), 1);
    assert_eq!(idx.get_vector(1), Some(vec![1.0, 0.0, 0.0]));
}

#[test]
fn dimension_mismatch_is_an_error_and_does_not_insert() {
    let mut idx = FlatIndex::new(kernel(3));
    let err = idx.add(1, vec![1.0, 0.0]).unwrap_err();
    assert_eq!(err.code(), "KVID-001");
    assert_eq!(idx.size(), 0);
}

#[test]
fn search_on_empty_index_returns_empty() {
    let idx = FlatIndex::new(kernel(3));
    let results = idx.search(&[1.0, 0.0, 0.0], 5).unwrap();
    assert!(results.is_empty());
}

#[test]
fn search_returns_up_to_k_sorted_by_similarity() {
    let mut idx = FlatIndex::new(kernel(2));
    idx.add(1, vec![1.0, 0.0]).unwrap();
    idx.add(2, vec![0.9, 0.1]).unwrap();
    idx.add(3, vec![0.0, 1.0]).unwrap();

    let results = idx.search(&[1.0, 0.0], 2).unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].similarity >= results[1].similarity);
    assert_eq!(results[0].id, 1);
}

#[test]
fn search_exact_ties_broken_by_lower_id() {
    let mut idx = FlatIndex::new(kernel(2));
    idx.add(5, vec![1.0, 0.0]).unwrap();
    idx.add(2, vec![1.0, 0.0]).unwrap();

    let results = idx.search(&[1.0, 0.0], 2).unwrap();
    assert_eq!(results[0].id, 2);
    assert_eq!(results[1].id, 5);
}

#[test]
fn clear_empties_the_index() {
    let mut idx = FlatIndex::new(kernel(2));
    idx.add(1, vec![1.0, 0.0]).unwrap();
    idx.clear();
    assert_eq!(idx.size(), 0);
}

#[test]
fn save_and_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flat.idx");

    let mut idx = FlatIndex::new(kernel(3));
    idx.add(1, vec![1.0, 0.0, 0.0]).unwrap();
    idx.add(2, vec![0.0, 1.0, 0.0]).unwrap();
    idx.save(&path).unwrap();

    let mut fresh = FlatIndex::new(kernel(3));
    fresh.load(&path).unwrap();
    assert_eq!(fresh.size(), 2);
    assert_eq!(fresh.get_vector(1), Some(vec![1.0, 0.0, 0.0]));

    let q = [1.0, 0.0, 0.0];
    assert_eq!(idx.search(&q, 2).unwrap(), fresh.search(&q, 2).unwrap());
}

#[test]
fn load_rejects_dimension_mismatch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flat.idx");
    let idx = FlatIndex::new(kernel(3));
    idx.save(&path).unwrap();

    let mut fresh = FlatIndex::new(kernel(4));
    let err = fresh.load(&path).unwrap_err();
    assert_eq!(err.code(), "KVID-001");
}

#[test]
fn load_of_corrupt_file_leaves_prior_state_intact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flat.idx");
    std::fs::write(&path, "not a valid flat index\n").unwrap();

    let mut idx = FlatIndex::new(kernel(3));
    idx.add(1, vec![1.0, 0.0, 0.0]).unwrap();
    let err = idx.load(&path);
    assert!(err.is_err());
    // prior state preserved: load failed before committing
    assert_eq!(idx.size(), 1);
}

// tests/resource_tests.rs
mod common;

use algokernel::{KernelError, ResourceManager, DEFAULT_OUTPUT};
use common::setup_tracing;
use std::fs;
use std::sync::Arc;

#[test]
fn test_open_output_twice_without_reopen_fails() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let manager = ResourceManager::new();

  manager.open_output(dir.path().join("x.txt"), "A", false).unwrap();
  let err = manager.open_output(dir.path().join("y.txt"), "A", false).unwrap_err();

  match err {
    KernelError::AlreadyOpen { name } => assert_eq!(name, "A"),
    other => panic!("Expected AlreadyOpen, got {:?}", other),
  }
  // The failed attempt must not have created the second file.
  assert!(!dir.path().join("y.txt").exists());
}

#[test]
fn test_reopen_closes_previous_handle_first() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let manager = ResourceManager::new();

  let first = manager.open_output(dir.path().join("x.txt"), "A", false).unwrap();
  first.write_record("from first").unwrap();
  let second = manager.open_output(dir.path().join("y.txt"), "A", true).unwrap();

  assert!(!first.is_open());
  assert!(second.is_open());
  assert!(matches!(
    first.write_record("late"),
    Err(KernelError::ResourceClosed { .. })
  ));
  assert!(Arc::ptr_eq(&manager.output("A").unwrap(), &second));
  // Closing flushed what the first handle had buffered.
  assert_eq!(fs::read_to_string(dir.path().join("x.txt")).unwrap(), "from first\n");
}

#[cfg(target_os = "linux")]
#[test]
fn test_reopen_with_failing_flush_leaves_name_unregistered() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let manager = ResourceManager::new();

  // Writes to /dev/full are buffered, then fail with ENOSPC on flush.
  let full = manager.open_output("/dev/full", "A", false).unwrap();
  full.write_record("never lands").unwrap();

  let err = manager.open_output(dir.path().join("y.txt"), "A", true).unwrap_err();

  assert!(matches!(err, KernelError::Io { .. }));
  assert!(!manager.has_output("A"));
  assert!(!full.is_open());
  assert!(matches!(manager.output("A"), Err(KernelError::OutputNotOpen { .. })));
  // The name is free again.
  manager.open_output(dir.path().join("y.txt"), "A", false).unwrap();
}

#[test]
fn test_output_lookup_by_name() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let manager = ResourceManager::new();

  assert!(matches!(
    manager.default_output(),
    Err(KernelError::OutputNotOpen { .. })
  ));
  let default = manager.open_default_output(dir.path().join("d.txt")).unwrap();
  assert_eq!(default.name(), DEFAULT_OUTPUT);
  assert!(Arc::ptr_eq(&manager.default_output().unwrap(), &default));
  assert!(manager.current_output().is_none());

  manager.select_output(DEFAULT_OUTPUT).unwrap();
  assert!(Arc::ptr_eq(&manager.current_output().unwrap(), &default));
  assert!(manager.select_output("nope").is_err());
}

#[test]
fn test_input_handles_are_cached_by_path() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let a = dir.path().join("a.txt");
  let b = dir.path().join("b.txt");
  fs::write(&a, "1\n2\n").unwrap();
  fs::write(&b, "3\n").unwrap();

  let manager = ResourceManager::new();
  let a_str = a.to_string_lossy().into_owned();
  let b_str = b.to_string_lossy().into_owned();
  manager.set_input_paths(&[a_str.clone(), b_str, a_str]);
  assert_eq!(manager.input_count(), 3);

  let first = manager.input(0).unwrap();
  let again = manager.input(0).unwrap();
  let same_path = manager.input(2).unwrap();
  let other = manager.input(1).unwrap();

  assert!(Arc::ptr_eq(&first, &again));
  assert!(Arc::ptr_eq(&first, &same_path));
  assert!(!Arc::ptr_eq(&first, &other));
}

#[test]
fn test_input_index_out_of_range() {
  setup_tracing();
  let manager = ResourceManager::new();
  manager.set_input_paths(&["a".to_string(), "b".to_string(), "c".to_string()]);

  match manager.input(5) {
    Err(KernelError::InputOutOfRange { index, count }) => {
      assert_eq!(index, 5);
      assert_eq!(count, 3);
    }
    other => panic!("Expected InputOutOfRange, got {:?}", other),
  }
}

#[test]
fn test_missing_input_file_is_io_error() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let manager = ResourceManager::new();
  let missing = dir.path().join("missing.txt").to_string_lossy().into_owned();
  manager.set_input_paths(&[missing]);

  assert!(matches!(manager.input(0), Err(KernelError::Io { .. })));
}

#[test]
fn test_input_reads_records_and_rewinds() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("records.txt");
  fs::write(&path, "alpha\r\nbeta\n\ngamma").unwrap();

  let manager = ResourceManager::new();
  manager.set_input_paths(&[path.to_string_lossy().into_owned()]);
  let input = manager.input(0).unwrap();

  assert_eq!(input.read_record().unwrap().as_deref(), Some("alpha"));
  assert_eq!(input.read_record().unwrap().as_deref(), Some("beta"));
  assert_eq!(input.read_record().unwrap().as_deref(), Some(""));
  assert_eq!(input.read_record().unwrap().as_deref(), Some("gamma"));
  assert_eq!(input.read_record().unwrap(), None);

  input.rewind().unwrap();
  assert_eq!(input.read_record().unwrap().as_deref(), Some("alpha"));
}

#[test]
fn test_output_counts_records() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let manager = ResourceManager::new();
  let out = manager.open_output(dir.path().join("o.txt"), "o", false).unwrap();

  out.write_record("a").unwrap();
  out.write_record("b").unwrap();
  out.flush().unwrap();
  assert_eq!(out.records_written(), 2);
  assert_eq!(fs::read_to_string(out.path()).unwrap(), "a\nb\n");

  out.close().unwrap();
  out.close().unwrap();
  assert!(matches!(out.flush(), Err(KernelError::ResourceClosed { .. })));
}

// tests/registry_tests.rs
mod common;

use algokernel::{Algorithm, Kernel, KernelError, KernelResult, Stage, StageRef, Status};
use common::*;

#[test]
fn test_find_returns_first_in_registration_order() {
  setup_tracing();
  let log = ExecLog::new();
  let mut kernel = Kernel::new();
  let first = kernel.add_alg(CountdownSource::new("first", 1, &log));
  let second = kernel.add_alg(CountdownSource::new("second", 1, &log));

  let found = kernel.find_alg::<CountdownSource>().unwrap();
  assert!(found.ptr_eq(&first));
  assert!(!found.ptr_eq(&second));
  assert_eq!(found.id(), first.id());
}

#[test]
fn test_find_where_applies_predicate() {
  setup_tracing();
  let log = ExecLog::new();
  let mut kernel = Kernel::new();
  kernel.add_alg(CountdownSource::new("first", 1, &log));
  let second = kernel.add_alg(CountdownSource::new("second", 4, &log));

  let found = kernel.find_alg_where::<CountdownSource>(|s| s.ticks > 2).unwrap();
  assert!(found.ptr_eq(&second));

  let none = kernel.find_alg_where::<CountdownSource>(|s| s.label == "third");
  assert!(matches!(none, Err(KernelError::NotFound { .. })));
}

#[test]
fn test_find_missing_type_is_not_found() {
  setup_tracing();
  let log = ExecLog::new();
  let mut kernel = Kernel::new();
  kernel.add_alg(Recorder::new("R", &log));

  let err = kernel.find_alg::<CountdownSource>().unwrap_err();
  assert!(err.is_not_found());
  match err {
    KernelError::NotFound {
      registry, capability, ..
    } => {
      assert_eq!(registry, "algorithm");
      assert!(capability.ends_with("CountdownSource"));
    }
    other => panic!("Expected NotFound, got {:?}", other),
  }
}

#[test]
fn test_find_by_tag_skips_untagged_and_other_tags() {
  setup_tracing();
  let log = ExecLog::new();
  let mut kernel = Kernel::new();
  kernel.add_alg(CountdownSource::new("untagged", 1, &log));
  kernel.add_alg(CountdownSource::new("seven", 1, &log).tagged(7));
  let eleven = kernel.add_alg(CountdownSource::new("eleven", 1, &log).tagged(11));

  let found = kernel.find_alg_by_tag::<CountdownSource>(11).unwrap();
  assert!(found.ptr_eq(&eleven));
  assert_eq!(found.tag().unwrap(), 11);

  let missing = kernel.find_alg_by_tag::<CountdownSource>(3).unwrap_err();
  assert!(missing.to_string().contains("with tag 3"));
}

#[test]
fn test_tag_query_on_untagged_stage_is_unsupported() {
  setup_tracing();
  let log = ExecLog::new();
  let mut kernel = Kernel::new();
  let untagged = kernel.add_alg(Recorder::new("plain", &log));

  match untagged.tag() {
    Err(KernelError::UnsupportedOperation { stage, operation }) => {
      assert_eq!(stage, "plain");
      assert_eq!(operation, "tag");
    }
    other => panic!("Expected UnsupportedOperation, got {:?}", other),
  }
}

#[test]
fn test_tools_and_algorithms_live_in_separate_registries() {
  setup_tracing();
  let mut kernel = Kernel::new();
  let plain = kernel.add_tool(CounterTool::default());
  let tagged = kernel.add_tool(CounterTool::tagged(2));

  assert!(kernel.find_tool::<CounterTool>().unwrap().ptr_eq(&plain));
  assert!(kernel.find_tool_by_tag::<CounterTool>(2).unwrap().ptr_eq(&tagged));
  assert!(kernel.find_tool::<MissingTool>().unwrap_err().is_not_found());
  assert_eq!(kernel.tools().len(), 2);
  assert!(kernel.algorithms().is_empty());
}

#[test]
fn test_handles_returned_by_add_are_usable_before_run() {
  setup_tracing();
  let mut kernel = Kernel::new();
  let counter = kernel.add_tool(CounterTool::default());
  counter.write().value = 41;

  let found = kernel.find_tool::<CounterTool>().unwrap();
  found.write().value += 1;
  assert_eq!(counter.read().value, 42);
}

/// Finds "some other peer" with an always-true predicate during its own
/// connect. Its own entry is locked while connecting, so it is skipped.
struct Peer {
  label: &'static str,
  log: ExecLog,
  _partner: Option<StageRef<Peer>>,
}

impl Peer {
  fn new(label: &'static str, log: &ExecLog) -> Self {
    Self {
      label,
      log: log.clone(),
      _partner: None,
    }
  }
}

impl Stage for Peer {
  fn name(&self) -> &str {
    self.label
  }

  fn connect(&mut self, kernel: &Kernel) -> KernelResult<()> {
    let partner = kernel.find_alg_where::<Peer>(|_| true)?;
    // A plain type lookup needs no lock and may return the caller itself.
    let itself = kernel.find_alg::<Peer>()?;
    self
      .log
      .push(format!("{} partner={} self={}", self.label, partner.id(), itself.id()));
    self._partner = Some(partner);
    Ok(())
  }
}

impl Algorithm for Peer {
  fn execute(&mut self) -> KernelResult<Status> {
    Ok(Status::Exhausted)
  }

  fn is_data_source(&self) -> bool {
    true
  }
}

#[test]
fn test_predicate_lookup_skips_stage_running_its_own_hook() {
  setup_tracing();
  let log = ExecLog::new();
  let mut kernel = Kernel::new();
  let first = kernel.add_alg(Peer::new("first", &log));
  let second = kernel.add_alg(Peer::new("second", &log));

  kernel.run(no_inputs()).unwrap();

  assert_eq!(
    log.entries(),
    vec![
      format!("first partner={} self={}", second.id(), first.id()),
      format!("second partner={} self={}", first.id(), first.id()),
    ]
  );
  // Peers holding handles to each other are still released at teardown.
  assert!(first.is_released());
  assert!(second.is_released());
}

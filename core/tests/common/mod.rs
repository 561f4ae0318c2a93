// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every fixture

use algokernel::{Algorithm, Kernel, KernelResult, RecordSource, Stage, Status, Tool};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::Level;

// --- Shared execution log ---

/// Ordered record of hook calls, shared between fixtures and assertions.
#[derive(Clone, Default)]
pub struct ExecLog(Arc<Mutex<Vec<String>>>);

impl ExecLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&self, entry: impl Into<String>) {
    self.0.lock().push(entry.into());
  }

  pub fn entries(&self) -> Vec<String> {
    self.0.lock().clone()
  }

  pub fn count(&self, entry: &str) -> usize {
    self.0.lock().iter().filter(|e| e.as_str() == entry).count()
  }
}

// --- Data sources ---

/// Data source active for exactly `ticks` ticks: it returns `Continue` on its
/// first `ticks - 1` calls and `Exhausted` on call number `ticks`.
pub struct CountdownSource {
  pub label: String,
  pub ticks: u64,
  pub calls: u64,
  pub tag: Option<i64>,
  log: ExecLog,
}

impl CountdownSource {
  pub fn new(label: &str, ticks: u64, log: &ExecLog) -> Self {
    Self {
      label: label.to_string(),
      ticks,
      calls: 0,
      tag: None,
      log: log.clone(),
    }
  }

  pub fn tagged(mut self, tag: i64) -> Self {
    self.tag = Some(tag);
    self
  }
}

impl Stage for CountdownSource {
  fn name(&self) -> &str {
    &self.label
  }

  fn tag(&self) -> Option<i64> {
    self.tag
  }
}

impl Algorithm for CountdownSource {
  fn execute(&mut self) -> KernelResult<Status> {
    self.calls += 1;
    self.log.push(self.label.clone());
    if self.calls >= self.ticks {
      Ok(Status::Exhausted)
    } else {
      Ok(Status::Continue)
    }
  }

  fn is_data_source(&self) -> bool {
    true
  }
}

/// Data source that never reports `Exhausted`.
pub struct EndlessSource;

impl Stage for EndlessSource {}

impl Algorithm for EndlessSource {
  fn execute(&mut self) -> KernelResult<Status> {
    Ok(Status::Continue)
  }

  fn is_data_source(&self) -> bool {
    true
  }
}

/// Record source replaying a script: `Some(v)` produces record `v` that tick,
/// `None` produces nothing. Once the script is used up it reports `Exhausted`.
pub struct ScriptedSource {
  pub tag: Option<i64>,
  script: std::vec::IntoIter<Option<i64>>,
  current: i64,
  ready: bool,
}

impl ScriptedSource {
  pub fn new(script: Vec<Option<i64>>) -> Self {
    Self {
      tag: None,
      script: script.into_iter(),
      current: 0,
      ready: false,
    }
  }

  pub fn values(values: &[i64]) -> Self {
    Self::new(values.iter().copied().map(Some).collect())
  }

  pub fn tagged(mut self, tag: i64) -> Self {
    self.tag = Some(tag);
    self
  }
}

impl Stage for ScriptedSource {
  fn tag(&self) -> Option<i64> {
    self.tag
  }
}

impl Algorithm for ScriptedSource {
  fn execute(&mut self) -> KernelResult<Status> {
    match self.script.next() {
      Some(Some(value)) => {
        self.current = value;
        self.ready = true;
        Ok(Status::Continue)
      }
      Some(None) => {
        self.ready = false;
        Ok(Status::Continue)
      }
      None => {
        self.ready = false;
        Ok(Status::Exhausted)
      }
    }
  }

  fn is_data_source(&self) -> bool {
    true
  }
}

impl RecordSource for ScriptedSource {
  type Record = i64;

  fn ready(&self) -> bool {
    self.ready
  }

  fn record(&self) -> &i64 {
    &self.current
  }
}

// --- Passive algorithms ---

/// Non-source algorithm that logs every execution.
pub struct Recorder {
  pub label: String,
  log: ExecLog,
}

impl Recorder {
  pub fn new(label: &str, log: &ExecLog) -> Self {
    Self {
      label: label.to_string(),
      log: log.clone(),
    }
  }
}

impl Stage for Recorder {
  fn name(&self) -> &str {
    &self.label
  }
}

impl Algorithm for Recorder {
  fn execute(&mut self) -> KernelResult<Status> {
    self.log.push(self.label.clone());
    Ok(Status::Continue)
  }
}

/// Non-source algorithm returning `SkipRestOfTick` on the listed call numbers (1-based).
pub struct Vetoer {
  pub label: String,
  pub calls: u64,
  veto_on: Vec<u64>,
  log: ExecLog,
}

impl Vetoer {
  pub fn new(label: &str, veto_on: &[u64], log: &ExecLog) -> Self {
    Self {
      label: label.to_string(),
      calls: 0,
      veto_on: veto_on.to_vec(),
      log: log.clone(),
    }
  }
}

impl Stage for Vetoer {
  fn name(&self) -> &str {
    &self.label
  }
}

impl Algorithm for Vetoer {
  fn execute(&mut self) -> KernelResult<Status> {
    self.calls += 1;
    self.log.push(self.label.clone());
    Ok(Status::skip_if(self.veto_on.contains(&self.calls)))
  }
}

/// Logs `drop:<label>` when dropped. Embed it in a fixture to observe release.
pub struct DropMarker {
  pub label: &'static str,
  log: ExecLog,
}

impl DropMarker {
  pub fn new(label: &'static str, log: &ExecLog) -> Self {
    Self { label, log: log.clone() }
  }
}

impl Drop for DropMarker {
  fn drop(&mut self) {
    self.log.push(format!("drop:{}", self.label));
  }
}

// --- Tools ---

/// Shared counter tool with an optional tag.
#[derive(Default)]
pub struct CounterTool {
  pub tag: Option<i64>,
  pub value: u64,
}

impl CounterTool {
  pub fn tagged(tag: i64) -> Self {
    Self {
      tag: Some(tag),
      value: 0,
    }
  }
}

impl Stage for CounterTool {
  fn tag(&self) -> Option<i64> {
    self.tag
  }
}

impl Tool for CounterTool {}

/// A tool type nobody registers.
pub struct MissingTool;

impl Stage for MissingTool {}
impl Tool for MissingTool {}

/// Algorithm whose `connect` requires a tool of type `T`.
pub struct NeedsTool<T: Tool> {
  _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Tool> NeedsTool<T> {
  pub fn new() -> Self {
    Self {
      _marker: std::marker::PhantomData,
    }
  }
}

impl<T: Tool> Stage for NeedsTool<T> {
  fn connect(&mut self, kernel: &Kernel) -> KernelResult<()> {
    kernel.find_tool::<T>()?;
    Ok(())
  }
}

impl<T: Tool> Algorithm for NeedsTool<T> {
  fn execute(&mut self) -> KernelResult<Status> {
    Ok(Status::Continue)
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Shorthand for running without inputs.
pub fn no_inputs() -> Vec<String> {
  Vec::new()
}

// algokernel/src/kernel/definition.rs

//! Contains the `Kernel` struct and the methods for registering stages, looking
//! them up, and reaching the shared resources.

use crate::core::stage::{Algorithm, Tool};
use crate::core::stage_ref::{StageId, StageRef};
use crate::error::KernelResult;
use crate::kernel::config::KernelConfig;
use crate::registry::Registry;
use crate::resources::{InputResource, OutputResource, ResourceManager, DEFAULT_OUTPUT};

use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Lifecycle phases of a kernel, in the only order they can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
  /// Accepting registrations.
  Empty,
  Loading,
  Connecting,
  Running,
  Finalizing,
  /// Stages released, outputs closed. Nothing more can happen.
  TornDown,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}

/// Owns every algorithm, tool and resource of one run, and drives them.
///
/// Registration order is execution order. Stages find each other by type
/// (optionally refined by a predicate or tag) during `connect`.
pub struct Kernel {
  pub(crate) config: KernelConfig,
  pub(crate) phase: Phase,
  next_id: usize,

  pub(crate) algs: Registry<dyn Algorithm>,
  pub(crate) tools: Registry<dyn Tool>,
  /// Every algorithm that reported itself as a data source at registration.
  pub(crate) data_sources: BTreeSet<StageId>,
  /// Data sources that have not reported `Exhausted` yet.
  pub(crate) active_sources: BTreeSet<StageId>,

  // Keep `resources` declared AFTER the stage registries: fields drop in
  // declaration order and stage destructors may still write to outputs.
  pub(crate) resources: ResourceManager,
}

impl Kernel {
  pub fn new() -> Self {
    Self::with_config(KernelConfig::default())
  }

  pub fn with_config(config: KernelConfig) -> Self {
    Self {
      config,
      phase: Phase::Empty,
      next_id: 0,
      algs: Registry::new("algorithm"),
      tools: Registry::new("tool"),
      data_sources: BTreeSet::new(),
      active_sources: BTreeSet::new(),
      resources: ResourceManager::new(),
    }
  }

  pub fn config(&self) -> &KernelConfig {
    &self.config
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  /// Panics if registration is no longer allowed. This is a setup bug, not a
  /// runtime condition.
  fn ensure_registration_open<T>(&self, what: &str) {
    if self.phase != Phase::Empty {
      panic!(
        "algokernel setup error: cannot register {} '{}' in phase {}.",
        what,
        std::any::type_name::<T>(),
        self.phase
      );
    }
  }

  fn next_stage_id(&mut self) -> StageId {
    let id = StageId(self.next_id);
    self.next_id += 1;
    id
  }

  // --- Registration ---

  /// Takes ownership of `alg` and appends it to the execution order. The
  /// returned handle does not keep the algorithm alive past teardown.
  ///
  /// A data source (`Algorithm::is_data_source`) joins the active-sources set
  /// right away.
  pub fn add_alg<T: Algorithm>(&mut self, alg: T) -> StageRef<T> {
    self.ensure_registration_open::<T>("algorithm");
    let id = self.next_stage_id();
    let is_source = alg.is_data_source();

    let owner = Arc::new(RwLock::new(alg));
    let handle = StageRef::downgrade(id, &owner);
    let erased: Arc<RwLock<dyn Algorithm>> = owner.clone();
    self.algs.insert(id, owner, erased);

    if is_source {
      self.data_sources.insert(id);
      self.active_sources.insert(id);
    }
    handle
  }

  /// Takes ownership of `tool`.
  pub fn add_tool<T: Tool>(&mut self, tool: T) -> StageRef<T> {
    self.ensure_registration_open::<T>("tool");
    let id = self.next_stage_id();
    let owner = Arc::new(RwLock::new(tool));
    let handle = StageRef::downgrade(id, &owner);
    let erased: Arc<RwLock<dyn Tool>> = owner.clone();
    self.tools.insert(id, owner, erased);
    handle
  }

  // --- Lookup ---

  pub fn algorithms(&self) -> &Registry<dyn Algorithm> {
    &self.algs
  }

  pub fn tools(&self) -> &Registry<dyn Tool> {
    &self.tools
  }

  /// First registered algorithm of type `T`. Fails with `NotFound`.
  pub fn find_alg<T: Algorithm>(&self) -> KernelResult<StageRef<T>> {
    self.algs.find::<T>()
  }

  pub fn find_alg_where<T: Algorithm>(&self, pred: impl Fn(&T) -> bool) -> KernelResult<StageRef<T>> {
    self.algs.find_where::<T, _>(pred)
  }

  pub fn find_alg_by_tag<T: Algorithm>(&self, tag: impl Into<i64>) -> KernelResult<StageRef<T>> {
    self.algs.find_by_tag::<T>(tag.into())
  }

  /// First registered tool of type `T`. Fails with `NotFound`.
  pub fn find_tool<T: Tool>(&self) -> KernelResult<StageRef<T>> {
    self.tools.find::<T>()
  }

  pub fn find_tool_where<T: Tool>(&self, pred: impl Fn(&T) -> bool) -> KernelResult<StageRef<T>> {
    self.tools.find_where::<T, _>(pred)
  }

  pub fn find_tool_by_tag<T: Tool>(&self, tag: impl Into<i64>) -> KernelResult<StageRef<T>> {
    self.tools.find_by_tag::<T>(tag.into())
  }

  // --- Data sources ---

  pub fn is_active_source(&self, id: StageId) -> bool {
    self.active_sources.contains(&id)
  }

  pub fn active_source_count(&self) -> usize {
    self.active_sources.len()
  }

  pub fn data_source_count(&self) -> usize {
    self.data_sources.len()
  }

  // --- Resources ---

  pub fn resources(&self) -> &ResourceManager {
    &self.resources
  }

  /// See `ResourceManager::open_output`.
  pub fn open_output(&self, path: impl AsRef<Path>, name: &str, reopen: bool) -> KernelResult<Arc<OutputResource>> {
    self.resources.open_output(path, name, reopen)
  }

  /// Opens the output registered under `DEFAULT_OUTPUT`.
  pub fn open_default_output(&self, path: impl AsRef<Path>) -> KernelResult<Arc<OutputResource>> {
    self.resources.open_output(path, DEFAULT_OUTPUT, false)
  }

  pub fn output(&self, name: &str) -> KernelResult<Arc<OutputResource>> {
    self.resources.output(name)
  }

  pub fn default_output(&self) -> KernelResult<Arc<OutputResource>> {
    self.resources.default_output()
  }

  /// The output made current for finalize, if any.
  pub fn current_output(&self) -> Option<Arc<OutputResource>> {
    self.resources.current_output()
  }

  pub fn input_count(&self) -> usize {
    self.resources.input_count()
  }

  pub fn input(&self, index: usize) -> KernelResult<Arc<InputResource>> {
    self.resources.input(index)
  }
}

impl Default for Kernel {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Kernel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Kernel")
      .field("phase", &self.phase)
      .field("algorithms", &self.algs.type_names())
      .field("tools", &self.tools.type_names())
      .field("active_sources", &self.active_sources.len())
      .finish()
  }
}

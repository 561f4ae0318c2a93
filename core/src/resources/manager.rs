// algokernel/src/resources/manager.rs

use crate::error::{KernelError, KernelResult};
use crate::resources::handle::{InputResource, OutputResource};

use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{event, Level};

/// Name used when an output is opened or fetched without an explicit name.
pub const DEFAULT_OUTPUT: &str = "default";

/// Owns the named outputs and the path-keyed input cache of one kernel.
///
/// Every method takes `&self` so stages can reach it through `&Kernel` from
/// inside their hooks.
#[derive(Debug, Default)]
pub struct ResourceManager {
  outputs: Mutex<BTreeMap<String, Arc<OutputResource>>>,
  current_output: Mutex<Option<String>>,
  input_paths: RwLock<Vec<PathBuf>>,
  inputs: Mutex<HashMap<PathBuf, Arc<InputResource>>>,
}

impl ResourceManager {
  pub fn new() -> Self {
    Self::default()
  }

  /// Opens a writable output at `path` under `name`.
  ///
  /// If `name` is already open this fails with `AlreadyOpen`, unless `reopen`
  /// is set, in which case the previous handle is closed before the new file
  /// is created.
  pub fn open_output(&self, path: impl AsRef<Path>, name: &str, reopen: bool) -> KernelResult<Arc<OutputResource>> {
    let mut outputs = self.outputs.lock();
    if !reopen && outputs.contains_key(name) {
      event!(Level::ERROR, %name, "Output already open.");
      return Err(KernelError::AlreadyOpen { name: name.to_string() });
    }
    // Unregister before closing: a failed flush must not leave a closed handle
    // registered under `name`.
    if let Some(previous) = outputs.remove(name) {
      event!(Level::DEBUG, %name, "Reopening output, closing previous handle.");
      previous.close()?;
    }

    let output = Arc::new(OutputResource::create(name, path.as_ref())?);
    outputs.insert(name.to_string(), Arc::clone(&output));
    Ok(output)
  }

  /// `open_output` under `DEFAULT_OUTPUT`, without reopening.
  pub fn open_default_output(&self, path: impl AsRef<Path>) -> KernelResult<Arc<OutputResource>> {
    self.open_output(path, DEFAULT_OUTPUT, false)
  }

  /// The currently open output registered under `name`.
  pub fn output(&self, name: &str) -> KernelResult<Arc<OutputResource>> {
    self
      .outputs
      .lock()
      .get(name)
      .cloned()
      .ok_or_else(|| KernelError::OutputNotOpen { name: name.to_string() })
  }

  pub fn default_output(&self) -> KernelResult<Arc<OutputResource>> {
    self.output(DEFAULT_OUTPUT)
  }

  pub fn has_output(&self, name: &str) -> bool {
    self.outputs.lock().contains_key(name)
  }

  /// Marks `name` as the current output. Fails if it is not open.
  pub fn select_output(&self, name: &str) -> KernelResult<()> {
    if !self.has_output(name) {
      return Err(KernelError::OutputNotOpen { name: name.to_string() });
    }
    *self.current_output.lock() = Some(name.to_string());
    Ok(())
  }

  /// The output last passed to `select_output`, if it is still open.
  pub fn current_output(&self) -> Option<Arc<OutputResource>> {
    let name = self.current_output.lock().clone()?;
    self.outputs.lock().get(&name).cloned()
  }

  /// Replaces the configured input paths. The kernel calls this at the start of a run.
  pub fn set_input_paths(&self, paths: &[String]) {
    *self.input_paths.write() = paths.iter().map(PathBuf::from).collect();
  }

  /// Number of configured input paths (duplicates included).
  pub fn input_count(&self) -> usize {
    self.input_paths.read().len()
  }

  /// The input at `index`, opened on first access and cached by path.
  pub fn input(&self, index: usize) -> KernelResult<Arc<InputResource>> {
    let path = {
      let paths = self.input_paths.read();
      paths.get(index).cloned().ok_or(KernelError::InputOutOfRange {
        index,
        count: paths.len(),
      })?
    };

    let mut inputs = self.inputs.lock();
    if let Some(cached) = inputs.get(&path) {
      return Ok(Arc::clone(cached));
    }
    let input = Arc::new(InputResource::open(&path)?);
    inputs.insert(path, Arc::clone(&input));
    Ok(input)
  }

  /// Flushes and closes every output, then drops all handles.
  ///
  /// Every output is attempted; the first failure is returned.
  pub(crate) fn close_all(&self) -> KernelResult<()> {
    let outputs = std::mem::take(&mut *self.outputs.lock());
    *self.current_output.lock() = None;
    self.inputs.lock().clear();

    let mut first_err = None;
    for (name, output) in outputs {
      if let Err(e) = output.close() {
        event!(Level::ERROR, %name, error = %e, "Failed to close output.");
        first_err.get_or_insert(e);
      }
    }
    first_err.map_or(Ok(()), Err)
  }
}

impl Drop for ResourceManager {
  fn drop(&mut self) {
    // Runs after the kernel's stage lists, so stage destructors could still write.
    let _ = self.close_all();
  }
}

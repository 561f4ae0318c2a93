// algokernel/src/registry.rs

//! Defines `Registry<S>`, the ordered ownership container behind the kernel's
//! algorithm and tool lists.
//!
//! Each entry is stored twice over the same allocation: once erased to the
//! registry's trait object `S` (so the kernel can drive it), and once as
//! `dyn Any` (so lookups can narrow it back to its concrete type).
//! Lookups scan in registration order and return the first match; a lookup
//! that matches nothing is an error, never a silent `None`.
//!
//! Narrowing matches the exact concrete type only. A lookup cannot ask for
//! "any stage implementing trait X" (for example any `RecordSource`); look up
//! the concrete type, or tag the candidates and use `find_by_tag`.
//!
//! The registry holds the only owning reference to each stage. Lookups hand
//! out non-owning `StageRef`s, so `clear` really drops the stages.

use crate::core::stage::Stage;
use crate::core::stage_ref::{StageId, StageRef};
use crate::error::{KernelError, KernelResult};

use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;
use tracing::{event, Level};

struct Entry<S: ?Sized> {
  id: StageId,
  type_name: &'static str,
  /// The same `Arc<RwLock<T>>` as `stage`, kept un-erased for downcasting.
  any: Arc<dyn Any + Send + Sync>,
  stage: Arc<RwLock<S>>,
}

/// Ordered, type-narrowable collection of stages.
pub struct Registry<S: ?Sized> {
  kind: &'static str,
  entries: Vec<Entry<S>>,
}

impl<S: ?Sized> Registry<S> {
  /// `kind` names the registry in errors and logs ("algorithm", "tool").
  pub(crate) fn new(kind: &'static str) -> Self {
    Self {
      kind,
      entries: Vec::new(),
    }
  }

  /// Takes ownership of a stage. `erased` must be `owner` coerced to `S`.
  pub(crate) fn insert<T: Stage>(&mut self, id: StageId, owner: Arc<RwLock<T>>, erased: Arc<RwLock<S>>) {
    event!(Level::DEBUG, registry = self.kind, %id, stage_type = %std::any::type_name::<T>(), "Registering stage.");
    let any: Arc<dyn Any + Send + Sync> = owner;
    self.entries.push(Entry {
      id,
      type_name: std::any::type_name::<T>(),
      any,
      stage: erased,
    });
  }

  pub fn kind(&self) -> &'static str {
    self.kind
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Type names of the registered stages, in registration order.
  pub fn type_names(&self) -> Vec<&'static str> {
    self.entries.iter().map(|e| e.type_name).collect()
  }

  /// Iterates the erased stages in registration order.
  pub(crate) fn iter(&self) -> impl Iterator<Item = (StageId, &Arc<RwLock<S>>)> + '_ {
    self.entries.iter().map(|e| (e.id, &e.stage))
  }

  /// Drops the registry's references, last registered first.
  pub(crate) fn clear(&mut self) {
    while let Some(entry) = self.entries.pop() {
      event!(Level::TRACE, registry = self.kind, id = %entry.id, stage_type = entry.type_name, "Releasing stage.");
      drop(entry);
    }
  }

  /// First stage of type `T`.
  pub fn find<T: Stage>(&self) -> KernelResult<StageRef<T>> {
    self.lookup::<T>(None, String::new)
  }

  /// First stage of type `T` for which `pred` holds.
  ///
  /// The predicate needs a read lock on each candidate. A candidate whose own
  /// hook is running (it is write-locked by the kernel) is skipped, so when a
  /// stage calls this from its own hook the first-match guarantee does not
  /// cover the caller: a later match may be returned instead of the caller.
  pub fn find_where<T, P>(&self, pred: P) -> KernelResult<StageRef<T>>
  where
    T: Stage,
    P: Fn(&T) -> bool,
  {
    let pred: &dyn Fn(&T) -> bool = &pred;
    self.lookup::<T>(Some(pred), || " matching the given predicate".to_string())
  }

  /// First stage of type `T` whose `Stage::tag` equals `tag`. Skips a locked
  /// caller the same way `find_where` does.
  pub fn find_by_tag<T: Stage>(&self, tag: i64) -> KernelResult<StageRef<T>> {
    let pred = move |stage: &T| stage.tag() == Some(tag);
    let pred: &dyn Fn(&T) -> bool = &pred;
    self.lookup::<T>(Some(pred), || format!(" with tag {}", tag))
  }

  fn lookup<T: Stage>(
    &self,
    pred: Option<&dyn Fn(&T) -> bool>,
    detail: impl FnOnce() -> String,
  ) -> KernelResult<StageRef<T>> {
    for entry in &self.entries {
      let shared = match Arc::clone(&entry.any).downcast::<RwLock<T>>() {
        Ok(shared) => shared,
        Err(_) => continue,
      };
      let Some(pred) = pred else {
        return Ok(StageRef::downgrade(entry.id, &shared));
      };
      let matched = shared.try_read().map(|guard| pred(&*guard));
      match matched {
        Some(true) => return Ok(StageRef::downgrade(entry.id, &shared)),
        Some(false) => {}
        None => {
          event!(
            Level::DEBUG,
            registry = self.kind,
            id = %entry.id,
            stage_type = entry.type_name,
            "Candidate is locked by a running hook, skipping it."
          );
        }
      }
    }

    let capability = std::any::type_name::<T>();
    let detail = detail();
    event!(Level::ERROR, registry = self.kind, %capability, %detail, "Lookup matched no registered stage.");
    Err(KernelError::NotFound {
      registry: self.kind,
      capability,
      detail,
    })
  }
}

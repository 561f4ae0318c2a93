// algokernel/src/core/stage_ref.rs
use parking_lot::lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard};
use parking_lot::{RawRwLock, RwLock};
use std::fmt;
use std::sync::{Arc, Weak};

use crate::core::stage::{require_tag, Stage};
use crate::error::KernelResult;

/// Identity of a registered stage, unique within one kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StageId(pub(crate) usize);

impl fmt::Display for StageId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Read guard returned by `StageRef::read`. Keeps the stage alive while held.
pub type StageReadGuard<T> = ArcRwLockReadGuard<RawRwLock, T>;
/// Write guard returned by `StageRef::write`. Keeps the stage alive while held.
pub type StageWriteGuard<T> = ArcRwLockWriteGuard<RawRwLock, T>;

/// A non-owning handle to a stage owned by a `Kernel`.
///
/// Returned by registration and by every lookup. Stages keep these to reach
/// the algorithms and tools they depend on. The kernel holds the only owning
/// reference, so every stage is dropped at teardown no matter how many
/// handles are still around; after that `read`/`write` panic and the `try_*`
/// variants return `None`.
///
/// IMPORTANT: while the kernel runs one of a stage's hooks, that stage is
/// write-locked. Locking the same stage again from inside its own hook
/// deadlocks, so a stage must not `read()` a handle to itself.
pub struct StageRef<T: ?Sized> {
  id: StageId,
  inner: Weak<RwLock<T>>,
}

impl<T: ?Sized> StageRef<T> {
  pub(crate) fn downgrade(id: StageId, owner: &Arc<RwLock<T>>) -> Self {
    StageRef {
      id,
      inner: Arc::downgrade(owner),
    }
  }

  pub fn id(&self) -> StageId {
    self.id
  }

  /// True once the kernel has dropped the stage.
  pub fn is_released(&self) -> bool {
    self.inner.strong_count() == 0
  }

  fn live(&self) -> Arc<RwLock<T>> {
    match self.inner.upgrade() {
      Some(owner) => owner,
      None => panic!(
        "algokernel stage {} ({}) was used after the kernel released it.",
        self.id,
        std::any::type_name::<T>()
      ),
    }
  }

  /// Acquires a read lock.
  ///
  /// # Panics
  /// If the kernel has already released the stage.
  pub fn read(&self) -> StageReadGuard<T> {
    self.live().read_arc()
  }

  /// Acquires a write lock.
  ///
  /// # Panics
  /// If the kernel has already released the stage.
  pub fn write(&self) -> StageWriteGuard<T> {
    self.live().write_arc()
  }

  /// Read lock without blocking. `None` if locked or released.
  pub fn try_read(&self) -> Option<StageReadGuard<T>> {
    self.inner.upgrade()?.try_read_arc()
  }

  /// Write lock without blocking. `None` if locked or released.
  pub fn try_write(&self) -> Option<StageWriteGuard<T>> {
    self.inner.upgrade()?.try_write_arc()
  }

  /// True when both handles point at the same stage instance.
  pub fn ptr_eq(&self, other: &StageRef<T>) -> bool {
    Weak::ptr_eq(&self.inner, &other.inner)
  }
}

impl<T: Stage + ?Sized> StageRef<T> {
  /// The stage's tag, failing with `UnsupportedOperation` if it reports none.
  pub fn tag(&self) -> KernelResult<i64> {
    require_tag(&*self.read())
  }
}

impl<T: ?Sized> Clone for StageRef<T> {
  fn clone(&self) -> Self {
    StageRef {
      id: self.id,
      inner: Weak::clone(&self.inner),
    }
  }
}

impl<T: ?Sized> fmt::Debug for StageRef<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StageRef")
      .field("id", &self.id)
      .field("type", &std::any::type_name::<T>())
      .field("released", &self.is_released())
      .finish()
  }
}

// algokernel/src/consumer/adapter.rs

use crate::consumer::source::RecordSource;
use crate::core::control::Status;
use crate::core::stage::{Algorithm, Stage};
use crate::core::stage_ref::StageRef;
use crate::error::{KernelError, KernelResult};
use crate::kernel::Kernel;

use std::fmt;
use tracing::{event, Level};

/// Per-record logic plugged into a `Consumer`.
pub trait Consume<R: RecordSource>: Send + Sync + 'static {
  fn consume(&mut self, record: &R::Record) -> KernelResult<Status>;

  /// Called after the consumer has resolved its source.
  fn connect(&mut self, _kernel: &Kernel) -> KernelResult<()> {
    Ok(())
  }

  fn finalize(&mut self, _kernel: &Kernel) -> KernelResult<()> {
    Ok(())
  }
}

/// Adapts a closure into a `Consume` implementation.
pub struct FnConsume<F>(F);

impl<F> FnConsume<F> {
  pub fn new(f: F) -> Self {
    FnConsume(f)
  }
}

impl<R, F> Consume<R> for FnConsume<F>
where
  R: RecordSource,
  F: FnMut(&R::Record) -> KernelResult<Status> + Send + Sync + 'static,
{
  fn consume(&mut self, record: &R::Record) -> KernelResult<Status> {
    (self.0)(record)
  }
}

/// An algorithm bound to one upstream `RecordSource` of type `R`.
pub struct Consumer<R: RecordSource, C> {
  name: String,
  tag: Option<i64>,
  source_tag: Option<i64>,
  source: Option<StageRef<R>>,
  handler: C,
}

impl<R, C> Consumer<R, C>
where
  R: RecordSource,
  C: Consume<R>,
{
  pub fn new(handler: C) -> Self {
    Self {
      name: format!("Consumer<{}>", std::any::type_name::<R>()),
      tag: None,
      source_tag: None,
      source: None,
      handler,
    }
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  /// Tag this consumer itself reports.
  pub fn with_tag(mut self, tag: i64) -> Self {
    self.tag = Some(tag);
    self
  }

  /// Bind to the first source of type `R` reporting `tag` instead of the
  /// first source of type `R`.
  pub fn with_source_tag(mut self, tag: i64) -> Self {
    self.source_tag = Some(tag);
    self
  }

  pub fn handler(&self) -> &C {
    &self.handler
  }

  pub fn handler_mut(&mut self) -> &mut C {
    &mut self.handler
  }

  /// The resolved source, once connected.
  pub fn source(&self) -> Option<&StageRef<R>> {
    self.source.as_ref()
  }
}

impl<R, F> Consumer<R, FnConsume<F>>
where
  R: RecordSource,
  F: FnMut(&R::Record) -> KernelResult<Status> + Send + Sync + 'static,
{
  pub fn from_fn(f: F) -> Self {
    Self::new(FnConsume(f))
  }
}

impl<R, C> Stage for Consumer<R, C>
where
  R: RecordSource,
  C: Consume<R>,
{
  fn name(&self) -> &str {
    &self.name
  }

  fn connect(&mut self, kernel: &Kernel) -> KernelResult<()> {
    let source = match self.source_tag {
      Some(tag) => kernel.find_alg_by_tag::<R>(tag)?,
      None => kernel.find_alg::<R>()?,
    };
    event!(Level::DEBUG, consumer = %self.name, source = %source.id(), "Consumer bound to source.");
    self.source = Some(source);
    self.handler.connect(kernel)
  }

  fn tag(&self) -> Option<i64> {
    self.tag
  }
}

impl<R, C> Algorithm for Consumer<R, C>
where
  R: RecordSource,
  C: Consume<R>,
{
  fn execute(&mut self) -> KernelResult<Status> {
    let source = self
      .source
      .as_ref()
      .ok_or_else(|| KernelError::Internal(format!("{} executed before connect", self.name)))?;
    let source = source.read();
    if source.ready() {
      self.handler.consume(source.record())
    } else {
      Ok(Status::Continue)
    }
  }

  fn finalize(&mut self, kernel: &Kernel) -> KernelResult<()> {
    self.handler.finalize(kernel)
  }
}

impl<R: RecordSource, C> fmt::Debug for Consumer<R, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Consumer")
      .field("name", &self.name)
      .field("source_tag", &self.source_tag)
      .field("connected", &self.source.is_some())
      .finish()
  }
}

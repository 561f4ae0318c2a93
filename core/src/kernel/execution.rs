// algokernel/src/kernel/execution.rs

//! Contains `Kernel::run()`: load, connect, the tick loop, finalize and teardown.

use crate::core::control::{RunOutcome, RunSummary, Status};
use crate::core::stage::Stage;
use crate::error::{KernelError, KernelResult};
use crate::kernel::definition::{Kernel, Phase};
use crate::resources::DEFAULT_OUTPUT;
use tracing::{event, instrument, span, Level};

/// Names the stage a plain handler error came from. Other kinds pass through.
fn attribute<S: Stage + ?Sized>(err: KernelError, stage: &S, phase: &'static str) -> KernelError {
  match err {
    KernelError::HandlerError { source } => KernelError::StageFailure {
      stage: stage.name().to_string(),
      phase,
      source,
    },
    other => other,
  }
}

impl Kernel {
  /// Runs the whole lifecycle once: load, connect, execute ticks until every
  /// data source is exhausted, finalize, then tear down.
  ///
  /// Any error aborts the run. Teardown (releasing stages, then closing
  /// outputs) still happens; finalize does not. A kernel can only run once.
  #[instrument(
        name = "Kernel::run",
        skip_all,
        fields(
            num_algorithms = self.algs.len(),
            num_tools = self.tools.len(),
            num_data_sources = self.data_sources.len(),
        ),
        err(Display)
    )]
  pub fn run<I, P>(&mut self, input_paths: I) -> KernelResult<RunSummary>
  where
    I: IntoIterator<Item = P>,
    P: Into<String>,
  {
    if self.phase != Phase::Empty {
      return Err(KernelError::InvalidPhase {
        operation: "run",
        phase: self.phase.to_string(),
      });
    }
    let input_paths: Vec<String> = input_paths.into_iter().map(Into::into).collect();
    event!(Level::DEBUG, num_inputs = input_paths.len(), "Kernel run starting.");

    let result = self.drive(&input_paths);
    let teardown = self.teardown();

    match (result, teardown) {
      (Ok(summary), Ok(())) => {
        event!(Level::DEBUG, ?summary, "Kernel run completed.");
        Ok(summary)
      }
      (Err(e), _) => Err(e),
      (Ok(_), Err(e)) => Err(e),
    }
  }

  fn drive(&mut self, input_paths: &[String]) -> KernelResult<RunSummary> {
    self.resources.set_input_paths(input_paths);

    if self.data_sources.is_empty() && self.config.max_ticks.is_none() {
      event!(
        Level::WARN,
        "No data source registered and no tick limit configured; the execution loop will not terminate."
      );
    }

    self.load(input_paths)?;
    self.connect_all()?;
    let summary = self.execute_ticks()?;
    self.finalize_all()?;
    Ok(summary)
  }

  fn load(&mut self, input_paths: &[String]) -> KernelResult<()> {
    self.phase = Phase::Loading;
    let phase_span = span!(Level::INFO, "kernel_phase", phase = %self.phase);
    let _phase_guard = phase_span.enter();

    for (id, alg) in self.algs.iter() {
      let mut alg = alg.write();
      event!(Level::TRACE, %id, stage = alg.name(), "Loading.");
      alg.load(input_paths).map_err(|e| {
        event!(Level::ERROR, %id, stage = alg.name(), error = %e, "load failed.");
        attribute(e, &*alg, "load")
      })?;
    }
    Ok(())
  }

  fn connect_all(&mut self) -> KernelResult<()> {
    self.phase = Phase::Connecting;
    let phase_span = span!(Level::INFO, "kernel_phase", phase = %self.phase);
    let _phase_guard = phase_span.enter();

    let kernel: &Kernel = self;
    for (id, alg) in kernel.algs.iter() {
      let mut alg = alg.write();
      event!(Level::TRACE, %id, stage = alg.name(), "Connecting algorithm.");
      alg.connect(kernel).map_err(|e| {
        event!(Level::ERROR, %id, stage = alg.name(), error = %e, "connect failed.");
        attribute(e, &*alg, "connect")
      })?;
    }
    for (id, tool) in kernel.tools.iter() {
      let mut tool = tool.write();
      event!(Level::TRACE, %id, stage = tool.name(), "Connecting tool.");
      tool.connect(kernel).map_err(|e| {
        event!(Level::ERROR, %id, stage = tool.name(), error = %e, "connect failed.");
        attribute(e, &*tool, "connect")
      })?;
    }
    Ok(())
  }

  /// The execution loop. One tick is one pass over the algorithms in
  /// registration order; ticks repeat until the active-sources set empties.
  fn execute_ticks(&mut self) -> KernelResult<RunSummary> {
    self.phase = Phase::Running;
    let phase_span = span!(Level::INFO, "kernel_phase", phase = %self.phase);
    let _phase_guard = phase_span.enter();

    let Kernel {
      config,
      algs,
      data_sources,
      active_sources,
      ..
    } = self;

    let mut summary = RunSummary {
      outcome: RunOutcome::SourcesExhausted,
      ticks: 0,
      skipped_ticks: 0,
      executions: 0,
      exhausted_sources: Vec::new(),
    };

    loop {
      if let Some(limit) = config.max_ticks {
        if summary.ticks >= limit {
          event!(Level::WARN, ticks = summary.ticks, active_sources = active_sources.len(), "Tick limit reached, stopping.");
          summary.outcome = RunOutcome::TickLimitReached;
          break;
        }
      }
      summary.ticks += 1;
      let tick = summary.ticks;

      for (id, alg) in algs.iter() {
        let is_source = data_sources.contains(&id);
        if is_source && !active_sources.contains(&id) {
          continue; // exhausted, inert for the rest of the run
        }

        let mut alg = alg.write();
        let status = alg.execute().map_err(|e| {
          event!(Level::ERROR, tick, %id, stage = alg.name(), error = %e, "execute failed.");
          attribute(e, &*alg, "execute")
        })?;
        summary.executions += 1;

        match status {
          Status::Continue => {}
          Status::SkipRestOfTick => {
            event!(Level::TRACE, tick, %id, stage = alg.name(), "Rest of tick skipped.");
            summary.skipped_ticks += 1;
            break;
          }
          Status::Exhausted => {
            if is_source && active_sources.remove(&id) {
              event!(Level::DEBUG, tick, %id, stage = alg.name(), remaining = active_sources.len(), "Data source exhausted.");
              summary.exhausted_sources.push(alg.name().to_string());
            } else {
              event!(Level::TRACE, tick, %id, stage = alg.name(), "Exhausted reported by a non-source, ignored.");
            }
          }
        }
      }

      if let Some(interval) = config.progress_interval.filter(|n| *n > 0) {
        if tick % interval == 0 {
          event!(Level::INFO, tick, active_sources = active_sources.len(), executions = summary.executions, "Progress.");
        }
      }

      if !data_sources.is_empty() && active_sources.is_empty() {
        break;
      }
    }

    event!(Level::DEBUG, ticks = summary.ticks, skipped = summary.skipped_ticks, "Execution loop finished.");
    Ok(summary)
  }

  fn finalize_all(&mut self) -> KernelResult<()> {
    self.phase = Phase::Finalizing;
    let phase_span = span!(Level::INFO, "kernel_phase", phase = %self.phase);
    let _phase_guard = phase_span.enter();

    // For convenience, make the default output current.
    if self.resources.has_output(DEFAULT_OUTPUT) {
      self.resources.select_output(DEFAULT_OUTPUT)?;
    }

    let kernel: &Kernel = self;
    for (id, alg) in kernel.algs.iter() {
      let mut alg = alg.write();
      event!(Level::TRACE, %id, stage = alg.name(), "Finalizing.");
      alg.finalize(kernel).map_err(|e| {
        event!(Level::ERROR, %id, stage = alg.name(), error = %e, "finalize failed.");
        attribute(e, &*alg, "finalize")
      })?;
    }
    Ok(())
  }

  /// Releases tools, then algorithms, then closes the outputs. Outputs must
  /// outlive the stages because stage destructors may still write to them.
  fn teardown(&mut self) -> KernelResult<()> {
    self.phase = Phase::TornDown;
    event!(Level::DEBUG, "Tearing down.");
    self.tools.clear();
    self.algs.clear();
    self.resources.close_all()
  }
}

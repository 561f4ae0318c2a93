// algokernel/examples/basic_kernel.rs

use algokernel::{Algorithm, Kernel, KernelError, KernelResult, Stage, StageRef, Status, Tool};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

// 1. A tool shared by several algorithms. The count lives in an `Arc` so it
//    can still be read once the kernel has released its stages.
#[derive(Default)]
struct Tally {
  seen: Arc<AtomicU64>,
}

impl Stage for Tally {}
impl Tool for Tally {}

// 2. A data source: produces one number per tick, five times.
struct Counter {
  current: u64,
  limit: u64,
}

impl Stage for Counter {
  fn name(&self) -> &str {
    "counter"
  }
}

impl Algorithm for Counter {
  fn execute(&mut self) -> KernelResult<Status> {
    self.current += 1;
    info!(value = self.current, "counter produced a value");
    Ok(if self.current >= self.limit {
      Status::Exhausted
    } else {
      Status::Continue
    })
  }

  fn is_data_source(&self) -> bool {
    true
  }
}

// 3. A passive algorithm that reads the source and bumps the shared tool.
#[derive(Default)]
struct OddFilter {
  counter: Option<StageRef<Counter>>,
  tally: Option<StageRef<Tally>>,
}

impl Stage for OddFilter {
  fn name(&self) -> &str {
    "odd_filter"
  }

  fn connect(&mut self, kernel: &Kernel) -> KernelResult<()> {
    self.counter = Some(kernel.find_alg::<Counter>()?);
    self.tally = Some(kernel.find_tool::<Tally>()?);
    Ok(())
  }
}

impl Algorithm for OddFilter {
  fn execute(&mut self) -> KernelResult<Status> {
    let (Some(counter), Some(tally)) = (&self.counter, &self.tally) else {
      return Err(KernelError::Internal("odd_filter executed before connect".into()));
    };
    let value = counter.read().current;
    if value % 2 == 0 {
      // Even values stop the rest of this tick.
      return Ok(Status::SkipRestOfTick);
    }
    tally.read().seen.fetch_add(1, Ordering::Relaxed);
    Ok(Status::Continue)
  }
}

// 4. Runs after the filter; only sees ticks that were not skipped.
struct Printer;

impl Stage for Printer {}

impl Algorithm for Printer {
  fn execute(&mut self) -> KernelResult<Status> {
    info!("printer reached");
    Ok(Status::Continue)
  }
}

fn main() -> Result<(), KernelError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Kernel Example ---");

  let mut kernel = Kernel::new();
  let seen = Arc::new(AtomicU64::new(0));
  kernel.add_tool(Tally {
    seen: Arc::clone(&seen),
  });
  kernel.add_alg(Counter { current: 0, limit: 5 });
  kernel.add_alg(OddFilter::default());
  kernel.add_alg(Printer);

  let summary = kernel.run(Vec::<String>::new())?;

  info!(
    ticks = summary.ticks,
    skipped = summary.skipped_ticks,
    odd_values = seen.load(Ordering::Relaxed),
    "Run finished."
  );
  assert_eq!(seen.load(Ordering::Relaxed), 3);
  Ok(())
}

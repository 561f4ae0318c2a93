// algokernel/examples/record_consumer.rs

use algokernel::{Algorithm, Consume, Consumer, Kernel, KernelResult, RecordSource, Stage, Status};
use std::io::Write;
use tracing::info;

/// Reads one line per tick from every configured input, in order.
#[derive(Default)]
struct Lines {
  paths: Vec<String>,
  lines: Vec<String>,
  cursor: usize,
  ready: bool,
}

impl Stage for Lines {}

impl Algorithm for Lines {
  fn load(&mut self, input_paths: &[String]) -> KernelResult<()> {
    self.paths = input_paths.to_vec();
    for path in &self.paths {
      let text = std::fs::read_to_string(path).map_err(anyhow::Error::from)?;
      self.lines.extend(text.lines().map(str::to_string));
    }
    Ok(())
  }

  fn execute(&mut self) -> KernelResult<Status> {
    self.ready = self.cursor < self.lines.len();
    if !self.ready {
      return Ok(Status::Exhausted);
    }
    self.cursor += 1;
    Ok(Status::Continue)
  }

  fn is_data_source(&self) -> bool {
    true
  }
}

impl RecordSource for Lines {
  type Record = String;

  fn ready(&self) -> bool {
    self.ready
  }

  fn record(&self) -> &String {
    &self.lines[self.cursor - 1]
  }
}

/// Counts words and writes the total when the run finalizes.
#[derive(Default)]
struct WordCount {
  words: usize,
}

impl Consume<Lines> for WordCount {
  fn consume(&mut self, line: &String) -> KernelResult<Status> {
    self.words += line.split_whitespace().count();
    Ok(Status::Continue)
  }

  fn finalize(&mut self, kernel: &Kernel) -> KernelResult<()> {
    if let Some(output) = kernel.current_output() {
      output.write_record(&format!("words {}", self.words))?;
    }
    Ok(())
  }
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

  let dir = std::env::temp_dir().join("algokernel_record_consumer");
  std::fs::create_dir_all(&dir)?;
  let input = dir.join("input.txt");
  std::fs::File::create(&input)?.write_all(b"the quick brown fox\njumps over\nthe lazy dog\n")?;
  let summary_path = dir.join("summary.txt");

  let mut kernel = Kernel::new();
  kernel.open_default_output(&summary_path)?;
  kernel.add_alg(Lines::default());
  kernel.add_alg(Consumer::<Lines, _>::new(WordCount::default()).with_name("word_count"));
  kernel.add_alg(
    Consumer::<Lines, _>::from_fn(|line: &String| {
      info!(%line, "line seen");
      Ok(Status::Continue)
    })
    .with_name("echo"),
  );

  let summary = kernel.run([input.to_string_lossy().into_owned()])?;
  info!(ticks = summary.ticks, "Run finished.");
  info!(summary = %std::fs::read_to_string(&summary_path)?.trim_end(), "Summary written.");
  Ok(())
}

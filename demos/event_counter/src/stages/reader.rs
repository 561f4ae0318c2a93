// demos/event_counter/src/stages/reader.rs

use algokernel::{Algorithm, InputResource, Kernel, KernelResult, RecordSource, Stage, Status};
use anyhow::{anyhow, Context};
use std::sync::Arc;
use tracing::{event, Level};

/// One parsed line: `<channel> <energy>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
  pub input: usize,
  pub line: u64,
  pub channel: u32,
  pub energy: f64,
}

impl Event {
  fn parse(input: usize, line: u64, text: &str) -> anyhow::Result<Self> {
    let mut fields = text.split_whitespace();
    let (Some(channel), Some(energy), None) = (fields.next(), fields.next(), fields.next()) else {
      return Err(anyhow!("expected '<channel> <energy>', got '{}'", text));
    };
    Ok(Self {
      input,
      line,
      channel: channel.parse().with_context(|| format!("bad channel '{}'", channel))?,
      energy: energy.parse().with_context(|| format!("bad energy '{}'", energy))?,
    })
  }
}

/// Data source walking every configured input in order, one event per tick.
/// Blank lines and lines starting with `#` are skipped.
#[derive(Default)]
pub struct LineReader {
  inputs: Vec<Arc<InputResource>>,
  cursor: usize,
  line: u64,
  current: Event,
  ready: bool,
  events: u64,
}

impl LineReader {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn events_read(&self) -> u64 {
    self.events
  }

  /// Next non-comment line across all inputs, with its input index and line number.
  fn next_line(&mut self) -> KernelResult<Option<(usize, u64, String)>> {
    while let Some(input) = self.inputs.get(self.cursor) {
      match input.read_record()? {
        Some(text) => {
          self.line += 1;
          let trimmed = text.trim();
          if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
          }
          return Ok(Some((self.cursor, self.line, trimmed.to_string())));
        }
        None => {
          event!(Level::DEBUG, path = %input.path().display(), lines = self.line, "Input finished.");
          self.cursor += 1;
          self.line = 0;
        }
      }
    }
    Ok(None)
  }
}

impl Stage for LineReader {
  fn name(&self) -> &str {
    "line_reader"
  }

  fn connect(&mut self, kernel: &Kernel) -> KernelResult<()> {
    // The same path listed twice shares one handle, so it is only read once.
    let mut inputs: Vec<Arc<InputResource>> = Vec::with_capacity(kernel.input_count());
    for index in 0..kernel.input_count() {
      let input = kernel.input(index)?;
      if !inputs.iter().any(|seen| Arc::ptr_eq(seen, &input)) {
        inputs.push(input);
      }
    }
    event!(Level::INFO, inputs = inputs.len(), "Line reader connected.");
    self.inputs = inputs;
    Ok(())
  }
}

impl Algorithm for LineReader {
  fn execute(&mut self) -> KernelResult<Status> {
    match self.next_line()? {
      Some((input, line, text)) => {
        self.current = Event::parse(input, line, &text)
          .with_context(|| format!("{}:{}", self.inputs[input].path().display(), line))?;
        self.ready = true;
        self.events += 1;
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

impl RecordSource for LineReader {
  type Record = Event;

  fn ready(&self) -> bool {
    self.ready
  }

  fn record(&self) -> &Event {
    &self.current
  }
}

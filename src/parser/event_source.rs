//! Event sources feeding the aggregation engine.
//!
//! A source is drained sequentially; decoders are not assumed to be
//! re-entrant. Sources that already hold decoded events can be wrapped
//! with [`IterSource`].

use super::schema::StackSampleEvent;
use crate::utils::error::DecodeError;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::Peekable;
use std::path::Path;

/// Sequential producer of decoded profiling events
pub trait EventSource {
    /// Whether another event (or decode error) is pending
    fn has_next(&mut self) -> bool;

    /// Decode the next event
    ///
    /// # Errors
    /// * `DecodeError` - the underlying recording is corrupt or unreadable
    fn next_event(&mut self) -> Result<StackSampleEvent, DecodeError>;
}

/// Adapter over any iterator of decode results
pub struct IterSource<I: Iterator> {
    inner: Peekable<I>,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Result<StackSampleEvent, DecodeError>>,
{
    pub fn new(inner: I) -> Self {
        Self {
            inner: inner.peekable(),
        }
    }
}

impl<I> EventSource for IterSource<I>
where
    I: Iterator<Item = Result<StackSampleEvent, DecodeError>>,
{
    fn has_next(&mut self) -> bool {
        self.inner.peek().is_some()
    }

    fn next_event(&mut self) -> Result<StackSampleEvent, DecodeError> {
        self.inner.next().unwrap_or(Err(DecodeError::Exhausted))
    }
}

/// Wrap already-decoded events
///
/// **Public** - convenient for tests and in-memory recordings
pub fn from_events(
    events: Vec<StackSampleEvent>,
) -> IterSource<impl Iterator<Item = Result<StackSampleEvent, DecodeError>>> {
    IterSource::new(events.into_iter().map(Ok))
}

/// Reads one JSON-encoded event per line
///
/// Blank lines are skipped. A malformed line surfaces as
/// `DecodeError::Malformed` carrying its 1-based line number.
pub struct JsonLinesSource<R> {
    reader: R,
    line_number: usize,
    pending: Option<Result<StackSampleEvent, DecodeError>>,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            pending: None,
        }
    }

    /// Read forward to the next non-blank line and decode it
    fn fill(&mut self) {
        if self.pending.is_some() {
            return;
        }

        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return,
                Ok(_) => {
                    self.line_number += 1;
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let decoded = serde_json::from_str::<StackSampleEvent>(trimmed).map_err(
                        |source| DecodeError::Malformed {
                            line: self.line_number,
                            source,
                        },
                    );
                    self.pending = Some(decoded);
                    return;
                }
                Err(e) => {
                    self.pending = Some(Err(DecodeError::Io(e)));
                    return;
                }
            }
        }
    }
}

impl JsonLinesSource<BufReader<File>> {
    /// Open a JSON-lines recording on disk
    ///
    /// **Public** - used by the aggregate command
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        debug!("Opening event stream: {}", path.display());
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> EventSource for JsonLinesSource<R> {
    fn has_next(&mut self) -> bool {
        self.fill();
        self.pending.is_some()
    }

    fn next_event(&mut self) -> Result<StackSampleEvent, DecodeError> {
        self.fill();
        self.pending.take().unwrap_or(Err(DecodeError::Exhausted))
    }
}

use std::{
    collections::VecDeque,
    io::{self, BufRead as _, Write as _},
};

use crate::tracer::Tracer;

/// Destination for interpreter output: the `print` native, the prompt text
/// written by `read`, and the REPL's expression echo.
///
/// Implement this to capture or redirect output from embedded Lox code. The
/// default implementation `StdPrint` writes to stdout.
pub trait PrintWriter {
    /// Writes a chunk of output text without adding a newline.
    fn write_text(&mut self, text: &str);

    /// Writes `line` followed by a newline.
    fn write_line(&mut self, line: &str) {
        self.write_text(line);
        self.write_text("\n");
    }
}

/// Default `PrintWriter` that writes to stdout, flushing as it goes so
/// prompts without a trailing newline appear immediately.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn write_text(&mut self, text: &str) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

/// A `PrintWriter` that collects all output into a string.
///
/// Useful for testing or capturing print output programmatically.
#[derive(Debug, Default)]
pub struct CollectStringPrint(String);

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected output so far.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.0
    }

    /// Consumes the writer and returns the collected output.
    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl PrintWriter for CollectStringPrint {
    fn write_text(&mut self, text: &str) {
        self.0.push_str(text);
    }
}

/// `PrintWriter` that ignores all output.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn write_text(&mut self, _text: &str) {}
}

/// Source of lines for the `read` native.
///
/// Returns `None` at end of input, which `read` surfaces as nil.
pub trait LineReader {
    fn read_line(&mut self) -> Option<String>;
}

/// Reads lines from stdin, stripping the trailing newline.
#[derive(Debug, Default)]
pub struct StdinReader;

impl LineReader for StdinReader {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line).ok()?;
        if read == 0 {
            return None;
        }
        Some(line.trim_end_matches(['\r', '\n']).to_owned())
    }
}

/// Serves lines from a prepared queue; used to script `read` in tests.
#[derive(Debug, Default)]
pub struct QueuedInput(VecDeque<String>);

impl QueuedInput {
    #[must_use]
    pub fn new(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(lines.into_iter().map(Into::into).collect())
    }
}

impl LineReader for QueuedInput {
    fn read_line(&mut self) -> Option<String> {
        self.0.pop_front()
    }
}

/// `LineReader` with no input; `read` always sees end of input.
#[derive(Debug, Default)]
pub struct NoInput;

impl LineReader for NoInput {
    fn read_line(&mut self) -> Option<String> {
        None
    }
}

/// The I/O bundle threaded through execution.
pub(crate) struct Io<'a> {
    pub print: &'a mut dyn PrintWriter,
    pub input: &'a mut dyn LineReader,
    pub tracer: &'a mut dyn Tracer,
}

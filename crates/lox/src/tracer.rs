//! Execution tracing hooks.
//!
//! The interpreter calls into a [`Tracer`] at statement boundaries, calls,
//! returns, and runtime errors. The default [`NoopTracer`] compiles to
//! nothing; [`StderrTracer`] gives a quick execution log and
//! [`RecordingTracer`] captures events for assertions in tests.

/// One observed execution event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A statement is about to execute. `kind` is the statement's short name
    /// ("var", "if", ...).
    Statement { kind: &'static str },
    /// A callable is about to run. `depth` is the call depth including this
    /// call.
    Call {
        callee: String,
        arity: usize,
        depth: usize,
    },
    /// A call frame was popped; `depth` is the depth after the pop.
    Return { depth: usize },
    /// A runtime error is unwinding to the top level.
    RuntimeError { message: String },
}

/// Observer of interpreter execution. All hooks default to no-ops so
/// implementations opt into the events they care about.
pub trait Tracer {
    fn on_statement(&mut self, _kind: &'static str) {}
    fn on_call(&mut self, _callee: &str, _arity: usize, _depth: usize) {}
    fn on_return(&mut self, _depth: usize) {}
    fn on_runtime_error(&mut self, _message: &str) {}
}

/// Tracer that ignores every event.
#[derive(Debug, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// Tracer that prints one line per event to stderr.
#[derive(Debug, Default)]
pub struct StderrTracer;

impl Tracer for StderrTracer {
    fn on_statement(&mut self, kind: &'static str) {
        eprintln!("trace: stmt {kind}");
    }

    fn on_call(&mut self, callee: &str, arity: usize, depth: usize) {
        eprintln!("trace: call {callee}/{arity} depth={depth}");
    }

    fn on_return(&mut self, depth: usize) {
        eprintln!("trace: return depth={depth}");
    }

    fn on_runtime_error(&mut self, message: &str) {
        eprintln!("trace: error {message}");
    }
}

/// Tracer that records every event in order.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events in execution order.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }
}

impl Tracer for RecordingTracer {
    fn on_statement(&mut self, kind: &'static str) {
        self.events.push(TraceEvent::Statement { kind });
    }

    fn on_call(&mut self, callee: &str, arity: usize, depth: usize) {
        self.events.push(TraceEvent::Call {
            callee: callee.to_owned(),
            arity,
            depth,
        });
    }

    fn on_return(&mut self, depth: usize) {
        self.events.push(TraceEvent::Return { depth });
    }

    fn on_runtime_error(&mut self, message: &str) {
        self.events.push(TraceEvent::RuntimeError {
            message: message.to_owned(),
        });
    }
}

use crate::{
    diag::Diagnostics,
    error::LoxError,
    interp::{Interp, RunMode},
    io::{Io, LineReader, PrintWriter},
    resource::ResourceLimits,
    run::run_pipeline,
    tracer::{NoopTracer, Tracer},
};

/// A persistent interactive session.
///
/// State survives across [`execute`](Self::execute) calls: globals defined
/// on one line are visible on the next, and closures created earlier keep
/// working because the heap, the environment arena, and the resolution
/// table all live as long as the session. Diagnostic flags reset per line,
/// so an error on one line never poisons the next.
///
/// In session mode an expression statement that is not an assignment echoes
/// its value through the print writer.
pub struct ReplSession {
    interp: Interp,
    diag: Diagnostics,
    next_id: u32,
}

impl ReplSession {
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(ResourceLimits::default())
    }

    #[must_use]
    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self {
            interp: Interp::new(limits),
            diag: Diagnostics::new(),
            next_id: 0,
        }
    }

    /// Scans, parses, resolves, and evaluates one line (or snippet) of
    /// input.
    pub fn execute(
        &mut self,
        source: &str,
        print: &mut impl PrintWriter,
        input: &mut impl LineReader,
    ) -> Result<(), LoxError> {
        self.execute_traced(source, print, input, &mut NoopTracer)
    }

    /// [`execute`](Self::execute) with a tracer observing the evaluation.
    pub fn execute_traced(
        &mut self,
        source: &str,
        print: &mut impl PrintWriter,
        input: &mut impl LineReader,
        tracer: &mut impl Tracer,
    ) -> Result<(), LoxError> {
        self.diag.reset();
        let mut io = Io { print, input, tracer };
        run_pipeline(
            source,
            RunMode::Repl,
            &mut self.interp,
            &mut self.diag,
            &mut self.next_id,
            &mut io,
        )
    }
}

impl Default for ReplSession {
    fn default() -> Self {
        Self::new()
    }
}

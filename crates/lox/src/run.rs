//! The one-shot pipeline: scan, parse, resolve, evaluate.

use crate::{
    diag::Diagnostics,
    error::LoxError,
    interp::{Interp, RunMode},
    io::{Io, LineReader, PrintWriter},
    lexer::Lexer,
    parser::Parser,
    resolver::Resolver,
    resource::ResourceLimits,
    tracer::{NoopTracer, Tracer},
};

/// Runs `source` as a complete program with default limits and no tracing.
///
/// Static errors (from any of the front-end passes) skip evaluation and come
/// back as [`LoxError::Static`]; a runtime error stops evaluation and comes
/// back as [`LoxError::Runtime`].
pub fn run_source(
    source: &str,
    print: &mut impl PrintWriter,
    input: &mut impl LineReader,
) -> Result<(), LoxError> {
    run_source_with(source, ResourceLimits::default(), print, input, &mut NoopTracer)
}

/// [`run_source`] with explicit limits and a tracer.
pub fn run_source_with(
    source: &str,
    limits: ResourceLimits,
    print: &mut impl PrintWriter,
    input: &mut impl LineReader,
    tracer: &mut impl Tracer,
) -> Result<(), LoxError> {
    let mut interp = Interp::new(limits);
    let mut diag = Diagnostics::new();
    let mut next_id = 0;
    let mut io = Io { print, input, tracer };
    run_pipeline(source, RunMode::File, &mut interp, &mut diag, &mut next_id, &mut io)
}

/// The four passes with their gates: any static error after parsing (which
/// includes lexical errors) or after resolving aborts before evaluation.
pub(crate) fn run_pipeline(
    source: &str,
    mode: RunMode,
    interp: &mut Interp,
    diag: &mut Diagnostics,
    next_id: &mut u32,
    io: &mut Io<'_>,
) -> Result<(), LoxError> {
    let tokens = Lexer::new(source, diag).scan_tokens();
    let limits = interp.limits();
    let (statements, parsed_next_id) = Parser::new(tokens, diag, *next_id, limits.max_parse_depth).parse();
    if diag.had_error() {
        return Err(LoxError::Static(diag.take_messages()));
    }
    *next_id = parsed_next_id;

    Resolver::new(diag, &mut interp.resolutions).resolve(&statements);
    if diag.had_error() {
        return Err(LoxError::Static(diag.take_messages()));
    }

    match interp.interpret(&statements, mode, io) {
        Ok(()) => Ok(()),
        Err(error) => {
            diag.runtime_error(&error);
            Err(LoxError::Runtime(error.render()))
        }
    }
}

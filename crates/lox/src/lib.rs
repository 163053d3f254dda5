#![doc = include_str!("../../../README.md")]

mod ast;
mod diag;
mod environment;
mod error;
mod heap;
mod interp;
mod io;
mod lexer;
mod natives;
mod parser;
mod repl;
mod resolver;
mod resource;
mod run;
mod token;
mod tracer;
mod value;

pub use crate::{
    error::LoxError,
    io::{CollectStringPrint, LineReader, NoInput, NoPrint, PrintWriter, QueuedInput, StdPrint, StdinReader},
    repl::ReplSession,
    resource::{DEFAULT_MAX_PARSE_DEPTH, DEFAULT_MAX_RECURSION_DEPTH, ResourceLimits},
    run::{run_source, run_source_with},
    tracer::{NoopTracer, RecordingTracer, StderrTracer, TraceEvent, Tracer},
};

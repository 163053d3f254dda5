use crate::{
    error::RuntimeError,
    token::{Token, TokenType},
};

/// Accumulating diagnostic reporter shared by every pass.
///
/// Static errors (lexical, syntactic, semantic) are collected rather than
/// printed so the host decides where they go; multiple may be reported per
/// run. The two flags gate the pipeline: any static error skips resolution
/// and evaluation, a runtime error marks the run as failed.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    messages: Vec<String>,
    had_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports a static error with no token context (lexical errors).
    pub fn error(&mut self, line: u32, message: &str) {
        self.report(line, "", message);
    }

    /// Reports a static error at a token (parse and resolve errors).
    pub fn error_at(&mut self, token: &Token, message: &str) {
        if token.kind == TokenType::Eof {
            self.report(token.line, " at end", message);
        } else {
            let location = format!(" at '{}'", token.lexeme);
            self.report(token.line, &location, message);
        }
    }

    /// Records a runtime error and marks the run as failed.
    pub fn runtime_error(&mut self, error: &RuntimeError) {
        self.messages.push(error.render());
        self.had_runtime_error = true;
    }

    fn report(&mut self, line: u32, location: &str, message: &str) {
        self.messages.push(format!("[line {line}] Error{location}: {message}"));
        self.had_error = true;
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Clears flags and pending messages; called between REPL lines.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.had_error = false;
        self.had_runtime_error = false;
    }

    /// Drains the rendered messages collected so far.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

use std::{env, fs, process::ExitCode};

use lox::{ReplSession, StdPrint, StdinReader, run_source};
use rustyline::{DefaultEditor, error::ReadlineError};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => repl(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: lox [script]");
            ExitCode::from(64)
        }
    }
}

fn run_file(path: &str) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error reading {path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut print = StdPrint;
    let mut input = StdinReader;
    match run_source(&source, &mut print, &mut input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn repl() -> ExitCode {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut session = ReplSession::new();
    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(&line);
                let mut print = StdPrint;
                let mut input = StdinReader;
                // Diagnostic flags reset inside execute, so an error here
                // never poisons the next line.
                if let Err(err) = session.execute(&line, &mut print, &mut input) {
                    eprintln!("{err}");
                }
            }
            Err(ReadlineError::Interrupted) => println!("Keyboard interrupt."),
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }
    ExitCode::SUCCESS
}

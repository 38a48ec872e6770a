//! A tree‑walking interpreter for a small dynamically‑typed scripting
//! language.
//!
//! The pipeline is strictly linear: [`scanner`] → [`parser`] → [`resolver`]
//! → [`interpreter`], each stage consuming the previous stage's output in
//! full.  Every stage reports into a driver‑owned [`Diagnostics`] sink, and
//! the driver stops after the first stage that recorded an error.
//!
//! [`Lox`] bundles the four stages behind a single `run` call and keeps the
//! global environment alive between calls, which is what a REPL needs.

pub mod ast;
pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod value;

use std::io::{Stdout, Write};

use log::info;

pub use error::{Diagnostics, LoxError};
pub use interpreter::Interpreter;
pub use resolver::Resolver;

/// Outcome of one [`Lox::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Ok,
    /// Lexical, syntax or resolution error; nothing was executed.
    StaticError,
    RuntimeError,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Ok => 0,
            RunStatus::StaticError => 65,
            RunStatus::RuntimeError => 70,
        }
    }
}

/// One interpreter session: shared globals plus the diagnostics sink.
pub struct Lox<W: Write = Stdout> {
    interpreter: Interpreter<W>,
    diagnostics: Diagnostics,
}

impl Lox {
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
            diagnostics: Diagnostics::new(),
        }
    }
}

impl Default for Lox {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Lox<W> {
    pub fn with_output(out: W) -> Self {
        Self {
            interpreter: Interpreter::with_output(out),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Scan, parse, resolve and execute `source`.  Diagnostics from the
    /// previous run are discarded first.
    pub fn run(&mut self, source: &str) -> RunStatus {
        self.diagnostics.clear();

        let tokens = scanner::scan(source, &mut self.diagnostics);
        if self.diagnostics.had_error() {
            return RunStatus::StaticError;
        }

        let statements = parser::parse(&tokens, &mut self.diagnostics);
        if self.diagnostics.had_error() {
            return RunStatus::StaticError;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements, &mut self.diagnostics);
        if self.diagnostics.had_error() {
            return RunStatus::StaticError;
        }

        self.interpreter.interpret(&statements, &mut self.diagnostics);
        if self.diagnostics.had_runtime_error() {
            return RunStatus::RuntimeError;
        }

        info!("Run finished without errors");

        RunStatus::Ok
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn interpreter(&self) -> &Interpreter<W> {
        &self.interpreter
    }

    pub fn output(&self) -> &W {
        self.interpreter.output()
    }
}

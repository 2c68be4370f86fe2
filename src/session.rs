//! Drives one source unit through scan → parse → resolve → interpret.
//!
//! A [`Session`] keeps one interpreter alive across units, so an
//! interactive prompt can define something on one line and use it on the
//! next.

use std::io::Write;

use log::{debug, info};
use thiserror::Error;

use crate::ast::Stmt;
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::tokenize;

/// Why a unit did not run to completion.
#[derive(Debug, Error)]
pub enum Failure {
    /// Lex, parse or resolve errors. Nothing was executed.
    #[error("{} static error(s)", .0.len())]
    Static(Vec<LoxError>),

    /// Execution stopped at this error.
    #[error(transparent)]
    Runtime(LoxError),
}

impl Failure {
    /// Every diagnostic carried by this failure.
    pub fn errors(&self) -> Vec<&LoxError> {
        match self {
            Failure::Static(errors) => errors.iter().collect(),
            Failure::Runtime(error) => vec![error],
        }
    }
}

pub struct Session {
    interpreter: Interpreter,
    next_id: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session printing to stdout.
    pub fn new() -> Self {
        Self::from_interpreter(Interpreter::new())
    }

    /// A session printing to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self::from_interpreter(Interpreter::with_output(out))
    }

    pub fn from_interpreter(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            next_id: 0,
        }
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Scan, parse and resolve `source` without running it.
    pub fn check(&mut self, source: &str) -> Result<Vec<Stmt>, Failure> {
        let (tokens, mut errors) = tokenize(source);

        let mut parser = Parser::with_first_id(&tokens, self.next_id);
        let statements = parser.parse();
        self.next_id = parser.next_id();
        errors.extend(parser.take_errors());

        if !errors.is_empty() {
            info!("Skipping resolution: {} syntax error(s)", errors.len());
            return Err(Failure::Static(errors));
        }

        Resolver::new(&mut self.interpreter)
            .resolve(&statements)
            .map_err(Failure::Static)?;

        debug!("Unit checked: {} statement(s)", statements.len());

        Ok(statements)
    }

    /// Run `source` as one unit.
    pub fn run(&mut self, source: &str) -> Result<(), Failure> {
        let statements = self.check(source)?;

        self.interpreter
            .interpret(&statements)
            .map_err(Failure::Runtime)
    }
}

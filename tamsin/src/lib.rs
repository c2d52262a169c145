/*  Library for the Tamsin grammar language.
    Copyright (C) 2019 Charles Johnson

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program. If not, see <http://www.gnu.org/licenses/>.
*/

//! # Interpreter for the Tamsin grammar language
//! A Tamsin program is a set of recursive productions. Each production says at once how to
//! scan, how to parse and how to transform its input, so a single program can be a lexer, a
//! parser and a compiler. The interpreter evaluates `main:main` against a stream of bytes and
//! ends in either a success term or a failure term.
//!
//! Productions are made of alternatives (`|`), sequences (`&`), repetition (`{...}`),
//! negative lookahead (`!`), sending a result to a pattern (`→`), and assignment (`set`).
//! Every alternative backtracks: the bindings and the scan position are put back as they
//! were before it was tried.
//!
//! The input is split into tokens by whichever scanner is current. `using` changes the
//! scanner for a sub-rule, and the scanner can itself be a production, so a grammar can
//! supply the tokenizer for its own rules. `@` runs a rule on a term instead of the input.
//!
//! Productions with several clauses are dispatched by matching their arguments against the
//! formal parameters of each clause in turn, as in Prolog.
//!
//! # Examples
//!
//! ```
//! extern crate tamsin;
//! use std::rc::Rc;
//! use tamsin::{compile, run, Outcome, Term, TamsinError};
//!
//! let program = Rc::new(compile("main = \"a\" & \"b\".", "<example>").unwrap());
//!
//! // The result of a sequence is the result of its last rule
//! assert_eq!(run(program.clone(), "ab", "<stdin>"), Ok(Outcome::Success(Term::from("b"))));
//!
//! // A failure says what was expected and where
//! assert_eq!(
//!     run(program, "ac", "<stdin>"),
//!     Ok(Outcome::Failure(Term::from(
//!         "expected 'b' found 'c' at line 1, column 2 in '<stdin>'"
//!     )))
//! );
//!
//! // Clauses are tried in order until the arguments match
//! let program = Rc::new(
//!     compile(
//!         "main = p(y). p(x) = return 1. p(y) = return 2.",
//!         "<example>",
//!     )
//!     .unwrap(),
//! );
//! assert_eq!(run(program, "", "<stdin>"), Ok(Outcome::Success(Term::from("2"))));
//!
//! // Calling something that isn't defined can't be recovered from
//! assert_eq!(
//!     compile("main = nothing.", "<example>"),
//!     Err(TamsinError::UndefinedProduction {
//!         module: "main".into(),
//!         name: "nothing".into()
//!     })
//! );
//! ```

/// Checks programs and resolves the production references in them.
pub mod analyzer;

/// Abstract syntax tree of programs.
pub mod ast;

/// Immutable input with line and column tracking.
pub mod buffer;

/// The productions of the `$` module.
mod builtins;

/// The variables in scope during an interpretation.
pub mod context;

/// Rewrites constructs into simpler ones.
pub mod desugarer;

/// The errors that abort an interpretation.
mod errors;

/// Evaluates programs.
pub mod interpreter;

/// Structured tracing of interpretations.
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;

/// Hooks into an interpretation.
pub mod observer;

/// Parses the source text of programs.
pub mod parser;

/// Splits input into tokens.
pub mod scanner;

/// The values that programs produce and match.
pub mod term;

pub use ast::Program;
pub use buffer::Buffer;
pub use errors::{TamsinError, TamsinResult};
pub use interpreter::Interpreter;
pub use scanner::Scanner;
pub use term::Term;

use scanner::Utf8Engine;
use std::rc::Rc;

/// The result of a rule that didn't abort.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success(Term),
    /// Can be recovered from by an enclosing alternative.
    Failure(Term),
}

impl Outcome {
    pub fn term(&self) -> &Term {
        match self {
            Self::Success(term) | Self::Failure(term) => term,
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Self::Success(_) => true,
            Self::Failure(_) => false,
        }
    }
}

/// Parses, desugars and analyzes the source text of a program.
pub fn compile(source: impl AsRef<[u8]>, filename: &str) -> TamsinResult<Program> {
    let program = parser::Parser::new(source, filename).grammar()?;
    analyzer::analyze(desugarer::desugar(program))
}

/// Runs a compiled program over `input`, scanning it character by character.
pub fn run(program: Rc<Program>, input: impl AsRef<[u8]>, filename: &str) -> TamsinResult<Outcome> {
    let scanner = Scanner::new(Buffer::new(input, filename), Rc::new(Utf8Engine));
    Interpreter::new(program, scanner).interpret_program()
}

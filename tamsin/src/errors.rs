//  Library for the Tamsin grammar language.
// Copyright (C) 2019 Charles Johnson
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

use thiserror::Error;

pub type TamsinResult<T> = Result<T, TamsinError>;

/// Every way an interpretation can be aborted.
///
/// None of these are grammar failures. A grammar failure is an ordinary
/// [`Outcome::Failure`](crate::Outcome) and can be recovered from by an
/// enclosing alternative; these can't.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum TamsinError {
    /// When grammar source text can't be tokenized or parsed.
    #[error(
        "expected {expected} but found {found} at line {line}, column {column} in '{filename}'"
    )]
    Syntax {
        expected: String,
        found: String,
        line: usize,
        column: usize,
        filename: String,
    },
    #[error("no '{module}' module defined")]
    UndefinedModule {
        module: String,
    },
    #[error("no '{module}:{name}' production defined")]
    UndefinedProduction {
        module: String,
        name: String,
    },
    #[error("no 'main:main' production defined")]
    MissingMain,
    #[error("no '$:{name}' builtin defined")]
    UnknownBuiltin {
        name: String,
    },
    #[error("'$:{name}' takes {expected} argument(s) but was given {found}")]
    BuiltinArity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("no such scanner '$:{name}'")]
    UnknownScanner {
        name: String,
    },
    #[error("unknown pragma '{name}'")]
    UnknownPragma {
        name: String,
    },
    /// When none of the branches of a production accept the arguments of a call.
    #[error("no '{production}' production matched arguments ({arguments})")]
    NoMatchingBranch {
        production: String,
        arguments: String,
    },
    /// When the scanner is asked to scan before the previous token was committed or unscanned.
    #[error("scanner in divergent state: position {position}, reset position {reset_position}")]
    DivergentScanner {
        position: usize,
        reset_position: usize,
    },
    #[error("attempt made to chop {requested} byte(s) with only {remaining} remaining")]
    BufferOverrun {
        requested: usize,
        remaining: usize,
    },
    #[error("scanner has no engine to scan with")]
    EmptyEngineStack,
    /// When a production engine is used by a scanner that isn't driven by an interpreter.
    #[error("production scanner '{production}' used outside of an interpreter")]
    DetachedProductionEngine {
        production: String,
    },
    #[error("malformed list {term}")]
    MalformedList {
        term: String,
    },
    #[error("could not write output: {message}")]
    Output {
        message: String,
    },
    /// A fatal error together with the productions that were active when it happened.
    #[error("{cause} (call stack: {})", .call_stack.join(" > "))]
    Aborted {
        cause: Box<TamsinError>,
        call_stack: Vec<String>,
    },
}

impl TamsinError {
    /// The error that aborted the interpretation, without the call stack.
    pub fn cause(&self) -> &Self {
        match self {
            Self::Aborted {
                cause,
                ..
            } => cause.cause(),
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TamsinError;

    #[test]
    fn cause_of_aborted_error_is_unwrapped() {
        let error = TamsinError::Aborted {
            cause: Box::new(TamsinError::MissingMain),
            call_stack: vec!["main".into(), "p".into()],
        };
        assert_eq!(error.cause(), &TamsinError::MissingMain);
        assert_eq!(
            error.to_string(),
            "no 'main:main' production defined (call stack: main > p)"
        );
    }

    #[test]
    fn cause_of_other_error_is_itself() {
        let error = TamsinError::EmptyEngineStack;
        assert_eq!(error.cause(), &error);
    }
}

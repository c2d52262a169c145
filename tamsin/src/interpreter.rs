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

use crate::{
    ast::{Expr, ProdRef, Production, Program, TermExpr},
    buffer::Buffer,
    builtins,
    context::Context,
    desugarer::desugar_expr,
    errors::{TamsinError, TamsinResult},
    observer::{describe_args, Observer},
    scanner::{Engine, ProductionEngine, Reentry, Scanner, Scanning, State},
    term::Term,
    Outcome::{self, Failure, Success},
};
use log::debug;
use std::{fmt, io::Write, mem, rc::Rc};

/// Filename reported for input that comes from evaluating `rule @ text`.
const ON_BUFFER: &str = "<texpr>";

/// Everything that has to be put back when backtracking.
struct Checkpoint {
    context: Context,
    state: State,
}

/// Evaluates a program against the input of a scanner.
///
/// Grammar failures are ordinary [`Outcome::Failure`]s that an enclosing
/// alternative may recover from. Errors abort the whole interpretation.
pub struct Interpreter {
    program: Rc<Program>,
    scanner: Scanner,
    context: Context,
    observer: Option<Box<dyn Observer>>,
    output: Box<dyn Write>,
    gensym_counter: usize,
    call_stack: Vec<String>,
}

impl Interpreter {
    /// Output of `$:print` and `$:emit` goes to standard output.
    pub fn new(program: Rc<Program>, scanner: Scanner) -> Self {
        Self {
            program,
            scanner,
            context: Context::default(),
            observer: None,
            output: Box::new(std::io::stdout()),
            gensym_counter: 0,
            call_stack: Vec::new(),
        }
    }

    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Runs `main:main` with no arguments.
    pub fn interpret_program(&mut self) -> TamsinResult<Outcome> {
        let main = self.program.main()?;
        self.call_production(&main, Vec::new()).map_err(|cause| self.abort(cause))
    }

    /// Wraps an error with the productions that were active when it happened.
    fn abort(&mut self, cause: TamsinError) -> TamsinError {
        match cause {
            aborted @ TamsinError::Aborted {
                ..
            } => aborted,
            cause => TamsinError::Aborted {
                cause: Box::new(cause),
                call_stack: mem::take(&mut self.call_stack),
            },
        }
    }

    /// Evaluates the first branch of `production` whose formals match `args`
    /// in a scope of its own.
    pub fn call_production(
        &mut self,
        production: &Rc<Production>,
        args: Vec<Term>,
    ) -> TamsinResult<Outcome> {
        for branch in &production.branches {
            let formals: Vec<Term> = branch.formals.iter().map(TermExpr::to_pattern).collect();
            if let Some(bindings) = Term::match_all(&formals, &args) {
                self.call_stack.push(production.name.to_string());
                self.notify(|observer| observer.enter(&production.name, &args));
                self.context.push_scope_with_capacity(branch.locals.len());
                self.context.store_all(bindings);
                let outcome = self.interpret(&branch.body)?;
                self.context.pop_scope();
                self.call_stack.pop();
                self.notify(|observer| observer.leave(&production.name, &outcome));
                return Ok(outcome);
            }
        }
        Err(TamsinError::NoMatchingBranch {
            production: production.name.to_string(),
            arguments: describe_args(&args),
        })
    }

    pub fn interpret(&mut self, expr: &Expr) -> TamsinResult<Outcome> {
        match expr {
            Expr::And(lhs, rhs) => match self.interpret(lhs)? {
                Success(_) => self.interpret(rhs),
                failure => Ok(failure),
            },
            Expr::Or(lhs, rhs) => {
                let checkpoint = self.checkpoint()?;
                match self.interpret(lhs)? {
                    Failure(_) => {
                        self.restore(checkpoint);
                        self.interpret(rhs)
                    },
                    success => Ok(success),
                }
            },
            Expr::Not(rule) => {
                let checkpoint = self.checkpoint()?;
                let outcome = self.interpret(rule)?;
                self.restore(checkpoint);
                match outcome {
                    Success(_) => {
                        let upcoming = self.peek()?;
                        let message = self.scanner.error_message("anything else", &upcoming);
                        Ok(Failure(Term::atom(message)))
                    },
                    Failure(_) => Ok(Success(Term::nil())),
                }
            },
            Expr::While(rule) => {
                let mut result = Term::nil();
                loop {
                    let checkpoint = self.checkpoint()?;
                    match self.interpret(rule)? {
                        Success(term) => result = term,
                        Failure(_) => {
                            self.restore(checkpoint);
                            return Ok(Success(result));
                        },
                    }
                }
            },
            Expr::Call {
                prodref,
                args,
            } => {
                let args = args.iter().map(|arg| arg.evaluate(&self.context)).collect();
                self.call(prodref, args)
            },
            Expr::Send {
                rule,
                pattern,
            } => {
                let outcome = self.interpret(rule)?;
                match pattern.to_pattern().match_value(outcome.term()) {
                    Some(bindings) => {
                        self.context.store_all(bindings);
                        Ok(outcome)
                    },
                    None => Ok(Failure(Term::atom("nomatch"))),
                }
            },
            Expr::Set {
                variable,
                value,
            } => {
                let value = value.evaluate(&self.context);
                self.context.store(variable.clone(), value.clone());
                Ok(Success(value))
            },
            Expr::Using {
                rule,
                scanner,
            } => {
                let engine = self.engine(scanner)?;
                self.scanner.push_engine(engine);
                let outcome = self.interpret(rule);
                self.scanner.pop_engine();
                outcome
            },
            Expr::On {
                rule,
                text,
            } => {
                let text = text.evaluate(&self.context).flatten();
                debug!("on: {:?}", String::from_utf8_lossy(&text));
                let saved = self.scanner.get_state()?;
                self.scanner.install_buffer(Buffer::new(text, ON_BUFFER));
                let outcome = self.interpret(rule);
                self.scanner.install_state(saved);
                outcome
            },
            Expr::Fold {
                ..
            } => self.interpret(&desugar_expr(expr.clone())),
            Expr::Term(term) => Ok(Success(term.evaluate(&self.context))),
        }
    }

    fn call(&mut self, prodref: &ProdRef, args: Vec<Term>) -> TamsinResult<Outcome> {
        self.notify(|observer| observer.call(prodref, &args));
        if prodref.is_builtin() {
            builtins::call(self, &prodref.name, &args)
        } else {
            let production = self.program.find(prodref)?;
            self.call_production(&production, args)
        }
    }

    /// The engine for `using scanner`.
    fn engine(&self, scanner: &ProdRef) -> TamsinResult<Rc<dyn Engine>> {
        if scanner.is_builtin() {
            builtins::scanner(&scanner.name).ok_or_else(|| TamsinError::UnknownScanner {
                name: scanner.name.to_string(),
            })
        } else {
            let production = self.program.find(scanner)?;
            Ok(Rc::new(ProductionEngine::new(production)))
        }
    }

    fn checkpoint(&self) -> TamsinResult<Checkpoint> {
        Ok(Checkpoint {
            context: self.context.clone(),
            state: self.scanner.get_state()?,
        })
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.context = checkpoint.context;
        self.scanner.install_state(checkpoint.state);
    }

    fn notify(&mut self, event: impl FnOnce(&mut dyn Observer)) {
        if let Some(observer) = self.observer.as_mut() {
            event(observer.as_mut());
        }
    }

    pub(crate) fn write_output(&mut self, text: &[u8]) -> TamsinResult<()> {
        self.output
            .write_all(text)
            .and_then(|_| self.output.flush())
            .map_err(|error| TamsinError::Output {
                message: error.to_string(),
            })
    }

    pub(crate) fn next_gensym(&mut self) -> usize {
        self.gensym_counter += 1;
        self.gensym_counter
    }
}

impl Reentry for Interpreter {
    fn scanner(&mut self) -> &mut Scanner {
        &mut self.scanner
    }

    fn scan_production(&mut self, production: &Rc<Production>) -> TamsinResult<Outcome> {
        self.call_production(production, Vec::new())
    }

    fn scanned(&mut self, token: &Term) {
        self.notify(|observer| observer.scanned(token));
    }

    fn committed(&mut self, token: &Term) {
        self.notify(|observer| observer.committed(token));
    }
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("scanner", &self.scanner)
            .field("context", &self.context)
            .field("call_stack", &self.call_stack)
            .finish()
    }
}

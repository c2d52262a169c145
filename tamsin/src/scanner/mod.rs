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

/// Strategies for splitting the input into tokens.
pub mod engine;

/// The tokenizer for the Tamsin grammar language itself.
mod tamsin_engine;

pub use self::{
    engine::{ByteEngine, Engine, ProductionEngine, Utf8Engine},
    tamsin_engine::TamsinEngine,
};
use crate::{
    ast::Production,
    buffer::{Buffer, Location},
    errors::{TamsinError, TamsinResult},
    term::{Term, Text},
    Outcome,
};
use log::debug;
use std::{fmt, rc::Rc};

/// A saved scan position, to be handed back to [`Scanner::install_state`].
#[derive(Clone, Debug)]
pub struct State {
    buffer: Buffer,
}

/// A cursor over the input that is split into tokens by whichever engine is
/// on top of its engine stack.
///
/// Scanning a token moves the cursor but leaves the last commit point where it
/// was. The token is then either committed, which moves the commit point up to
/// the cursor, or unscanned, which moves the cursor back to the commit point.
/// Nothing else can be scanned in between.
pub struct Scanner {
    buffer: Buffer,
    reset: Buffer,
    engines: Vec<Rc<dyn Engine>>,
}

impl Scanner {
    pub fn new(buffer: Buffer, engine: Rc<dyn Engine>) -> Self {
        Self {
            reset: buffer.clone(),
            buffer,
            engines: vec![engine],
        }
    }

    pub fn is_at_eof(&self) -> bool {
        self.buffer.is_at_end()
    }

    /// Moves the cursor past the next `amount` bytes and returns them. Only
    /// engines should need this.
    pub fn chop(&mut self, amount: usize) -> TamsinResult<Text> {
        let (chopped, buffer) = self.buffer.chop(amount)?;
        self.buffer = buffer;
        Ok(chopped)
    }

    pub fn first(&self, amount: usize) -> Option<&[u8]> {
        self.buffer.first(amount)
    }

    pub fn startswith(&self, prefix: &[u8]) -> bool {
        self.first(prefix.len()) == Some(prefix)
    }

    /// Length of the UTF-8 sequence that the next byte starts, or 0 if it
    /// isn't the lead byte of a multibyte sequence.
    pub fn is_at_utf8(&self) -> usize {
        match self.first(1) {
            Some(&[byte]) if byte & 0b1110_0000 == 0b1100_0000 => 2,
            Some(&[byte]) if byte & 0b1111_0000 == 0b1110_0000 => 3,
            Some(&[byte]) if byte & 0b1111_1000 == 0b1111_0000 => 4,
            _ => 0,
        }
    }

    pub fn commit(&mut self) {
        self.reset = self.buffer.clone();
    }

    pub fn unscan(&mut self) {
        self.buffer = self.reset.clone();
    }

    pub fn is_committed(&self) -> bool {
        self.buffer.position() == self.reset.position()
    }

    fn ensure_committed(&self) -> TamsinResult<()> {
        if self.is_committed() {
            Ok(())
        } else {
            Err(TamsinError::DivergentScanner {
                position: self.buffer.position(),
                reset_position: self.reset.position(),
            })
        }
    }

    /// Saves the scan position. Only a committed scanner can be saved.
    pub fn get_state(&self) -> TamsinResult<State> {
        self.ensure_committed()?;
        Ok(State {
            buffer: self.buffer.clone(),
        })
    }

    /// Moves both the cursor and the commit point to a saved position. The
    /// engine stack is left alone.
    pub fn install_state(&mut self, state: State) {
        self.reset = state.buffer.clone();
        self.buffer = state.buffer;
    }

    /// Scans a different input from now on, until the previous state is installed again.
    pub fn install_buffer(&mut self, buffer: Buffer) {
        self.install_state(State {
            buffer,
        })
    }

    pub(crate) fn reset_point(&self) -> Buffer {
        self.reset.clone()
    }

    pub(crate) fn restore_reset_point(&mut self, reset: Buffer) {
        self.reset = reset;
    }

    pub fn push_engine(&mut self, engine: Rc<dyn Engine>) {
        debug!("push_engine: {:?} onto {} engine(s)", engine, self.engines.len());
        self.engines.push(engine);
    }

    pub fn pop_engine(&mut self) -> Option<Rc<dyn Engine>> {
        let engine = self.engines.pop();
        debug!("pop_engine: {:?}", engine);
        engine
    }

    /// The engine that the next token will be scanned with.
    pub fn engine(&self) -> TamsinResult<Rc<dyn Engine>> {
        self.engines
            .last()
            .cloned()
            .ok_or(TamsinError::EmptyEngineStack)
    }

    pub fn location(&self) -> Location {
        self.buffer.location()
    }

    /// A description of what was expected and what was found instead at the cursor.
    pub fn error_message(&self, expected: &str, found: &Term) -> String {
        format!(
            "expected {} but found {} at {}",
            expected,
            describe(found),
            self.location()
        )
    }

    /// Like [`error_message`](Self::error_message) but fatal, for when the
    /// grammar source itself can't be read.
    pub fn syntax_error(&self, expected: &str, found: &Term) -> TamsinError {
        let location = self.location();
        TamsinError::Syntax {
            expected: expected.into(),
            found: describe(found),
            line: location.line,
            column: location.column,
            filename: location.filename.to_string(),
        }
    }
}

fn describe(found: &Term) -> String {
    if found.is_eof() {
        "EOF".into()
    } else {
        format!("'{}'", found)
    }
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("buffer", &self.buffer)
            .field("reset", &self.reset.position())
            .field("engines", &self.engines)
            .finish()
    }
}

/// Whatever drives a scanner: gives engines access to the scanner and lets
/// a production engine run a production against it.
pub trait Reentry {
    fn scanner(&mut self) -> &mut Scanner;
    /// Runs `production` with no arguments against the scanner.
    fn scan_production(&mut self, production: &Rc<Production>) -> TamsinResult<Outcome>;
    fn scanned(&mut self, _token: &Term) {}
    fn committed(&mut self, _token: &Term) {}
}

/// A scanner on its own can use every engine except a production engine.
impl Reentry for Scanner {
    fn scanner(&mut self) -> &mut Scanner {
        self
    }

    fn scan_production(&mut self, production: &Rc<Production>) -> TamsinResult<Outcome> {
        Err(TamsinError::DetachedProductionEngine {
            production: production.name.to_string(),
        })
    }
}

/// Token level operations.
pub trait Scanning {
    /// Scans the next token without committing it.
    fn scan(&mut self) -> TamsinResult<Term>;
    /// The next token. Leaves the cursor where it was.
    fn peek(&mut self) -> TamsinResult<Term>;
    /// Commits the next token if its text is `literal`.
    fn consume(&mut self, literal: &[u8]) -> TamsinResult<Option<Term>>;
    fn consume_any(&mut self) -> TamsinResult<Term>;
}

impl<R: Reentry> Scanning for R {
    fn scan(&mut self) -> TamsinResult<Term> {
        self.scanner().ensure_committed()?;
        let engine = self.scanner().engine()?;
        let token = engine.scan_one(self)?;
        self.scanned(&token);
        Ok(token)
    }

    fn peek(&mut self) -> TamsinResult<Term> {
        let token = self.scan()?;
        self.scanner().unscan();
        Ok(token)
    }

    fn consume(&mut self, literal: &[u8]) -> TamsinResult<Option<Term>> {
        let token = self.scan()?;
        if token.text() == Some(literal) {
            self.scanner().commit();
            self.committed(&token);
            Ok(Some(token))
        } else {
            self.scanner().unscan();
            Ok(None)
        }
    }

    fn consume_any(&mut self) -> TamsinResult<Term> {
        let token = self.scan()?;
        self.scanner().commit();
        self.committed(&token);
        Ok(token)
    }
}

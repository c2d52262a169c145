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

use super::Reentry;
use crate::{ast::Production, errors::TamsinResult, term::Term, Outcome};
use std::{fmt, rc::Rc};

/// Splits one token off the front of the input.
pub trait Engine: fmt::Debug {
    /// Returns an atom, or `Term::Eof` at the end of the input. The scanner
    /// is left at the end of the token.
    fn scan_one(&self, host: &mut dyn Reentry) -> TamsinResult<Term>;
}

/// One byte per token.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteEngine;

impl Engine for ByteEngine {
    fn scan_one(&self, host: &mut dyn Reentry) -> TamsinResult<Term> {
        let scanner = host.scanner();
        if scanner.is_at_eof() {
            return Ok(Term::Eof);
        }
        scanner.chop(1).map(Term::Atom)
    }
}

/// One UTF-8 character per token. A byte that can't start a multibyte
/// character is a token on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Engine;

impl Engine for Utf8Engine {
    fn scan_one(&self, host: &mut dyn Reentry) -> TamsinResult<Term> {
        let scanner = host.scanner();
        if scanner.is_at_eof() {
            return Ok(Term::Eof);
        }
        let length = scanner.is_at_utf8().min(scanner.buffer.remaining()).max(1);
        scanner.chop(length).map(Term::Atom)
    }
}

/// Scans each token by running a production against the input.
pub struct ProductionEngine {
    production: Rc<Production>,
}

impl ProductionEngine {
    pub fn new(production: Rc<Production>) -> Self {
        Self {
            production,
        }
    }
}

impl fmt::Debug for ProductionEngine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ProductionEngine({})", self.production.name)
    }
}

impl Engine for ProductionEngine {
    /// The production runs with a UTF-8 engine on top of the same scanner, so
    /// the tokens it consumes are committed as it goes. Afterwards the commit
    /// point is put back to where this token started, leaving the token
    /// scanned but not yet committed like any other.
    fn scan_one(&self, host: &mut dyn Reentry) -> TamsinResult<Term> {
        if host.scanner().is_at_eof() {
            return Ok(Term::Eof);
        }
        let reset = host.scanner().reset_point();
        host.scanner().push_engine(Rc::new(Utf8Engine));
        let outcome = host.scan_production(&self.production);
        host.scanner().pop_engine();
        host.scanner().restore_reset_point(reset);
        Ok(match outcome? {
            Outcome::Success(Term::Eof) | Outcome::Failure(_) => Term::Eof,
            Outcome::Success(token) => Term::atom(token.flatten()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteEngine, ProductionEngine, Utf8Engine};
    use crate::{
        ast::{Branch, Expr, Production, TermExpr},
        buffer::Buffer,
        errors::TamsinError,
        scanner::{Scanner, Scanning},
        term::Term,
    };
    use std::rc::Rc;

    fn tokens(scanner: &mut Scanner) -> Vec<Term> {
        let mut tokens = Vec::new();
        loop {
            let token = scanner.consume_any().unwrap();
            if token.is_eof() {
                return tokens;
            }
            tokens.push(token);
        }
    }

    #[test]
    fn bytes() {
        let mut scanner = Scanner::new(Buffer::new("aé", "<test>"), Rc::new(ByteEngine));
        assert_eq!(
            tokens(&mut scanner),
            vec![Term::from("a"), Term::atom(b"\xc3"), Term::atom(b"\xa9")]
        );
    }

    #[test]
    fn utf8_characters() {
        let mut scanner = Scanner::new(Buffer::new("aé→", "<test>"), Rc::new(Utf8Engine));
        assert_eq!(tokens(&mut scanner), vec![Term::from("a"), "é".into(), "→".into()]);
    }

    #[test]
    fn invalid_utf8_is_one_byte_at_a_time() {
        let mut scanner = Scanner::new(Buffer::new(b"\xff\xe2", "<test>"), Rc::new(Utf8Engine));
        assert_eq!(tokens(&mut scanner), vec![Term::atom(b"\xff"), Term::atom(b"\xe2")]);
    }

    #[test]
    fn productions_need_an_interpreter() {
        let production = Rc::new(Production {
            name: "word".into(),
            branches: vec![Branch::new(vec![], Expr::Term(TermExpr::atom("x")))],
        });
        let mut scanner =
            Scanner::new(Buffer::new("abc", "<test>"), Rc::new(ProductionEngine::new(production)));
        assert_eq!(
            scanner.scan(),
            Err(TamsinError::DetachedProductionEngine {
                production: "word".into()
            })
        );
        assert!(scanner.is_committed());
    }
}

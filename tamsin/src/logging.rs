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
    ast::ProdRef,
    observer::{describe_args, Observer},
    term::Term,
    Outcome,
};
use slog::{info, o, Drain, Logger};

/// A structured trace of an interpretation, indented by call depth.
pub struct SlogObserver {
    logger: Logger,
    depth: usize,
}

impl SlogObserver {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            depth: 0,
        }
    }

    /// Traces to standard error.
    pub fn stderr() -> Self {
        let decorator = slog_term::PlainSyncDecorator::new(std::io::stderr());
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        Self::new(Logger::root(drain, o!("component" => "interpreter")))
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }
}

impl Observer for SlogObserver {
    fn enter(&mut self, production: &str, args: &[Term]) {
        info!(self.logger, "{}enter {}", self.indent(), production; "args" => describe_args(args));
        self.depth += 1;
    }

    fn leave(&mut self, production: &str, outcome: &Outcome) {
        self.depth = self.depth.saturating_sub(1);
        info!(
            self.logger,
            "{}leave {}", self.indent(), production;
            "success" => outcome.is_success(),
            "result" => outcome.term().repr()
        );
    }

    fn call(&mut self, prodref: &ProdRef, args: &[Term]) {
        info!(self.logger, "{}call {}", self.indent(), prodref; "args" => describe_args(args));
    }

    fn scanned(&mut self, token: &Term) {
        info!(self.logger, "{}scanned", self.indent(); "token" => token.repr());
    }

    fn committed(&mut self, token: &Term) {
        info!(self.logger, "{}committed", self.indent(); "token" => token.repr());
    }
}

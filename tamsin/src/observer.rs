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

use crate::{ast::ProdRef, term::Term, Outcome};
use log::debug;

/// Hooks into an interpretation as it happens. Every hook does nothing
/// unless overridden.
pub trait Observer {
    /// A branch of `production` matched `args` and is about to be evaluated.
    fn enter(&mut self, _production: &str, _args: &[Term]) {}
    fn leave(&mut self, _production: &str, _outcome: &Outcome) {}
    /// Called before the production is looked up, so builtins are included.
    fn call(&mut self, _prodref: &ProdRef, _args: &[Term]) {}
    /// A token was scanned. It may still be unscanned.
    fn scanned(&mut self, _token: &Term) {}
    fn committed(&mut self, _token: &Term) {}
}

/// Formats arguments the way they could be written in a grammar.
pub fn describe_args(args: &[Term]) -> String {
    args.iter().map(Term::repr).collect::<Vec<_>>().join(", ")
}

/// Records every event through the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn enter(&mut self, production: &str, args: &[Term]) {
        debug!("enter {}({})", production, describe_args(args));
    }

    fn leave(&mut self, production: &str, outcome: &Outcome) {
        debug!("leave {} with {:?}", production, outcome);
    }

    fn call(&mut self, prodref: &ProdRef, args: &[Term]) {
        debug!("call {}({})", prodref, describe_args(args));
    }

    fn scanned(&mut self, token: &Term) {
        debug!("scanned {}", token.repr());
    }

    fn committed(&mut self, token: &Term) {
        debug!("committed {}", token.repr());
    }
}

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

use crate::term::{Bindings, Term};
use std::{collections::HashMap, fmt, rc::Rc};

type Scope = HashMap<Rc<str>, Term>;

#[derive(Clone)]
struct Frame {
    scope: Rc<Scope>,
    parent: Option<Rc<Frame>>,
}

/// The variables of every active production, one scope per activation.
///
/// Only the innermost scope can be read or written. Cloning is O(1): frames
/// and scopes are shared between clones and a scope is only copied when it
/// is written to while a clone still refers to it.
#[derive(Clone)]
pub struct Context {
    innermost: Rc<Frame>,
    depth: usize,
}

impl Default for Context {
    /// Starts with a single, outermost scope.
    fn default() -> Self {
        Self {
            innermost: Rc::new(Frame {
                scope: Rc::default(),
                parent: None,
            }),
            depth: 1,
        }
    }
}

impl Context {
    pub fn push_scope(&mut self) {
        self.push_scope_with_capacity(0);
    }

    pub fn push_scope_with_capacity(&mut self, capacity: usize) {
        self.innermost = Rc::new(Frame {
            scope: Rc::new(Scope::with_capacity(capacity)),
            parent: Some(self.innermost.clone()),
        });
        self.depth += 1;
    }

    /// The outermost scope is never popped.
    pub fn pop_scope(&mut self) {
        if let Some(parent) = self.innermost.parent.clone() {
            self.innermost = parent;
            self.depth -= 1;
        }
    }

    /// Number of scopes, including the outermost one.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn fetch(&self, name: &str) -> Option<&Term> {
        self.innermost.scope.get(name)
    }

    pub fn store(&mut self, name: Rc<str>, value: Term) {
        let frame = Rc::make_mut(&mut self.innermost);
        Rc::make_mut(&mut frame.scope).insert(name, value);
    }

    pub fn store_all(&mut self, bindings: Bindings) {
        let frame = Rc::make_mut(&mut self.innermost);
        Rc::make_mut(&mut frame.scope).extend(bindings);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut scopes = Vec::with_capacity(self.depth);
        let mut frame = Some(&self.innermost);
        while let Some(current) = frame {
            scopes.push(&current.scope);
            frame = current.parent.as_ref();
        }
        scopes.reverse();
        f.debug_list().entries(scopes).finish()
    }
}

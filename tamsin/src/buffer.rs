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
    errors::{TamsinError, TamsinResult},
    term::Text,
};
use std::{fmt, rc::Rc};

/// Where in which input something happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub filename: Rc<str>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "line {}, column {} in '{}'",
            self.line, self.column, self.filename
        )
    }
}

/// An immutable cursor over some input.
///
/// Chopping returns a new buffer rather than advancing this one, so a saved
/// buffer is a complete record of a scan position. The input itself is shared
/// between all buffers made from it.
#[derive(Clone)]
pub struct Buffer {
    bytes: Rc<[u8]>,
    position: usize,
    line: usize,
    column: usize,
    filename: Rc<str>,
}

impl Buffer {
    pub fn new(bytes: impl AsRef<[u8]>, filename: impl Into<Rc<str>>) -> Self {
        Self {
            bytes: bytes.as_ref().into(),
            position: 0,
            line: 1,
            column: 1,
            filename: filename.into(),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    pub fn location(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
            filename: self.filename.clone(),
        }
    }

    /// Splits off the next `amount` bytes. Chopping past the end means a
    /// scanner engine didn't check for the end of the input first.
    pub fn chop(&self, amount: usize) -> TamsinResult<(Text, Self)> {
        let chopped = self.first(amount).ok_or(TamsinError::BufferOverrun {
            requested: amount,
            remaining: self.remaining(),
        })?;
        let (line, column) = self.advance(chopped);
        let advanced = Self {
            bytes: self.bytes.clone(),
            position: self.position + amount,
            line,
            column,
            filename: self.filename.clone(),
        };
        Ok((chopped.into(), advanced))
    }

    /// The next `amount` bytes, if there are that many.
    pub fn first(&self, amount: usize) -> Option<&[u8]> {
        self.bytes.get(self.position..self.position.checked_add(amount)?)
    }

    /// The line and column after consuming `consumed`. Columns count
    /// characters, so UTF-8 continuation bytes don't advance them.
    fn advance(&self, consumed: &[u8]) -> (usize, usize) {
        consumed
            .iter()
            .fold((self.line, self.column), |(line, column), &byte| {
                if byte == b'\n' {
                    (line + 1, 1)
                } else if byte & 0b1100_0000 == 0b1000_0000 {
                    (line, column)
                } else {
                    (line, column + 1)
                }
            })
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Buffer({:?} at {}, {})",
            String::from_utf8_lossy(&self.bytes[self.position..]),
            self.position,
            self.location()
        )
    }
}

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

use super::{Engine, Reentry, Scanner};
use crate::{errors::TamsinResult, term::Term};

const WHITESPACE: &[u8] = b" \t\r\n";
const OPERATORS: [&[u8]; 6] = [b"&&", b"||", b"->", b"<-", b"<<", b">>"];
const SYMBOLS: [&str; 4] = ["→", "←", "«", "»"];
const PUNCTUATION: &[u8] = b"=()[]{}!:/|&,.@+$";
const QUOTES: [(&str, &str); 3] = [("\"", "\""), ("'", "'"), ("“", "”")];
const UNIDENTIFIABLE: &str = "identifiable character";
const ILLEGAL_ESCAPE: &str = "legal escape sequence";

/// Tokens of the Tamsin grammar language: operators, punctuation, quoted
/// strings and barewords, with whitespace and `#` comments skipped.
///
/// Quoted strings keep their quotes so the parser can tell them apart from
/// barewords, but their escape sequences are already decoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct TamsinEngine;

impl Engine for TamsinEngine {
    /// Layout after the token is skipped too, so that a committed scanner is
    /// positioned at the start of the next token.
    fn scan_one(&self, host: &mut dyn Reentry) -> TamsinResult<Term> {
        let scanner = host.scanner();
        skip_layout(scanner)?;
        let token = token(scanner)?;
        skip_layout(scanner)?;
        Ok(token)
    }
}

fn token(scanner: &mut Scanner) -> TamsinResult<Term> {
    if scanner.is_at_eof() {
        return Ok(Term::Eof);
    }
    if OPERATORS.iter().any(|op| scanner.startswith(op)) {
        return scanner.chop(2).map(Term::Atom);
    }
    for &(open, close) in &QUOTES {
        if scanner.startswith(open.as_bytes()) {
            scanner.chop(open.len())?;
            return quoted(scanner, open.as_bytes(), close.as_bytes());
        }
    }
    let length = scanner.is_at_utf8();
    if length > 0 {
        return match SYMBOLS.iter().find(|s| scanner.startswith(s.as_bytes())) {
            Some(symbol) => scanner.chop(symbol.len()).map(Term::Atom),
            None => {
                let found = scanner.first(length).map_or(Term::Eof, Term::atom);
                Err(scanner.syntax_error(UNIDENTIFIABLE, &found))
            },
        };
    }
    match scanner.first(1) {
        Some(&[byte]) if PUNCTUATION.contains(&byte) => scanner.chop(1).map(Term::Atom),
        Some(&[byte]) if byte.is_ascii_alphanumeric() => bareword(scanner),
        Some(found) => {
            let found = Term::atom(found);
            Err(scanner.syntax_error(UNIDENTIFIABLE, &found))
        },
        None => Ok(Term::Eof),
    }
}

fn skip_layout(scanner: &mut Scanner) -> TamsinResult<()> {
    loop {
        match scanner.first(1) {
            Some(&[byte]) if WHITESPACE.contains(&byte) => {
                scanner.chop(1)?;
            },
            Some(&[b'#']) => {
                while !scanner.is_at_eof() && !scanner.startswith(b"\n") {
                    scanner.chop(1)?;
                }
            },
            _ => return Ok(()),
        }
    }
}

fn is_bareword_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn bareword(scanner: &mut Scanner) -> TamsinResult<Term> {
    let mut length = 0;
    while scanner
        .first(length + 1)
        .and_then(<[u8]>::last)
        .map_or(false, |&byte| is_bareword_byte(byte))
    {
        length += 1;
    }
    scanner.chop(length).map(Term::Atom)
}

/// The rest of a quoted string whose opening quote has been chopped. A string
/// cut short by the end of the input is closed anyway.
fn quoted(scanner: &mut Scanner, open: &[u8], close: &[u8]) -> TamsinResult<Term> {
    let mut token = open.to_vec();
    while !scanner.is_at_eof() && !scanner.startswith(close) {
        let byte = match scanner.first(1) {
            Some(&[b'\\']) => {
                scanner.chop(1)?;
                escape(scanner)?
            },
            Some(&[byte]) => {
                scanner.chop(1)?;
                byte
            },
            _ => break,
        };
        token.push(byte);
    }
    if !scanner.is_at_eof() {
        scanner.chop(close.len())?;
    }
    token.extend_from_slice(close);
    Ok(Term::atom(token))
}

/// Decodes the escape sequence whose backslash has been chopped.
fn escape(scanner: &mut Scanner) -> TamsinResult<u8> {
    let code = match scanner.first(1) {
        Some(&[code]) => code,
        _ => return Err(scanner.syntax_error(ILLEGAL_ESCAPE, &Term::atom("\\"))),
    };
    scanner.chop(1)?;
    match code {
        b'r' => Ok(b'\r'),
        b'n' => Ok(b'\n'),
        b't' => Ok(b'\t'),
        b'\'' | b'"' | b'\\' => Ok(code),
        b'x' => {
            let byte = scanner
                .first(2)
                .filter(|digits| digits.iter().all(u8::is_ascii_hexdigit))
                .and_then(|digits| std::str::from_utf8(digits).ok())
                .and_then(|digits| u8::from_str_radix(digits, 16).ok());
            match byte {
                Some(byte) => {
                    scanner.chop(2)?;
                    Ok(byte)
                },
                None => Err(scanner.syntax_error(ILLEGAL_ESCAPE, &Term::atom("\\x"))),
            }
        },
        _ => Err(scanner.syntax_error(ILLEGAL_ESCAPE, &Term::atom([b'\\', code]))),
    }
}

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
    interpreter::Interpreter,
    scanner::{ByteEngine, Engine, Reentry, Scanning, TamsinEngine, Utf8Engine},
    term::Term,
    Outcome::{self, Failure, Success},
};
use lazy_static::lazy_static;
use maplit::hashmap;
use std::{collections::HashMap, rc::Rc};

type Builtin = fn(&mut Interpreter, &[Term]) -> TamsinResult<Outcome>;

lazy_static! {
    /// The productions of the `$` module with the number of arguments each takes.
    static ref BUILTINS: HashMap<&'static str, (usize, Builtin)> = hashmap! {
        "expect" => (1, expect as Builtin),
        "return" => (1, succeed as Builtin),
        "fail" => (1, fail as Builtin),
        "eof" => (0, eof as Builtin),
        "any" => (0, any as Builtin),
        "alnum" => (0, alnum as Builtin),
        "upper" => (0, upper as Builtin),
        "startswith" => (1, startswith as Builtin),
        "equal" => (2, equal as Builtin),
        "unquote" => (3, unquote as Builtin),
        "mkterm" => (2, mkterm as Builtin),
        "reverse" => (2, reverse as Builtin),
        "print" => (1, print as Builtin),
        "emit" => (1, emit as Builtin),
        "repr" => (1, repr as Builtin),
        "gensym" => (1, gensym as Builtin),
        "hexbyte" => (2, hexbyte as Builtin),
        "format_octal" => (1, format_octal as Builtin),
        "length" => (1, length as Builtin),
    };
}

pub fn arity(name: &str) -> Option<usize> {
    BUILTINS.get(name).map(|&(arity, _)| arity)
}

/// Calls `$:name` with arguments that have already been evaluated.
pub fn call(interpreter: &mut Interpreter, name: &str, args: &[Term]) -> TamsinResult<Outcome> {
    let &(arity, builtin) = BUILTINS.get(name).ok_or_else(|| TamsinError::UnknownBuiltin {
        name: name.into(),
    })?;
    if args.len() != arity {
        return Err(TamsinError::BuiltinArity {
            name: name.into(),
            expected: arity,
            found: args.len(),
        });
    }
    builtin(interpreter, args)
}

/// The engine that `using $:name` switches to.
pub fn scanner(name: &str) -> Option<Rc<dyn Engine>> {
    match name {
        "byte" => Some(Rc::new(ByteEngine)),
        "utf8" => Some(Rc::new(Utf8Engine)),
        "tamsin" => Some(Rc::new(TamsinEngine)),
        _ => None,
    }
}

fn failure(message: String) -> TamsinResult<Outcome> {
    Ok(Failure(Term::atom(message)))
}

fn lossy(text: &[u8]) -> String {
    String::from_utf8_lossy(text).into_owned()
}

fn expect(interpreter: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    let upcoming = interpreter.peek()?;
    let token = args[0].flatten();
    if interpreter.consume(&token)?.is_some() {
        return Ok(Success(args[0].clone()));
    }
    let location = interpreter.scanner().location();
    failure(format!(
        "expected '{}' found '{}' at {}",
        lossy(&token),
        upcoming,
        location
    ))
}

fn succeed(_: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    Ok(Success(args[0].clone()))
}

fn fail(_: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    Ok(Failure(args[0].clone()))
}

fn eof(interpreter: &mut Interpreter, _: &[Term]) -> TamsinResult<Outcome> {
    let upcoming = interpreter.peek()?;
    if upcoming.is_eof() {
        Ok(Success(Term::atom("")))
    } else {
        failure(format!("expected EOF found '{}'", upcoming))
    }
}

fn any(interpreter: &mut Interpreter, _: &[Term]) -> TamsinResult<Outcome> {
    if interpreter.peek()?.is_eof() {
        failure("expected any token, found EOF".into())
    } else {
        interpreter.consume_any().map(Success)
    }
}

/// Consumes the next token if `accept` is true of its text.
fn consume_if(
    interpreter: &mut Interpreter,
    accept: impl Fn(&[u8]) -> bool,
    expected: &str,
) -> TamsinResult<Outcome> {
    let upcoming = interpreter.peek()?;
    match upcoming.text() {
        Some(text) if accept(text) => interpreter.consume_any().map(Success),
        _ => failure(format!("expected {}, found '{}'", expected, upcoming)),
    }
}

fn alnum(interpreter: &mut Interpreter, _: &[Term]) -> TamsinResult<Outcome> {
    consume_if(
        interpreter,
        |text| text.first().map_or(false, u8::is_ascii_alphanumeric),
        "alphanumeric",
    )
}

fn upper(interpreter: &mut Interpreter, _: &[Term]) -> TamsinResult<Outcome> {
    consume_if(
        interpreter,
        |text| text.first().map_or(false, u8::is_ascii_uppercase),
        "uppercase alphabetic",
    )
}

fn startswith(interpreter: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    let prefix = args[0].flatten();
    let expected = format!("'{}'", lossy(&prefix));
    consume_if(interpreter, |text| text.starts_with(&prefix), &expected)
}

fn equal(_: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    if args[0].match_value(&args[1]).is_some() {
        Ok(Success(args[0].clone()))
    } else {
        failure(format!("term '{}' does not equal '{}'", args[0], args[1]))
    }
}

fn unquote(_: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    let quoted = args[0].flatten();
    let left = args[1].flatten();
    let right = args[2].flatten();
    if quoted.starts_with(&left) && quoted.ends_with(&right) {
        // The quotes may overlap, leaving nothing between them.
        let end = quoted.len() - right.len();
        Ok(Success(Term::atom(&quoted[left.len().min(end)..end])))
    } else {
        failure(format!(
            "term '{}' is not quoted with '{}' and '{}'",
            args[0], args[1], args[2]
        ))
    }
}

/// Builds `tag(a, b, ...)` from `tag` and `list(a, list(b, ...))`.
fn mkterm(_: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    let mut contents = Vec::new();
    let mut list = &args[1];
    while let Term::Compound {
        tag,
        contents: items,
    } = list
    {
        match &items[..] {
            [head, tail] if &tag[..] == b"list" => {
                contents.push(head.clone());
                list = tail;
            },
            _ => break,
        }
    }
    if contents.is_empty() {
        Ok(Success(args[0].clone()))
    } else {
        Ok(Success(Term::compound(args[0].flatten(), contents)))
    }
}

fn reverse(_: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    args[0].reversed(&args[1]).map(Success)
}

fn print(interpreter: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    let mut text = args[0].flatten();
    text.push(b'\n');
    interpreter.write_output(&text)?;
    Ok(Success(args[0].clone()))
}

fn emit(interpreter: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    interpreter.write_output(&args[0].flatten())?;
    Ok(Success(args[0].clone()))
}

fn repr(_: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    Ok(Success(Term::atom(args[0].repr())))
}

fn gensym(interpreter: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    let mut symbol = args[0].flatten();
    symbol.extend(interpreter.next_gensym().to_string().bytes());
    Ok(Success(Term::atom(symbol)))
}

fn hexbyte(_: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    let mut digits = args[0].flatten();
    digits.extend(args[1].flatten());
    let byte = Some(&digits)
        .filter(|digits| digits.len() == 2 && digits.iter().all(u8::is_ascii_hexdigit))
        .and_then(|digits| std::str::from_utf8(digits).ok())
        .and_then(|digits| u8::from_str_radix(digits, 16).ok());
    match byte {
        Some(byte) => Ok(Success(Term::atom([byte]))),
        None => failure(format!("'{}' is not a hexadecimal byte", lossy(&digits))),
    }
}

fn format_octal(_: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    match args[0].flatten().first() {
        Some(byte) => Ok(Success(Term::atom(format!("{:o}", byte)))),
        None => failure("can't format an empty term in octal".into()),
    }
}

fn length(_: &mut Interpreter, args: &[Term]) -> TamsinResult<Outcome> {
    Ok(Success(Term::atom(args[0].flatten().len().to_string())))
}

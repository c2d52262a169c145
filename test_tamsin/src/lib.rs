/*  Testing library for the Tamsin grammar language.
    Copyright (C) 2019 Charles Johnson

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program. If not, see <http://www.gnu.org/licenses/>.
*/

#[macro_use]
extern crate lazy_static;
extern crate proptest;
extern crate tamsin;

use std::{
    cell::RefCell,
    collections::HashSet,
    io::{self, Write},
    rc::Rc,
};
use tamsin::{
    compile, scanner::Utf8Engine, Buffer, Interpreter, Outcome, Program, Scanner, TamsinResult,
};

// Compiles a grammar that the test expects to be valid.
#[macro_export]
macro_rules! program {
    ($source:expr) => {
        std::rc::Rc::new(tamsin::compile($source, "<grammar>").expect("grammar should compile"))
    };
}

// Runs a grammar over an input and checks that it succeeds with the flattened text given.
#[macro_export]
macro_rules! assert_success {
    ($source:expr, $input:expr, $expected:expr) => {
        assert_eq!(
            tamsin::run($crate::program!($source), $input, "<input>"),
            Ok(tamsin::Outcome::Success(tamsin::Term::from($expected)))
        );
    };
}

// Runs a grammar over an input and checks that it fails with the flattened text given.
#[macro_export]
macro_rules! assert_failure {
    ($source:expr, $input:expr, $expected:expr) => {
        assert_eq!(
            tamsin::run($crate::program!($source), $input, "<input>"),
            Ok(tamsin::Outcome::Failure(tamsin::Term::from($expected)))
        );
    };
}

// Checks that a generated string can be written as a bareword that isn't a keyword or alias.
#[macro_export]
macro_rules! assume_bareword {
    ($a:ident) => {
        prop_assume!($a.len() > 0);
        prop_assume!($a.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'));
        prop_assume!($a.bytes().next().map_or(false, |b| b.is_ascii_lowercase()));
        prop_assume!(!$crate::RESERVED_WORDS.contains($a.as_str()));
    };
}

#[macro_export]
macro_rules! assume_barewords {
	($($a:ident),*) => ($($crate::assume_bareword!($a);)*)
}

lazy_static! {
    // Barewords that the parser treats specially.
    pub static ref RESERVED_WORDS: HashSet<&'static str> = {
        let mut words = HashSet::new();
        words.insert("using");
        words.insert("set");
        words.insert("eof");
        words.insert("any");
        words.insert("print");
        words.insert("fail");
        words.insert("return");
        words
    };
}

/// Collects what a program prints so tests can look at it afterwards.
#[derive(Clone, Debug, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An interpreter for `program` over `input` whose output is captured.
pub fn interpreter(program: Rc<Program>, input: &str) -> (Interpreter, SharedOutput) {
    let output = SharedOutput::default();
    let scanner = Scanner::new(Buffer::new(input, "<input>"), Rc::new(Utf8Engine));
    let interpreter = Interpreter::new(program, scanner).with_output(output.clone());
    (interpreter, output)
}

/// Runs `source` over `input`, returning the outcome along with everything printed.
pub fn run_capturing(source: &str, input: &str) -> (TamsinResult<Outcome>, String) {
    match compile(source, "<grammar>") {
        Ok(program) => {
            let (mut interpreter, output) = interpreter(Rc::new(program), input);
            let outcome = interpreter.interpret_program();
            (outcome, output.text())
        },
        Err(error) => (Err(error), String::new()),
    }
}

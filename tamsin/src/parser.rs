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
    ast::{Branch, Expr, Module, ProdRef, Program, TermExpr, MAIN},
    buffer::Buffer,
    errors::{TamsinError, TamsinResult},
    scanner::{Scanner, Scanning, TamsinEngine},
    term::{Term, Text},
};
use log::debug;
use maplit::hashmap;
use std::{collections::HashMap, rc::Rc};

const QUOTES: [(&str, &str); 3] = [("\"", "\""), ("'", "'"), ("“", "”")];

/// An alias stands for a production and says how many bare arguments follow it.
type Aliases = HashMap<Rc<str>, (usize, ProdRef)>;

fn default_aliases() -> Aliases {
    hashmap! {
        "eof".into() => (0, ProdRef::builtin("eof")),
        "any".into() => (0, ProdRef::builtin("any")),
        "print".into() => (1, ProdRef::builtin("print")),
        "fail".into() => (1, ProdRef::builtin("fail")),
        "return".into() => (1, ProdRef::builtin("return")),
    }
}

/// Recursive descent parser from Tamsin source text to a [`Program`].
///
/// The program it returns still contains folds and unresolved module names,
/// see [`compile`](crate::compile) for the whole pipeline.
pub struct Parser {
    scanner: Scanner,
    aliases: Aliases,
}

impl Parser {
    pub fn new(source: impl AsRef<[u8]>, filename: impl Into<Rc<str>>) -> Self {
        Self {
            scanner: Scanner::new(Buffer::new(source, filename), Rc::new(TamsinEngine)),
            aliases: default_aliases(),
        }
    }

    pub fn grammar(&mut self) -> TamsinResult<Program> {
        while self.consume("@")? {
            self.pragma()?;
            self.expect(".")?;
        }
        let mut program = Program::default();
        while !self.peek()?.is_eof() {
            let name = self.bareword("production or module name")?;
            let module = if self.consume("{")? {
                let mut module = Module::new(name);
                while !self.peek()?.is_eof() && !self.peeking_at("}")? {
                    let name = self.bareword("production name")?;
                    self.production(&mut module, name)?;
                }
                self.expect("}")?;
                module
            } else {
                let mut module = Module::new(MAIN);
                self.production(&mut module, name)?;
                module
            };
            merge(&mut program, module);
        }
        Ok(program)
    }

    fn pragma(&mut self) -> TamsinResult<()> {
        if self.consume("alias")? {
            let name = self.bareword("alias name")?;
            let arity = self.arity()?;
            self.expect("=")?;
            let prodref = self.prodref()?;
            debug!("pragma: alias {}/{} = {}", name, arity, prodref);
            self.aliases.insert(name, (arity, prodref));
            Ok(())
        } else if self.consume("unalias")? {
            let name = self.bareword("alias name")?;
            self.aliases.remove(&name);
            Ok(())
        } else {
            let found = self.peek()?;
            Err(TamsinError::UnknownPragma {
                name: found.to_string(),
            })
        }
    }

    fn arity(&mut self) -> TamsinResult<usize> {
        let token = self.peek()?;
        match std::str::from_utf8(token.text().unwrap_or_default()).map(str::parse) {
            Ok(Ok(arity)) => {
                self.scanner.consume_any()?;
                Ok(arity)
            },
            _ => Err(self.scanner.syntax_error("arity", &token)),
        }
    }

    fn production(&mut self, module: &mut Module, name: Rc<str>) -> TamsinResult<()> {
        let mut formals = Vec::new();
        if self.consume("(")? {
            if !self.peeking_at(")")? {
                formals.push(self.term()?);
                while self.consume(",")? {
                    formals.push(self.term()?);
                }
            }
            self.expect(")")?;
        }
        self.expect("=")?;
        let body = self.expr0()?;
        self.expect(".")?;
        module.add_branch(name, Branch::new(formals, body));
        Ok(())
    }

    fn expr0(&mut self) -> TamsinResult<Expr> {
        let mut lhs = self.expr1()?;
        while self.consume("|")? || self.consume("||")? {
            let rhs = self.expr1()?;
            lhs = Expr::or(lhs, rhs);
        }
        Ok(lhs)
    }

    fn expr1(&mut self) -> TamsinResult<Expr> {
        let mut lhs = self.expr2()?;
        while self.consume("&")? || self.consume("&&")? {
            let rhs = self.expr2()?;
            lhs = Expr::and(lhs, rhs);
        }
        Ok(lhs)
    }

    fn expr2(&mut self) -> TamsinResult<Expr> {
        let lhs = self.expr3()?;
        if self.consume("using")? {
            let scanner = self.prodref()?;
            Ok(Expr::using(lhs, scanner))
        } else if self.consume("@")? {
            let text = self.texpr()?;
            Ok(Expr::on(lhs, text))
        } else {
            Ok(lhs)
        }
    }

    fn expr3(&mut self) -> TamsinResult<Expr> {
        let lhs = self.expr4()?;
        if self.consume("→")? || self.consume("->")? {
            let pattern = self.term()?;
            Ok(Expr::send(lhs, pattern))
        } else {
            Ok(lhs)
        }
    }

    fn expr4(&mut self) -> TamsinResult<Expr> {
        let lhs = self.expr5()?;
        if !self.consume("/")? {
            return Ok(lhs);
        }
        let initial = self.texpr()?;
        let constructor = if self.consume("/")? {
            let token = self.peek()?;
            match self.term()? {
                TermExpr::Atom(tag) => Some(tag),
                _ => return Err(self.scanner.syntax_error("constructor atom", &token)),
            }
        } else {
            None
        };
        Ok(Expr::Fold {
            rule: Box::new(lhs),
            initial,
            constructor,
        })
    }

    fn expr5(&mut self) -> TamsinResult<Expr> {
        if self.consume("(")? {
            let expr = self.expr0()?;
            self.expect(")")?;
            return Ok(expr);
        }
        if self.consume("[")? {
            let expr = self.expr0()?;
            self.expect("]")?;
            return Ok(Expr::or(expr, Expr::builtin("return", vec![TermExpr::atom("nil")])));
        }
        if self.consume("{")? {
            let expr = self.expr0()?;
            self.expect("}")?;
            return Ok(Expr::repeat(expr));
        }
        if self.consume("«")? || self.consume("<<")? {
            let text = self.texpr()?;
            if self.consume("»")? || self.consume(">>")? {
                return Ok(Expr::builtin("expect", vec![text]));
            }
            return Err(self.error("'>>'")?);
        }
        if self.consume("!")? {
            return Ok(Expr::not(self.expr5()?));
        }
        if self.consume("set")? {
            let variable = self.variable()?;
            self.expect("=")?;
            let value = self.texpr()?;
            return Ok(Expr::set(variable, value));
        }
        let token = self.peek()?;
        let text = token.text().unwrap_or_default();
        match text.first() {
            Some(b'"') | Some(0xe2) if unquoted(text).is_some() => {
                self.scanner.consume_any()?;
                let literal = unquoted(text).unwrap_or_default();
                Ok(Expr::builtin("expect", vec![TermExpr::atom(literal)]))
            },
            Some(byte) if byte.is_ascii_uppercase() => {
                let variable = self.variable()?;
                if self.consume("←")? || self.consume("<-")? {
                    let value = self.texpr()?;
                    Ok(Expr::set(variable, value))
                } else {
                    Ok(Expr::builtin("return", vec![TermExpr::Variable(variable)]))
                }
            },
            Some(b'\'') => {
                let term = self.texpr()?;
                Ok(Expr::builtin("return", vec![term]))
            },
            _ => self.call(),
        }
    }

    fn call(&mut self) -> TamsinResult<Expr> {
        let aliases_allowed = !self.peeking_at(":")?;
        let prodref = self.prodref()?;
        let alias = if aliases_allowed && prodref.module.is_empty() {
            self.aliases.get(&prodref.name).cloned()
        } else {
            None
        };
        match alias {
            Some((arity, target)) => {
                let args = if self.consume("(")? {
                    let args = self.arguments()?;
                    if args.len() != arity {
                        let found = self.peek()?;
                        return Err(self
                            .scanner
                            .syntax_error(&format!("{} argument(s) to '{}'", arity, prodref.name), &found));
                    }
                    args
                } else {
                    (0..arity).map(|_| self.texpr()).collect::<TamsinResult<_>>()?
                };
                Ok(Expr::call(target, args))
            },
            None => {
                let args = if self.consume("(")? {
                    self.arguments()?
                } else {
                    Vec::new()
                };
                Ok(Expr::call(prodref, args))
            },
        }
    }

    /// The rest of a parenthesized argument list whose `(` has been consumed.
    fn arguments(&mut self) -> TamsinResult<Vec<TermExpr>> {
        let mut args = Vec::new();
        if !self.peeking_at(")")? {
            args.push(self.texpr()?);
            while self.consume(",")? {
                args.push(self.texpr()?);
            }
        }
        self.expect(")")?;
        Ok(args)
    }

    fn prodref(&mut self) -> TamsinResult<ProdRef> {
        if self.consume("$")? {
            self.expect(":")?;
            return Ok(ProdRef::builtin(self.bareword("builtin name")?));
        }
        if self.consume(":")? {
            return Ok(ProdRef::local(self.bareword("production name")?));
        }
        let name = self.bareword("production name")?;
        if self.consume(":")? {
            let module = name;
            Ok(ProdRef::new(module, self.bareword("production name")?))
        } else {
            Ok(ProdRef::local(name))
        }
    }

    fn variable(&mut self) -> TamsinResult<Rc<str>> {
        let token = self.peek()?;
        match token.text() {
            Some(text) if text.first().map_or(false, u8::is_ascii_uppercase) => {
                self.scanner.consume_any()?;
                Ok(String::from_utf8_lossy(text).into())
            },
            _ => Err(self.scanner.syntax_error("variable", &token)),
        }
    }

    fn texpr(&mut self) -> TamsinResult<TermExpr> {
        let mut lhs = self.term()?;
        while self.consume("+")? {
            let rhs = self.term()?;
            lhs = TermExpr::concat(lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> TamsinResult<TermExpr> {
        let token = self.peek()?;
        let text = token.text().unwrap_or_default();
        let tag: Text = match text.first() {
            Some(byte) if byte.is_ascii_uppercase() => {
                return self.variable().map(TermExpr::Variable);
            },
            Some(byte) if byte.is_ascii_alphanumeric() => text.into(),
            Some(_) if unquoted(text).is_some() => unquoted(text).unwrap_or_default().into(),
            _ => return Err(self.scanner.syntax_error("term", &token)),
        };
        self.scanner.consume_any()?;
        if !self.consume("(")? {
            return Ok(TermExpr::Atom(tag));
        }
        let mut contents = Vec::new();
        if !self.peeking_at(")")? {
            contents.push(self.term()?);
            while self.consume(",")? {
                contents.push(self.term()?);
            }
        }
        self.expect(")")?;
        Ok(TermExpr::Constructor(tag, contents))
    }

    fn bareword(&mut self, expected: &str) -> TamsinResult<Rc<str>> {
        let token = self.peek()?;
        match token.text() {
            Some(text) if text.first().map_or(false, u8::is_ascii_alphanumeric) => {
                self.scanner.consume_any()?;
                Ok(String::from_utf8_lossy(text).into())
            },
            _ => Err(self.scanner.syntax_error(expected, &token)),
        }
    }

    fn peek(&mut self) -> TamsinResult<Term> {
        self.scanner.peek()
    }

    fn peeking_at(&mut self, literal: &str) -> TamsinResult<bool> {
        Ok(self.peek()?.text() == Some(literal.as_bytes()))
    }

    fn consume(&mut self, literal: &str) -> TamsinResult<bool> {
        Ok(self.scanner.consume(literal.as_bytes())?.is_some())
    }

    fn expect(&mut self, literal: &str) -> TamsinResult<()> {
        if self.consume(literal)? {
            Ok(())
        } else {
            Err(self.error(&format!("'{}'", literal))?)
        }
    }

    /// A syntax error describing the next token.
    fn error(&mut self, expected: &str) -> TamsinResult<TamsinError> {
        let found = self.peek()?;
        Ok(self.scanner.syntax_error(expected, &found))
    }
}

/// The text between the quotes of a quoted string token.
fn unquoted(token: &[u8]) -> Option<&[u8]> {
    QUOTES.iter().find_map(|(open, close)| {
        token
            .strip_prefix(open.as_bytes())?
            .strip_suffix(close.as_bytes())
    })
}

/// Adds the productions of `module` to the module of the same name, if
/// there already is one.
fn merge(program: &mut Program, module: Module) {
    match program.modules.iter_mut().find(|m| m.name == module.name) {
        Some(existing) => {
            for production in module.productions {
                let production = Rc::try_unwrap(production).unwrap_or_else(|p| (*p).clone());
                for branch in production.branches {
                    existing.add_branch(production.name.clone(), branch);
                }
            }
        },
        None => program.modules.push(module),
    }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::{
        ast::{Expr, ProdRef, Program, TermExpr},
        errors::TamsinError,
    };
    use assert_matches::assert_matches;

    fn parse(source: &str) -> Result<Program, TamsinError> {
        Parser::new(source, "<test>").grammar()
    }

    fn body(program: &Program, module: &str, production: &str) -> Expr {
        program.find(&ProdRef::new(module, production)).unwrap().branches[0]
            .body
            .clone()
    }

    fn expect(text: &str) -> Expr {
        Expr::builtin("expect", vec![TermExpr::atom(text)])
    }

    #[test]
    fn string_literals_expect_their_text() {
        let program = parse("main = \"a\" & 'b' | “c”.").unwrap();
        assert_eq!(
            body(&program, "main", "main"),
            Expr::or(
                Expr::and(expect("a"), Expr::builtin("return", vec![TermExpr::atom("b")])),
                expect("c")
            )
        );
    }

    #[test]
    fn optional_and_repeated_rules() {
        let program = parse("main = [x] & {y}.").unwrap();
        assert_eq!(
            body(&program, "main", "main"),
            Expr::and(
                Expr::or(
                    Expr::call(ProdRef::local("x"), vec![]),
                    Expr::builtin("return", vec![TermExpr::atom("nil")])
                ),
                Expr::repeat(Expr::call(ProdRef::local("y"), vec![]))
            )
        );
    }

    #[test]
    fn sending_and_setting() {
        let program = parse("main = word → W & set X = W + '!' & Y <- pair(X, W) & Y.").unwrap();
        assert_eq!(
            body(&program, "main", "main"),
            Expr::and(
                Expr::and(
                    Expr::and(
                        Expr::send(Expr::call(ProdRef::local("word"), vec![]), TermExpr::variable("W")),
                        Expr::set(
                            "X",
                            TermExpr::concat(TermExpr::variable("W"), TermExpr::atom("!"))
                        )
                    ),
                    Expr::set(
                        "Y",
                        TermExpr::Constructor(
                            "pair".as_bytes().into(),
                            vec![TermExpr::variable("X"), TermExpr::variable("W")]
                        )
                    )
                ),
                Expr::builtin("return", vec![TermExpr::variable("Y")])
            )
        );
    }

    #[test]
    fn aliases_take_bare_or_parenthesized_arguments() {
        let program = parse("main = return X & return(1) & eof & :print.").unwrap();
        assert_eq!(
            body(&program, "main", "main"),
            Expr::and(
                Expr::and(
                    Expr::and(
                        Expr::builtin("return", vec![TermExpr::variable("X")]),
                        Expr::builtin("return", vec![TermExpr::atom("1")])
                    ),
                    Expr::builtin("eof", vec![])
                ),
                Expr::call(ProdRef::local("print"), vec![])
            )
        );
    }

    #[test]
    fn alias_pragmas() {
        let program = parse("@alias zrrk 2 = jersey:fuzz. @unalias print. main = zrrk a b & print.").unwrap();
        assert_eq!(
            body(&program, "main", "main"),
            Expr::and(
                Expr::call(ProdRef::new("jersey", "fuzz"), vec![TermExpr::atom("a"), TermExpr::atom("b")]),
                Expr::call(ProdRef::local("print"), vec![])
            )
        );
        assert_eq!(
            parse("@frobnicate. main = x.").unwrap_err(),
            TamsinError::UnknownPragma {
                name: "frobnicate".into()
            }
        );
    }

    #[test]
    fn modules_and_clauses() {
        let program = parse("p(x) = 'one'. list { nil = 'n'. } p(y) = 'two'. main = list:nil.").unwrap();
        assert_eq!(program.modules.len(), 2);
        let p = program.find(&ProdRef::new("main", "p")).unwrap();
        assert_eq!(p.branches.len(), 2);
        assert_eq!(p.branches[1].formals, vec![TermExpr::atom("y")]);
        assert!(program.find(&ProdRef::new("list", "nil")).is_ok());
        assert_eq!(body(&program, "main", "main"), Expr::call(ProdRef::new("list", "nil"), vec![]));
    }

    #[test]
    fn double_quoted_formals_are_atoms() {
        let program = parse("p(\"x\", Y) = return 1.").unwrap();
        let p = program.find(&ProdRef::new("main", "p")).unwrap();
        assert_eq!(p.branches[0].formals, vec![TermExpr::atom("x"), TermExpr::variable("Y")]);
    }

    #[test]
    fn folds_using_and_on() {
        let program = parse("main = ((item / '' / cons) using $:byte) @ 'abc'.").unwrap();
        assert_eq!(
            body(&program, "main", "main"),
            Expr::on(
                Expr::using(
                    Expr::Fold {
                        rule: Box::new(Expr::call(ProdRef::local("item"), vec![])),
                        initial: TermExpr::atom(""),
                        constructor: Some("cons".as_bytes().into()),
                    },
                    ProdRef::builtin("byte")
                ),
                TermExpr::atom("abc")
            )
        );
    }

    #[test]
    fn syntax_errors_are_located() {
        assert_matches!(
            parse("main = \"a\"\n  & .").unwrap_err(),
            TamsinError::Syntax {
                ref expected,
                ref found,
                line: 2,
                column: 5,
                ..
            } if expected == "production name" && found == "'.'"
        );
        assert_matches!(
            parse("main = x"),
            Err(TamsinError::Syntax {
                ref found,
                ..
            }) if found == "EOF"
        );
        assert_matches!(
            parse("main = !."),
            Err(TamsinError::Syntax {
                ..
            })
        );
    }

    #[test]
    fn parsed_programs_display_as_source() {
        let program = parse("main = x → Y & {\"a\"} | !eof.").unwrap();
        assert_eq!(
            program.to_string(),
            "main {\n  main = (((:x → Y) & {$:expect(a)}) | !$:eof).\n}"
        );
    }
}

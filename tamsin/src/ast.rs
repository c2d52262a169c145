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
    context::Context,
    errors::{TamsinError, TamsinResult},
    term::{repr_escape, Term, Text},
};
use std::{fmt, rc::Rc};

/// Module name that refers to the builtin productions.
pub const BUILTIN_MODULE: &str = "$";

/// Module that definitions outside of any module belong to, and the
/// production that a program starts from.
pub const MAIN: &str = "main";

/// A reference to a production by module and name. An empty module means the
/// module the reference appears in, until the analyzer resolves it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProdRef {
    pub module: Rc<str>,
    pub name: Rc<str>,
}

impl ProdRef {
    pub fn new(module: impl Into<Rc<str>>, name: impl Into<Rc<str>>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    pub fn builtin(name: impl Into<Rc<str>>) -> Self {
        Self::new(BUILTIN_MODULE, name)
    }

    pub fn local(name: impl Into<Rc<str>>) -> Self {
        Self::new("", name)
    }

    pub fn is_builtin(&self) -> bool {
        &*self.module == BUILTIN_MODULE
    }
}

impl fmt::Display for ProdRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.name)
    }
}

/// Syntax for building a term.
#[derive(Clone, Debug, PartialEq)]
pub enum TermExpr {
    Atom(Text),
    Variable(Rc<str>),
    Constructor(Text, Vec<TermExpr>),
    /// Joins the flattened text of both sides into one atom.
    Concat(Box<TermExpr>, Box<TermExpr>),
}

impl TermExpr {
    pub fn atom(text: impl AsRef<[u8]>) -> Self {
        Self::Atom(text.as_ref().into())
    }

    pub fn variable(name: impl Into<Rc<str>>) -> Self {
        Self::Variable(name.into())
    }

    pub fn concat(lhs: Self, rhs: Self) -> Self {
        Self::Concat(Box::new(lhs), Box::new(rhs))
    }

    /// The term as written, with its variables left unresolved.
    pub fn to_pattern(&self) -> Term {
        match self {
            Self::Atom(text) => Term::Atom(text.clone()),
            Self::Variable(name) => Term::Variable(name.clone()),
            Self::Constructor(tag, contents) => Term::Compound {
                tag: tag.clone(),
                contents: contents.iter().map(Self::to_pattern).collect(),
            },
            Self::Concat(lhs, rhs) => {
                let mut text = lhs.to_pattern().flatten();
                text.extend(rhs.to_pattern().flatten());
                Term::atom(text)
            },
        }
    }

    /// The term with its variables replaced by their values in `context`.
    pub fn evaluate(&self, context: &Context) -> Term {
        match self {
            Self::Concat(lhs, rhs) => {
                let mut text = lhs.evaluate(context).flatten();
                text.extend(rhs.evaluate(context).flatten());
                Term::atom(text)
            },
            Self::Constructor(tag, contents) => Term::Compound {
                tag: tag.clone(),
                contents: contents.iter().map(|c| c.evaluate(context)).collect(),
            },
            _ => self.to_pattern().expand(context),
        }
    }

    pub fn collect_variables(&self, variables: &mut Vec<Rc<str>>) {
        match self {
            Self::Atom(_) => (),
            Self::Variable(name) => {
                if !variables.contains(name) {
                    variables.push(name.clone());
                }
            },
            Self::Constructor(_, contents) => {
                contents.iter().for_each(|c| c.collect_variables(variables))
            },
            Self::Concat(lhs, rhs) => {
                lhs.collect_variables(variables);
                rhs.collect_variables(variables);
            },
        }
    }
}

impl fmt::Display for TermExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Atom(text) => f.write_str(&repr_escape(text)),
            Self::Variable(name) => f.write_str(name),
            Self::Constructor(tag, contents) => {
                f.write_str(&repr_escape(tag))?;
                write_arguments(f, contents)
            },
            Self::Concat(lhs, rhs) => write!(f, "{} + {}", lhs, rhs),
        }
    }
}

fn write_arguments(f: &mut fmt::Formatter, arguments: &[TermExpr]) -> fmt::Result {
    f.write_str("(")?;
    for (i, argument) in arguments.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", argument)?;
    }
    f.write_str(")")
}

/// The body of a production.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    While(Box<Expr>),
    Call {
        prodref: ProdRef,
        args: Vec<TermExpr>,
    },
    /// Matches the result of `rule` against `pattern`, binding its variables.
    Send {
        rule: Box<Expr>,
        pattern: TermExpr,
    },
    Set {
        variable: Rc<str>,
        value: TermExpr,
    },
    /// Scans with `scanner` while evaluating `rule`.
    Using {
        rule: Box<Expr>,
        scanner: ProdRef,
    },
    /// Evaluates `rule` against the text of a term instead of the input.
    On {
        rule: Box<Expr>,
        text: TermExpr,
    },
    /// Only exists until the desugarer rewrites it.
    Fold {
        rule: Box<Expr>,
        initial: TermExpr,
        constructor: Option<Text>,
    },
    Term(TermExpr),
}

impl Expr {
    pub fn and(lhs: Self, rhs: Self) -> Self {
        Self::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Self::Or(Box::new(lhs), Box::new(rhs))
    }

    pub fn not(rule: Self) -> Self {
        Self::Not(Box::new(rule))
    }

    pub fn repeat(rule: Self) -> Self {
        Self::While(Box::new(rule))
    }

    pub fn call(prodref: ProdRef, args: Vec<TermExpr>) -> Self {
        Self::Call {
            prodref,
            args,
        }
    }

    pub fn builtin(name: &str, args: Vec<TermExpr>) -> Self {
        Self::call(ProdRef::builtin(name), args)
    }

    pub fn send(rule: Self, pattern: TermExpr) -> Self {
        Self::Send {
            rule: Box::new(rule),
            pattern,
        }
    }

    pub fn set(variable: impl Into<Rc<str>>, value: TermExpr) -> Self {
        Self::Set {
            variable: variable.into(),
            value,
        }
    }

    pub fn using(rule: Self, scanner: ProdRef) -> Self {
        Self::Using {
            rule: Box::new(rule),
            scanner,
        }
    }

    pub fn on(rule: Self, text: TermExpr) -> Self {
        Self::On {
            rule: Box::new(rule),
            text,
        }
    }
}

/// Tamsin syntax with every compound expression parenthesized.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::And(lhs, rhs) => write!(f, "({} & {})", lhs, rhs),
            Self::Or(lhs, rhs) => write!(f, "({} | {})", lhs, rhs),
            Self::Not(rule) => write!(f, "!{}", rule),
            Self::While(rule) => write!(f, "{{{}}}", rule),
            Self::Call {
                prodref,
                args,
            } => {
                write!(f, "{}", prodref)?;
                if args.is_empty() {
                    Ok(())
                } else {
                    write_arguments(f, args)
                }
            },
            Self::Send {
                rule,
                pattern,
            } => write!(f, "({} → {})", rule, pattern),
            Self::Set {
                variable,
                value,
            } => write!(f, "set {} = {}", variable, value),
            Self::Using {
                rule,
                scanner,
            } => write!(f, "({} using {})", rule, scanner),
            Self::On {
                rule,
                text,
            } => write!(f, "({} @ {})", rule, text),
            Self::Fold {
                rule,
                initial,
                constructor,
            } => {
                write!(f, "({} / {}", rule, initial)?;
                if let Some(constructor) = constructor {
                    write!(f, " / {}", repr_escape(constructor))?;
                }
                f.write_str(")")
            },
            Self::Term(term) => write!(f, "{}", term),
        }
    }
}

/// One clause of a production.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub formals: Vec<TermExpr>,
    /// Every variable the body may bind, filled in by the analyzer.
    pub locals: Vec<Rc<str>>,
    pub body: Expr,
}

impl Branch {
    pub fn new(formals: Vec<TermExpr>, body: Expr) -> Self {
        Self {
            formals,
            locals: Vec::new(),
            body,
        }
    }
}

/// All the clauses sharing a name within a module, in the order they were defined.
#[derive(Clone, Debug, PartialEq)]
pub struct Production {
    pub name: Rc<str>,
    pub branches: Vec<Branch>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    pub name: Rc<str>,
    pub productions: Vec<Rc<Production>>,
}

impl Module {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self {
            name: name.into(),
            productions: Vec::new(),
        }
    }

    /// Appends a clause to the production called `name`, defining it if this
    /// is its first clause.
    pub fn add_branch(&mut self, name: Rc<str>, branch: Branch) {
        match self.productions.iter_mut().find(|p| p.name == name) {
            Some(production) => Rc::make_mut(production).branches.push(branch),
            None => self.productions.push(Rc::new(Production {
                name,
                branches: vec![branch],
            })),
        }
    }

    pub fn find(&self, name: &str) -> Option<&Rc<Production>> {
        self.productions.iter().find(|p| &*p.name == name)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub modules: Vec<Module>,
}

impl Program {
    pub fn find_module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| &*m.name == name)
    }

    /// Looks up a production that isn't a builtin.
    pub fn find(&self, prodref: &ProdRef) -> TamsinResult<Rc<Production>> {
        self.find_module(&prodref.module)
            .ok_or_else(|| TamsinError::UndefinedModule {
                module: prodref.module.to_string(),
            })?
            .find(&prodref.name)
            .cloned()
            .ok_or_else(|| TamsinError::UndefinedProduction {
                module: prodref.module.to_string(),
                name: prodref.name.to_string(),
            })
    }

    pub fn main(&self) -> TamsinResult<Rc<Production>> {
        self.find(&ProdRef::new(MAIN, MAIN))
            .map_err(|_| TamsinError::MissingMain)
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, branch) in self.branches.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(&self.name)?;
            if !branch.formals.is_empty() {
                write_arguments(f, &branch.formals)?;
            }
            write!(f, " = {}.", branch.body)?;
        }
        Ok(())
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} {{", self.name)?;
        for production in &self.productions {
            for line in production.to_string().lines() {
                writeln!(f, "  {}", line)?;
            }
        }
        f.write_str("}")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, module) in self.modules.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", module)?;
        }
        Ok(())
    }
}

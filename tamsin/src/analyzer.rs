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
    ast::{Branch, Expr, Module, ProdRef, Production, Program},
    builtins,
    errors::{TamsinError, TamsinResult},
};
use std::rc::Rc;

/// Resolves every production reference to a module, fills in the locals of
/// every branch and then checks that everything referred to exists.
pub fn analyze(program: Program) -> TamsinResult<Program> {
    let program = Program {
        modules: program.modules.iter().map(resolve_module).collect(),
    };
    for module in &program.modules {
        for production in &module.productions {
            for branch in &production.branches {
                check(&program, &branch.body)?;
            }
        }
    }
    Ok(program)
}

fn resolve_module(module: &Module) -> Module {
    Module {
        name: module.name.clone(),
        productions: module
            .productions
            .iter()
            .map(|production| {
                Rc::new(Production {
                    name: production.name.clone(),
                    branches: production
                        .branches
                        .iter()
                        .map(|branch| resolve_branch(&module.name, branch))
                        .collect(),
                })
            })
            .collect(),
    }
}

fn resolve_branch(module: &Rc<str>, branch: &Branch) -> Branch {
    let body = resolve(module, branch.body.clone());
    let mut locals = Vec::new();
    for formal in &branch.formals {
        formal.collect_variables(&mut locals);
    }
    collect_locals(&body, &mut locals);
    Branch {
        formals: branch.formals.clone(),
        locals,
        body,
    }
}

fn resolve_prodref(module: &Rc<str>, prodref: ProdRef) -> ProdRef {
    if prodref.module.is_empty() {
        ProdRef {
            module: module.clone(),
            name: prodref.name,
        }
    } else {
        prodref
    }
}

fn resolve(module: &Rc<str>, expr: Expr) -> Expr {
    match expr {
        Expr::Call {
            prodref,
            args,
        } => Expr::call(resolve_prodref(module, prodref), args),
        Expr::Using {
            rule,
            scanner,
        } => Expr::using(resolve(module, *rule), resolve_prodref(module, scanner)),
        Expr::And(lhs, rhs) => Expr::and(resolve(module, *lhs), resolve(module, *rhs)),
        Expr::Or(lhs, rhs) => Expr::or(resolve(module, *lhs), resolve(module, *rhs)),
        Expr::Not(rule) => Expr::not(resolve(module, *rule)),
        Expr::While(rule) => Expr::repeat(resolve(module, *rule)),
        Expr::Send {
            rule,
            pattern,
        } => Expr::send(resolve(module, *rule), pattern),
        Expr::On {
            rule,
            text,
        } => Expr::on(resolve(module, *rule), text),
        Expr::Fold {
            rule,
            initial,
            constructor,
        } => Expr::Fold {
            rule: Box::new(resolve(module, *rule)),
            initial,
            constructor,
        },
        other @ Expr::Set {
            ..
        }
        | other @ Expr::Term(_) => other,
    }
}

/// Every variable that `expr` binds or reads, in order of first appearance.
fn collect_locals(expr: &Expr, locals: &mut Vec<Rc<str>>) {
    match expr {
        Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
            collect_locals(lhs, locals);
            collect_locals(rhs, locals);
        },
        Expr::Not(rule)
        | Expr::While(rule)
        | Expr::Using {
            rule,
            ..
        } => collect_locals(rule, locals),
        Expr::Call {
            args,
            ..
        } => args.iter().for_each(|arg| arg.collect_variables(locals)),
        Expr::Send {
            rule,
            pattern,
        } => {
            collect_locals(rule, locals);
            pattern.collect_variables(locals);
        },
        Expr::Set {
            variable,
            value,
        } => {
            if !locals.contains(variable) {
                locals.push(variable.clone());
            }
            value.collect_variables(locals);
        },
        Expr::On {
            rule,
            text,
        } => {
            collect_locals(rule, locals);
            text.collect_variables(locals);
        },
        Expr::Fold {
            rule,
            initial,
            ..
        } => {
            collect_locals(rule, locals);
            initial.collect_variables(locals);
        },
        Expr::Term(term) => term.collect_variables(locals),
    }
}

fn check(program: &Program, expr: &Expr) -> TamsinResult<()> {
    match expr {
        Expr::Call {
            prodref,
            args,
        } => check_call(program, prodref, args.len()),
        Expr::Using {
            rule,
            scanner,
        } => {
            if scanner.is_builtin() {
                if builtins::scanner(&scanner.name).is_none() {
                    return Err(TamsinError::UnknownScanner {
                        name: scanner.name.to_string(),
                    });
                }
            } else {
                program.find(scanner)?;
            }
            check(program, rule)
        },
        Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
            check(program, lhs)?;
            check(program, rhs)
        },
        Expr::Not(rule)
        | Expr::While(rule)
        | Expr::Send {
            rule,
            ..
        }
        | Expr::On {
            rule,
            ..
        }
        | Expr::Fold {
            rule,
            ..
        } => check(program, rule),
        Expr::Set {
            ..
        }
        | Expr::Term(_) => Ok(()),
    }
}

fn check_call(program: &Program, prodref: &ProdRef, arguments: usize) -> TamsinResult<()> {
    if !prodref.is_builtin() {
        return program.find(prodref).map(|_| ());
    }
    match builtins::arity(&prodref.name) {
        None => Err(TamsinError::UnknownBuiltin {
            name: prodref.name.to_string(),
        }),
        Some(arity) if arity != arguments => Err(TamsinError::BuiltinArity {
            name: prodref.name.to_string(),
            expected: arity,
            found: arguments,
        }),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::analyze;
    use crate::{
        ast::{ProdRef, Program},
        errors::TamsinError,
        parser::Parser,
    };

    fn analyzed(source: &str) -> Result<Program, TamsinError> {
        analyze(Parser::new(source, "<test>").grammar()?)
    }

    #[test]
    fn local_references_resolve_to_the_enclosing_module() {
        let program = analyzed("main = list:item. list { item = :other. other = 'x'. }").unwrap();
        let item = program.find(&ProdRef::new("list", "item")).unwrap();
        assert_eq!(item.branches[0].body.to_string(), "list:other");
        let main = program.main().unwrap();
        assert_eq!(main.branches[0].body.to_string(), "list:item");
    }

    #[test]
    fn locals_are_collected_in_order() {
        let program = analyzed("main(A) = x → B & set C = A + B & D <- C & return E. x = 'x'.").unwrap();
        let locals: Vec<String> = program.main().unwrap().branches[0]
            .locals
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(locals, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn undefined_references() {
        assert_eq!(
            analyzed("main = nothing.").unwrap_err(),
            TamsinError::UndefinedProduction {
                module: "main".into(),
                name: "nothing".into()
            }
        );
        assert_eq!(
            analyzed("main = nowhere:nothing.").unwrap_err(),
            TamsinError::UndefinedModule {
                module: "nowhere".into()
            }
        );
        assert_eq!(
            analyzed("main = 'x' using nothing.").unwrap_err(),
            TamsinError::UndefinedProduction {
                module: "main".into(),
                name: "nothing".into()
            }
        );
    }

    #[test]
    fn unknown_builtins() {
        assert_eq!(
            analyzed("main = $:frobnicate.").unwrap_err(),
            TamsinError::UnknownBuiltin {
                name: "frobnicate".into()
            }
        );
        assert_eq!(
            analyzed("main = $:expect(a, b).").unwrap_err(),
            TamsinError::BuiltinArity {
                name: "expect".into(),
                expected: 1,
                found: 2
            }
        );
        assert_eq!(
            analyzed("main = 'x' using $:morse.").unwrap_err(),
            TamsinError::UnknownScanner {
                name: "morse".into()
            }
        );
        assert!(analyzed("main = 'x' using $:byte.").is_ok());
    }
}

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

use crate::ast::{Branch, Expr, Module, Production, Program, TermExpr};
use std::rc::Rc;

const ACCUMULATOR: &str = "_1";
const ITEM: &str = "_2";

/// Rewrites every fold in `program` into the loop it stands for.
pub fn desugar(program: Program) -> Program {
    Program {
        modules: program
            .modules
            .into_iter()
            .map(|module| Module {
                name: module.name,
                productions: module
                    .productions
                    .iter()
                    .map(|production| {
                        Rc::new(Production {
                            name: production.name.clone(),
                            branches: production
                                .branches
                                .iter()
                                .map(|branch| Branch {
                                    formals: branch.formals.clone(),
                                    locals: branch.locals.clone(),
                                    body: desugar_expr(branch.body.clone()),
                                })
                                .collect(),
                        })
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// `rule / initial / tag` becomes
/// `set _1 = initial & {rule → _2 & set _1 = tag(_2, _1)} & $:return(_1)`,
/// or `set _1 = _1 + _2` inside the loop when there's no tag.
pub fn desugar_expr(expr: Expr) -> Expr {
    match expr {
        Expr::Fold {
            rule,
            initial,
            constructor,
        } => {
            let accumulator = || TermExpr::variable(ACCUMULATOR);
            let item = || TermExpr::variable(ITEM);
            let accumulated = match constructor {
                Some(tag) => TermExpr::Constructor(tag, vec![item(), accumulator()]),
                None => TermExpr::concat(accumulator(), item()),
            };
            Expr::and(
                Expr::and(
                    Expr::set(ACCUMULATOR, initial),
                    Expr::repeat(Expr::and(
                        Expr::send(desugar_expr(*rule), item()),
                        Expr::set(ACCUMULATOR, accumulated),
                    )),
                ),
                Expr::builtin("return", vec![accumulator()]),
            )
        },
        Expr::And(lhs, rhs) => Expr::and(desugar_expr(*lhs), desugar_expr(*rhs)),
        Expr::Or(lhs, rhs) => Expr::or(desugar_expr(*lhs), desugar_expr(*rhs)),
        Expr::Not(rule) => Expr::not(desugar_expr(*rule)),
        Expr::While(rule) => Expr::repeat(desugar_expr(*rule)),
        Expr::Send {
            rule,
            pattern,
        } => Expr::send(desugar_expr(*rule), pattern),
        Expr::Using {
            rule,
            scanner,
        } => Expr::using(desugar_expr(*rule), scanner),
        Expr::On {
            rule,
            text,
        } => Expr::on(desugar_expr(*rule), text),
        other @ Expr::Call {
            ..
        }
        | other @ Expr::Set {
            ..
        }
        | other @ Expr::Term(_) => other,
    }
}

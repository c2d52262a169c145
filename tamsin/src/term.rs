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
};
use log::debug;
use std::{
    collections::HashMap,
    fmt::{self, Write},
    rc::Rc,
};

/// Raw bytes of an atom or a compound's tag. Not necessarily valid UTF-8.
pub type Text = Rc<[u8]>;

/// Variable names bound by a successful match.
pub type Bindings = HashMap<Rc<str>, Term>;

const BAREWORD: &[u8] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// The values that Tamsin programs compute with.
///
/// Terms never change once built. Every operation that would modify a term
/// builds a new one instead, so terms can be shared freely between snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    Atom(Text),
    Compound {
        tag: Text,
        contents: Rc<[Term]>,
    },
    /// Only meaningful relative to a `Context`.
    Variable(Rc<str>),
    /// Returned by scanners at the end of the input. Grammar programs have no
    /// syntax for it so it can only come from a scanner.
    Eof,
}

impl Term {
    pub fn atom(text: impl AsRef<[u8]>) -> Self {
        Self::Atom(text.as_ref().into())
    }

    pub fn nil() -> Self {
        Self::atom("nil")
    }

    pub fn compound(tag: impl AsRef<[u8]>, contents: Vec<Self>) -> Self {
        Self::Compound {
            tag: tag.as_ref().into(),
            contents: contents.into(),
        }
    }

    pub fn variable(name: impl Into<Rc<str>>) -> Self {
        Self::Variable(name.into())
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// The text of an atom.
    pub fn text(&self) -> Option<&[u8]> {
        match self {
            Self::Atom(text) => Some(text),
            _ => None,
        }
    }

    /// Replaces every variable with its value in the innermost scope of `context`.
    ///
    /// Variables without a value are left where they are.
    pub fn expand(&self, context: &Context) -> Self {
        match self {
            Self::Atom(_) | Self::Eof => self.clone(),
            Self::Variable(name) => context.fetch(name).cloned().unwrap_or_else(|| {
                debug!("expand: variable {} is unbound", name);
                self.clone()
            }),
            Self::Compound {
                tag,
                contents,
            } => Self::Compound {
                tag: tag.clone(),
                contents: contents.iter().map(|c| c.expand(context)).collect(),
            },
        }
    }

    /// Unifies `self`, as a pattern, with `value`.
    pub fn match_value(&self, value: &Self) -> Option<Bindings> {
        let mut bindings = Bindings::new();
        if self.match_into(value, &mut bindings) {
            Some(bindings)
        } else {
            None
        }
    }

    /// Unifies each pattern with the value in the same position, stopping at
    /// the first mismatch. A variable appearing more than once must match equal
    /// values everywhere it appears.
    pub fn match_all(patterns: &[Self], values: &[Self]) -> Option<Bindings> {
        if patterns.len() != values.len() {
            return None;
        }
        let mut bindings = Bindings::new();
        for (pattern, value) in patterns.iter().zip(values) {
            if !pattern.match_into(value, &mut bindings) {
                return None;
            }
        }
        Some(bindings)
    }

    fn match_into(&self, value: &Self, bindings: &mut Bindings) -> bool {
        match (self, value) {
            (Self::Variable(name), _) => match bindings.get(name) {
                Some(bound) => bound == value,
                None => {
                    bindings.insert(name.clone(), value.clone());
                    true
                },
            },
            (Self::Atom(p), Self::Atom(v)) => p == v,
            (Self::Eof, Self::Eof) => true,
            (
                Self::Compound {
                    tag: p_tag,
                    contents: p_contents,
                },
                Self::Compound {
                    tag: v_tag,
                    contents: v_contents,
                },
            ) => {
                p_tag == v_tag
                    && p_contents.len() == v_contents.len()
                    && p_contents
                        .iter()
                        .zip(v_contents.iter())
                        .all(|(p, v)| p.match_into(v, bindings))
            },
            _ => false,
        }
    }

    /// Names of the variables in this term, in order of first appearance.
    pub fn collect_variables(&self, variables: &mut Vec<Rc<str>>) {
        match self {
            Self::Variable(name) => {
                if !variables.contains(name) {
                    variables.push(name.clone());
                }
            },
            Self::Compound {
                contents,
                ..
            } => contents.iter().for_each(|c| c.collect_variables(variables)),
            Self::Atom(_) | Self::Eof => (),
        }
    }

    /// The bytes of the flattened rendering, used wherever a term is treated as text.
    pub fn flatten(&self) -> Vec<u8> {
        let mut flat = Vec::new();
        self.write_flat(&mut flat);
        flat
    }

    fn write_flat(&self, out: &mut Vec<u8>) {
        match self {
            Self::Atom(text) => out.extend_from_slice(text),
            Self::Variable(name) => out.extend_from_slice(name.as_bytes()),
            Self::Eof => out.extend_from_slice(b"EOF"),
            Self::Compound {
                tag,
                contents,
            } => {
                out.extend_from_slice(tag);
                out.push(b'(');
                for (i, c) in contents.iter().enumerate() {
                    if i > 0 {
                        out.extend_from_slice(b", ");
                    }
                    c.write_flat(out);
                }
                out.push(b')');
            },
        }
    }

    /// A rendering that can be read back as a term: atoms are quoted and
    /// escaped unless they are barewords.
    pub fn repr(&self) -> String {
        match self {
            Self::Atom(text) => repr_escape(text),
            Self::Variable(name) => name.to_string(),
            Self::Eof => "EOF".into(),
            Self::Compound {
                tag,
                contents,
            } => format!(
                "{}({})",
                repr_escape(tag),
                contents.iter().map(Self::repr).collect::<Vec<_>>().join(", ")
            ),
        }
    }

    /// Reverses a list built from two-element compounds sharing this term's
    /// tag and terminated by `sentinel`.
    pub fn reversed(&self, sentinel: &Self) -> TamsinResult<Self> {
        let malformed = |term: &Self| TamsinError::MalformedList {
            term: term.repr(),
        };
        match self {
            Self::Compound {
                tag,
                ..
            } => {
                let mut reversed = sentinel.clone();
                let mut rest = self;
                while let Self::Compound {
                    tag: rest_tag,
                    contents,
                } = rest
                {
                    if rest_tag != tag {
                        break;
                    }
                    let head = contents.first().ok_or_else(|| malformed(rest))?;
                    reversed = Self::Compound {
                        tag: tag.clone(),
                        contents: vec![head.clone(), reversed].into(),
                    };
                    match contents.get(1) {
                        Some(tail) => rest = tail,
                        None => return Err(malformed(rest)),
                    }
                }
                if rest == sentinel {
                    Ok(reversed)
                } else {
                    Err(malformed(rest))
                }
            },
            _ if self == sentinel => Ok(self.clone()),
            _ => Err(malformed(self)),
        }
    }
}

/// Quotes and escapes text unless every byte is a bareword character.
pub fn repr_escape(text: &[u8]) -> String {
    if text.is_empty() {
        return "''".into();
    }
    if text.iter().all(|b| BAREWORD.contains(b)) {
        return String::from_utf8_lossy(text).into_owned();
    }
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('\'');
    for &byte in text {
        match byte {
            b'\'' => escaped.push_str("\\'"),
            b'\\' => escaped.push_str("\\\\"),
            32..=126 => escaped.push(byte as char),
            _ => {
                let _ = write!(escaped, "\\x{:02x}", byte);
            },
        }
    }
    escaped.push('\'');
    escaped
}

impl fmt::Display for Term {
    /// The flattened rendering.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.flatten()))
    }
}

impl<'a> From<&'a str> for Term {
    fn from(text: &'a str) -> Self {
        Self::atom(text)
    }
}

#[cfg(test)]
mod tests {
    use super::{repr_escape, Term};
    use crate::{context::Context, errors::TamsinError};
    use maplit::hashmap;
    use proptest::prelude::*;

    fn list(items: &[&str], sentinel: Term) -> Term {
        items.iter().rev().fold(sentinel, |tail, item| {
            Term::compound("list", vec![Term::from(*item), tail])
        })
    }

    #[test]
    fn equal_compounds_match_without_bindings() {
        let term = Term::compound("t", vec!["a".into(), "b".into()]);
        assert_eq!(term.match_value(&term.clone()), Some(hashmap! {}));
    }

    #[test]
    fn mismatched_tags_do_not_match() {
        let pattern = Term::compound("t", vec!["a".into()]);
        let value = Term::compound("u", vec!["a".into()]);
        assert_eq!(pattern.match_value(&value), None);
    }

    #[test]
    fn mismatched_arities_do_not_match() {
        let pattern = Term::compound("t", vec!["a".into()]);
        let value = Term::compound("t", vec!["a".into(), "b".into()]);
        assert_eq!(pattern.match_value(&value), None);
    }

    #[test]
    fn variables_inside_compounds_are_captured() {
        let pattern = Term::compound("pair", vec![Term::variable("L"), "b".into()]);
        let value = Term::compound("pair", vec![Term::compound("x", vec![]), "b".into()]);
        assert_eq!(
            pattern.match_value(&value),
            Some(hashmap! {"L".into() => Term::compound("x", vec![])})
        );
    }

    #[test]
    fn eof_only_matches_eof() {
        assert!(Term::Eof.match_value(&Term::Eof).is_some());
        assert!(Term::Eof.match_value(&Term::from("EOF")).is_none());
        assert!(Term::from("EOF").match_value(&Term::Eof).is_none());
    }

    #[test]
    fn match_all_short_circuits_on_length_mismatch() {
        assert_eq!(Term::match_all(&[Term::variable("X")], &[]), None);
    }

    #[test]
    fn repeated_variable_must_bind_equal_values() {
        let patterns = [Term::variable("X"), Term::variable("X")];
        assert_eq!(Term::match_all(&patterns, &["1".into(), "2".into()]), None);
        assert_eq!(
            Term::match_all(&patterns, &["1".into(), "1".into()]),
            Some(hashmap! {"X".into() => Term::from("1")})
        );
    }

    #[test]
    fn expand_substitutes_innermost_scope() {
        let mut context = Context::default();
        context.store("X".into(), "outer".into());
        context.push_scope();
        context.store("X".into(), "inner".into());
        let term = Term::compound("f", vec![Term::variable("X"), Term::variable("Y")]);
        assert_eq!(
            term.expand(&context),
            Term::compound("f", vec!["inner".into(), Term::variable("Y")])
        );
    }

    #[test]
    fn flatten_and_repr() {
        let term = Term::compound("pair", vec!["a b".into(), "".into(), "c".into()]);
        assert_eq!(term.to_string(), "pair(a b, , c)");
        assert_eq!(term.repr(), "pair('a b', '', c)");
        assert_eq!(repr_escape(b"it's\n\\"), "'it\\'s\\x0a\\\\'");
        assert_eq!(Term::Eof.to_string(), "EOF");
    }

    #[test]
    fn reversing_a_list() {
        let nil = Term::nil();
        assert_eq!(
            list(&["a", "b", "c"], nil.clone()).reversed(&nil),
            Ok(list(&["c", "b", "a"], nil.clone()))
        );
        assert_eq!(nil.reversed(&nil), Ok(nil.clone()));
    }

    #[test]
    fn reversing_a_malformed_list() {
        let improper = list(&["a"], "end".into());
        assert_eq!(
            improper.reversed(&Term::nil()),
            Err(TamsinError::MalformedList {
                term: "end".into()
            })
        );
    }

    proptest! {
        #[test]
        fn variable_matches_anything(name in "[A-Z][a-z]*", text in "\\PC*") {
            let value = Term::compound("w", vec![Term::from(text.as_str())]);
            let bindings = Term::variable(name.as_str()).match_value(&value);
            prop_assert_eq!(bindings, Some(hashmap! {name.as_str().into() => value}));
        }

        #[test]
        fn atoms_match_iff_equal(a in "[a-c]{0,2}", b in "[a-c]{0,2}") {
            let matched = Term::from(a.as_str()).match_value(&Term::from(b.as_str()));
            prop_assert_eq!(matched.is_some(), a == b);
        }
    }
}

/*  Library for the Tamsin grammar language.
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
extern crate assert_matches;
#[macro_use]
extern crate test_tamsin;
extern crate tamsin;

use tamsin::{run, TamsinError};

const SEQUENCE: &str = r#"main = "a" & "b"."#;

const DISPATCH: &str = r#"
    p("x") = return(1).
    p("y") = return(2).
"#;

// A sequence succeeds with the result of its last rule.
#[test]
fn sequence() {
    assert_success!(SEQUENCE, "ab", "b");
}

// The failure says what was expected, what was found instead and where.
#[test]
fn sequence_mismatch() {
    assert_failure!(
        SEQUENCE,
        "ac",
        "expected 'b' found 'c' at line 1, column 2 in '<input>'"
    );
}

// Running out of input is a failure like any other.
#[test]
fn sequence_cut_short() {
    assert_failure!(
        SEQUENCE,
        "a",
        "expected 'b' found 'EOF' at line 1, column 2 in '<input>'"
    );
}

// The first clause whose formals match the arguments is the one evaluated.
#[test]
fn multi_clause_dispatch() {
    let source = format!("main = p(\"y\").{}", DISPATCH);
    assert_success!(&source, "", "2");
    let source = format!("main = p(\"x\").{}", DISPATCH);
    assert_success!(&source, "", "1");
}

// No clause matching the arguments can't be recovered from, even by an alternative.
#[test]
fn no_matching_clause() {
    let source = format!("main = p(\"z\") | return(3).{}", DISPATCH);
    let error = run(program!(&source), "", "<input>").unwrap_err();
    assert_matches!(
        error.cause(),
        TamsinError::NoMatchingBranch { production, arguments }
            if production == "p" && arguments == "z"
    );
    assert_matches!(error, TamsinError::Aborted { call_stack, .. } if call_stack == vec!["main"]);
}

// Switching to another scanner only lasts for the rule it applies to.
#[test]
fn scanner_switch_is_scoped() {
    let source = r#"
        main = (sentence using $:tamsin).
        sentence = (letters using $:utf8) & "bar".
        letters = "f" & "o" & "o".
    "#;
    assert_success!(source, "foo bar", "bar");
    assert_success!(source, "foobar", "bar");
}

// The grammar language scanner reads a whole word as one token.
#[test]
fn words_are_single_tokens() {
    assert_failure!(
        r#"main = ("f" using $:tamsin)."#,
        "foo",
        "expected 'f' found 'foo' at line 1, column 1 in '<input>'"
    );
    assert_success!(r#"main = ("foo" using $:tamsin)."#, "  foo", "foo");
}

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
extern crate test_tamsin;
extern crate tamsin;

use tamsin::{Outcome, Term};
use test_tamsin::run_capturing;

#[test]
fn print_and_emit() {
    let (outcome, output) = run_capturing("main = print hello & $:emit(world).", "");
    assert_eq!(outcome, Ok(Outcome::Success(Term::from("world"))));
    assert_eq!(output, "hello\nworld");
}

// Printing a compound prints its flattened text.
#[test]
fn print_compound() {
    let (_, output) = run_capturing("main = print pair(a, 'b c').", "");
    assert_eq!(output, "pair(a, b c)\n");
}

#[test]
fn eof_and_any() {
    assert_success!(r#"main = "a" & eof."#, "a", "");
    assert_failure!(r#"main = "a" & eof."#, "ab", "expected EOF found 'b'");
    assert_success!("main = any & any.", "xy", "y");
    assert_failure!("main = any.", "", "expected any token, found EOF");
}

#[test]
fn character_classes() {
    assert_success!("main = $:upper & $:alnum.", "A1", "1");
    assert_failure!(
        "main = $:upper.",
        "a",
        "expected uppercase alphabetic, found 'a'"
    );
    assert_failure!("main = $:alnum.", "-", "expected alphanumeric, found '-'");
    assert_success!("main = ($:startswith(fo) using $:tamsin).", "foo", "foo");
    assert_failure!(
        "main = ($:startswith(fo) using $:tamsin).",
        "bar",
        "expected 'fo', found 'bar'"
    );
}

#[test]
fn equal() {
    assert_success!("main = $:equal(a, a).", "", "a");
    assert_success!("main = $:equal(f(a), f(a)) → T & $:repr(T).", "", "f(a)");
    assert_failure!("main = $:equal(a, b).", "", "term 'a' does not equal 'b'");
}

#[test]
fn unquote() {
    assert_success!(r#"main = $:unquote('"hi"', '"', '"')."#, "", "hi");
    assert_success!("main = $:unquote('<hi>', '<', '>').", "", "hi");
    assert_success!("main = $:unquote('<hi>', '<', '').", "", "hi>");
    // A lone quote is both the opening and the closing one.
    assert_success!(r#"main = $:unquote("'", "'", "'")."#, "", "");
    assert_success!(r#"main = $:unquote("ab", "ab", "b")."#, "", "");
    assert_failure!(
        "main = $:unquote(hi, '<', '>').",
        "",
        "term 'hi' is not quoted with '<' and '>'"
    );
}

#[test]
fn building_terms() {
    assert_success!(
        "main = $:mkterm(pair, list(a, list(b, nil))) → T & $:repr(T).",
        "",
        "pair(a, b)"
    );
    assert_success!("main = $:mkterm(leaf, nil).", "", "leaf");
    assert_success!(
        "main = $:reverse(list(a, list(b, nil)), nil) → L & $:repr(L).",
        "",
        "list(b, list(a, nil))"
    );
}

#[test]
fn reversing_a_malformed_list_is_fatal() {
    let (outcome, _) = run_capturing("main = $:reverse(list(a, b), nil).", "");
    assert_eq!(
        outcome.unwrap_err().cause(),
        &tamsin::TamsinError::MalformedList {
            term: "b".into()
        }
    );
}

#[test]
fn repr() {
    assert_success!("main = $:repr(foo('b z', c)).", "", "foo('b z', c)");
    assert_success!("main = $:repr('').", "", "''");
}

// Every call gives a new symbol.
#[test]
fn gensym() {
    assert_success!(
        "main = $:gensym(g) → A & $:gensym(g) → B & return A + B.",
        "",
        "g1g2"
    );
}

#[test]
fn bytes() {
    assert_success!("main = $:hexbyte(4, 1).", "", "A");
    assert_failure!("main = $:hexbyte(z, 1).", "", "'z1' is not a hexadecimal byte");
    assert_success!("main = $:format_octal('A').", "", "101");
    assert_failure!("main = $:format_octal('').", "", "can't format an empty term in octal");
    assert_success!("main = $:length(hello).", "", "5");
}

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
extern crate proptest;
#[macro_use]
extern crate test_tamsin;
extern crate tamsin;

use tamsin::{compile, run, Outcome, TamsinError, Term};

#[test]
fn modules() {
    let source = r#"
        main = list:items.
        list {
            items = item & item.
            item = "x".
        }
    "#;
    assert_success!(source, "xx", "x");
}

proptest! {
    // Any bareword that isn't a keyword can name a module and a production in it.
    #[test]
    fn barewords_name_modules_and_productions(
        module in "[a-z][a-z0-9_]{0,7}",
        name in "[a-z][a-z0-9_]{0,7}"
    ) {
        assume_barewords!(module, name);
        prop_assume!(module != "main");
        let source = format!(
            "main = {module}:{name}. {module} {{ {name} = \"x\" & return {name}. }}",
            module = module,
            name = name
        );
        prop_assert_eq!(
            run(program!(source), "x", "<input>"),
            Ok(Outcome::Success(Term::from(name.as_str())))
        );
    }
}

// Modules with the same name are one module.
#[test]
fn reopened_modules() {
    let source = r#"
        main = m:a & m:b.
        m { a = "a". }
        m { b = "b". }
    "#;
    assert_success!(source, "ab", "b");
}

#[test]
fn arguments_bind_formals() {
    assert_success!("main = greet(world). greet(W) = return hello + W.", "", "helloworld");
    assert_success!(
        "main = first(pair(a, b)). first(pair(X, Y)) = return X.",
        "",
        "a"
    );
}

// A variable that appears twice in the formals must be bound to equal terms.
#[test]
fn repeated_formals() {
    let source = "main = same(a, b). same(X, X) = return X. same(X, Y) = fail different.";
    assert_failure!(source, "", "different");
    assert_success!("main = same(c, c). same(X, X) = return X.", "", "c");
}

#[test]
fn assignment() {
    assert_success!("main = set X = a & X ← X + b & return X.", "", "ab");
    assert_success!(r#"main = "x" → X & "y" → Y & return X + Y."#, "xy", "xy");
}

// Sending a result to a pattern that doesn't match it fails.
#[test]
fn send_mismatch() {
    assert_failure!(r#"main = "x" → y."#, "x", "nomatch");
}

#[test]
fn aliases() {
    assert_success!(r#"@alias word 0 = w. main = word. w = "q"."#, "q", "q");
    assert_success!(r#"@alias twice 1 = t. main = twice a. t(X) = return X + X."#, "", "aa");
    assert_eq!(
        compile("@unalias return. main = return.", "<grammar>"),
        Err(TamsinError::UndefinedProduction {
            module: "main".into(),
            name: "return".into()
        })
    );
    assert_matches!(
        compile("@frobnicate. main = return x.", "<grammar>"),
        Err(TamsinError::UnknownPragma { .. })
    );
}

#[test]
fn folds() {
    assert_success!("main = $:alnum / ''.", "abc!", "abc");
    assert_success!(
        "main = ($:alnum / nil / cons) → L & $:repr(L).",
        "ab",
        "cons(b, cons(a, nil))"
    );
    assert_success!("main = $:alnum / start.", "", "start");
}

// `@` scans a term instead of the input.
#[test]
fn scanning_a_term() {
    assert_success!(r#"main = (("b" & "c") @ bc) & "a"."#, "a", "a");
    assert_success!(r#"main = "x" → X & ("x" @ X)."#, "x", "x");
    assert_failure!(
        r#"main = ("b" @ c)."#,
        "b",
        "expected 'b' found 'c' at line 1, column 1 in '<texpr>'"
    );
}

#[test]
fn quoted_literals() {
    assert_success!(r#"main = set X = b & «'a'» & «X»."#, "ab", "b");
    assert_success!(r#"main = <<'a'>> & "b"."#, "ab", "b");
    assert_success!(r#"main = "\x41" & "\n"."#, "A\n", "\n");
}

// Errors keep the productions that were being evaluated.
#[test]
fn errors_keep_the_call_stack() {
    let error = run(
        program!("main = p. p = q(x). q(y) = 'no'."),
        "",
        "<input>",
    )
    .unwrap_err();
    assert_eq!(
        error.to_string(),
        "no 'q' production matched arguments (x) (call stack: main > p)"
    );
}

#[test]
fn compile_errors() {
    assert_eq!(
        compile("main = $:frobnicate.", "<grammar>"),
        Err(TamsinError::UnknownBuiltin {
            name: "frobnicate".into()
        })
    );
    assert_matches!(
        compile("main = \"a\" &\n  .", "<grammar>"),
        Err(TamsinError::Syntax { line: 2, column: 3, .. })
    );
    assert_eq!(compile("", "<grammar>").map(|p| p.modules.len()), Ok(0));
    assert_eq!(
        run(program!("m { a = 'a'. }"), "", "<input>"),
        Err(TamsinError::MissingMain)
    );
}

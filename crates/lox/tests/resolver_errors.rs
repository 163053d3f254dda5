//! Static checks performed by the resolver. All are reported (several per
//! run where applicable) and gate evaluation.

use lox::{CollectStringPrint, LoxError, NoInput, run_source};

fn static_messages(source: &str) -> Vec<String> {
    let mut out = CollectStringPrint::new();
    match run_source(source, &mut out, &mut NoInput).expect_err("program should fail") {
        LoxError::Static(messages) => messages,
        LoxError::Runtime(message) => panic!("expected static errors, got runtime error: {message}"),
    }
}

fn assert_has(messages: &[String], needle: &str) {
    assert!(
        messages.iter().any(|m| m.contains(needle)),
        "no message contains {needle:?}: {messages:?}"
    );
}

#[test]
fn redeclaration_in_the_same_scope() {
    let messages = static_messages("{ var a = 1; var a = 2; print(a); }");
    assert_has(&messages, "Variable with this name has already been declared in this scope.");
}

#[test]
fn shadowing_in_a_nested_scope_is_fine() {
    let mut out = CollectStringPrint::new();
    run_source("{ var a = 1; { var a = 2; print(a); } print(a); }", &mut out, &mut NoInput)
        .expect("shadowing across scopes is legal");
    assert_eq!(out.output(), "2\n1\n");
}

#[test]
fn reading_a_local_in_its_own_initializer() {
    let messages = static_messages("{ var a = a; print(a); }");
    assert_has(&messages, "Can't read local variable in its own initializer.");
}

#[test]
fn global_initializer_may_reference_the_old_binding() {
    // The own-initializer check only applies to locals.
    let mut out = CollectStringPrint::new();
    run_source("var a = 1; var a = a + 1; print(a);", &mut out, &mut NoInput).expect("globals may redefine");
    assert_eq!(out.output(), "2\n");
}

#[test]
fn return_at_top_level() {
    let messages = static_messages("return 1;");
    assert_has(&messages, "Can't return from top-level code.");
}

#[test]
fn returning_a_value_from_an_initializer() {
    let messages = static_messages("class C { init() { return 5; } }");
    assert_has(&messages, "Can't return a value from an initializer.");
}

#[test]
fn bare_return_in_an_initializer_is_fine() {
    let mut out = CollectStringPrint::new();
    run_source(
        "class C { init() { this.x = 1; return; } } print(C().x);",
        &mut out,
        &mut NoInput,
    )
    .expect("bare return in init is legal");
    assert_eq!(out.output(), "1\n");
}

#[test]
fn this_outside_a_class() {
    let messages = static_messages("print(this);");
    assert_has(&messages, "Can't use 'this' outside of a class.");
    let messages = static_messages("fun f() { return this; } f();");
    assert_has(&messages, "Can't use 'this' outside of a class.");
}

#[test]
fn super_outside_a_class() {
    let messages = static_messages("super.m();");
    assert_has(&messages, "Can't use 'super' outside of a class.");
}

#[test]
fn super_in_a_class_without_a_superclass() {
    let messages = static_messages("class Base { m() { return super.m(); } }");
    assert_has(&messages, "Can't use 'super' in a class with no superclass.");
}

#[test]
fn a_class_cannot_inherit_from_itself() {
    let messages = static_messages("class Selfish < Selfish { }");
    assert_has(&messages, "A class can't inherit from itself.");
}

#[test]
fn unread_locals_are_reported_at_scope_exit() {
    let messages = static_messages("{ var unused = 1; }");
    assert_has(&messages, "Local variable not used.");
}

#[test]
fn unread_parameters_are_reported() {
    let messages = static_messages("fun f(used, unused) { return used; } f(1, 2);");
    assert_has(&messages, "Local variable not used.");
}

#[test]
fn writing_without_reading_still_counts_as_unread() {
    let messages = static_messages("{ var a = 1; a = 2; }");
    assert_has(&messages, "Local variable not used.");
}

#[test]
fn globals_are_exempt_from_the_unread_check() {
    let mut out = CollectStringPrint::new();
    run_source("var never_read = 1;", &mut out, &mut NoInput).expect("unread globals are legal");
    assert_eq!(out.output(), "");
}

#[test]
fn several_resolver_errors_accumulate() {
    let source = "
        fun f() {
            return this;
        }
        return 2;
    ";
    let messages = static_messages(source);
    assert_has(&messages, "Can't use 'this' outside of a class.");
    assert_has(&messages, "Can't return from top-level code.");
}

//! The `array` native and the builtin methods of array objects.

use lox::{CollectStringPrint, LoxError, NoInput, run_source};
use pretty_assertions::assert_eq;

fn run(source: &str) -> String {
    let mut out = CollectStringPrint::new();
    run_source(source, &mut out, &mut NoInput).expect("program should run cleanly");
    out.into_output()
}

fn runtime_message(source: &str) -> String {
    let mut out = CollectStringPrint::new();
    match run_source(source, &mut out, &mut NoInput).expect_err("program should fail") {
        LoxError::Runtime(message) => message,
        LoxError::Static(messages) => panic!("expected runtime error, got static errors: {messages:?}"),
    }
}

#[test]
fn array_starts_as_nil_slots() {
    assert_eq!(run("var a = array(2); print(a.get(0)); print(a.get(1));"), "nil\nnil\n");
}

#[test]
fn set_then_get_round_trips() {
    assert_eq!(run("var a = array(3); a.set(1, \"x\"); print(a.get(1));"), "x\n");
}

#[test]
fn nil_index_appends() {
    let source = "
        var a = array(3);
        a.set(0, 1);
        a.set(1, 2);
        a.set(nil, 3);
        print(a.length());
    ";
    assert_eq!(run(source), "4\n");
}

#[test]
fn length_of_empty_array() {
    assert_eq!(run("print(array(0).length());"), "0\n");
}

#[test]
fn arrays_print_their_elements() {
    assert_eq!(run("var a = array(2); a.set(0, 1); print(a);"), "[1, nil]\n");
}

#[test]
fn arrays_compare_element_wise() {
    let source = "
        var a = array(2); a.set(0, 1); a.set(1, 2);
        var b = array(2); b.set(0, 1); b.set(1, 2);
        var c = array(2); c.set(0, 1); c.set(1, 3);
        print(a == b);
        print(a == c);
        print(a == a);
    ";
    assert_eq!(run(source), "true\nfalse\ntrue\n");
}

#[test]
fn out_of_range_get_is_an_error() {
    let message = runtime_message("array(2).get(2);");
    assert!(message.contains("Array index out of range."), "unexpected: {message}");
}

#[test]
fn negative_index_is_out_of_range() {
    let message = runtime_message("array(2).get(-1);");
    assert!(message.contains("Array index out of range."), "unexpected: {message}");
}

#[test]
fn fractional_index_is_an_error() {
    let message = runtime_message("array(2).get(0.5);");
    assert!(message.contains("Array index must be an integer."), "unexpected: {message}");
}

#[test]
fn non_numeric_index_is_an_error() {
    let message = runtime_message("array(2).set(\"0\", 1);");
    assert!(message.contains("Array index must be an integer."), "unexpected: {message}");
}

#[test]
fn out_of_range_set_is_an_error() {
    let message = runtime_message("array(1).set(1, \"x\");");
    assert!(message.contains("Array index out of range."), "unexpected: {message}");
}

#[test]
fn arrays_reject_new_properties() {
    let message = runtime_message("var a = array(1); a.stuff = 1;");
    assert!(
        message.contains("Can't add properties to arrays."),
        "unexpected message: {message}"
    );
}

#[test]
fn unknown_array_method_is_an_error() {
    let message = runtime_message("array(1).reverse();");
    assert!(
        message.contains("Undefined property 'reverse'."),
        "unexpected message: {message}"
    );
}

#[test]
fn array_size_must_be_a_nonnegative_integer() {
    let message = runtime_message("array(-1);");
    assert!(
        message.contains("Array size must be a non-negative integer."),
        "unexpected message: {message}"
    );
    let message = runtime_message("array(1.5);");
    assert!(
        message.contains("Array size must be a non-negative integer."),
        "unexpected message: {message}"
    );
    let message = runtime_message("array(\"3\");");
    assert!(
        message.contains("Array size must be a non-negative integer."),
        "unexpected message: {message}"
    );
}

#[test]
fn array_methods_are_values_bound_to_their_array() {
    let source = "
        var a = array(0);
        var push = a.set;
        push(nil, \"x\");
        print(a.length());
        print(push);
    ";
    assert_eq!(run(source), "1\n<native fn set>\n");
}

#[test]
fn arrays_hold_mixed_values() {
    let source = "
        var a = array(0);
        a.set(nil, 1);
        a.set(nil, \"two\");
        a.set(nil, nil);
        a.set(nil, true);
        print(a);
    ";
    assert_eq!(run(source), "[1, two, nil, true]\n");
}

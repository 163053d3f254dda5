//! End-to-end tests for expression and statement semantics, driven through
//! the public `run_source` API with a collecting print writer.

use lox::{CollectStringPrint, LoxError, NoInput, run_source};
use pretty_assertions::assert_eq;

/// Runs a program and returns everything it printed.
fn run(source: &str) -> String {
    let mut out = CollectStringPrint::new();
    run_source(source, &mut out, &mut NoInput).expect("program should run cleanly");
    out.into_output()
}

/// Runs a program expected to fail and returns the error.
fn run_err(source: &str) -> LoxError {
    let mut out = CollectStringPrint::new();
    run_source(source, &mut out, &mut NoInput).expect_err("program should fail")
}

fn runtime_message(source: &str) -> String {
    match run_err(source) {
        LoxError::Runtime(message) => message,
        LoxError::Static(messages) => panic!("expected runtime error, got static errors: {messages:?}"),
    }
}

#[test]
fn addition_of_variables() {
    assert_eq!(run("var a = 1; var b = 2; print(a + b);"), "3\n");
}

#[test]
fn integer_valued_results_print_without_fraction() {
    assert_eq!(run("print(4 / 2);"), "2\n");
    assert_eq!(run("print(7 / 2);"), "3.5\n");
    assert_eq!(run("print(0.1 + 0.2);"), "0.30000000000000004\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(run("print(\"foo\" + \"bar\");"), "foobar\n");
}

#[test]
fn mixed_concatenation_stringifies_both_operands() {
    assert_eq!(run("print(\"n=\" + 4);"), "n=4\n");
    assert_eq!(run("print(4 + \"!\");"), "4!\n");
    assert_eq!(run("print(true + \"?\");"), "true?\n");
    assert_eq!(run("print(\"x\" + nil);"), "xnil\n");
}

#[test]
fn plus_rejects_operands_without_a_string_or_two_numbers() {
    let message = runtime_message("print(nil + true);");
    assert!(
        message.contains("Operands must be numbers or strings."),
        "unexpected message: {message}"
    );
}

#[test]
fn arithmetic_requires_numbers() {
    let message = runtime_message("print(1 - \"a\");");
    assert!(message.contains("Operands must be numbers."), "unexpected: {message}");
    let message = runtime_message("print(\"a\" * 2);");
    assert!(message.contains("Operands must be numbers."), "unexpected: {message}");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let message = runtime_message("print(1 / 0);");
    assert!(message.contains("Division by zero."), "unexpected: {message}");
}

#[test]
fn unary_minus_requires_a_number() {
    assert_eq!(run("print(-3.5);"), "-3.5\n");
    let message = runtime_message("print(-\"a\");");
    assert!(message.contains("Operand must be a number."), "unexpected: {message}");
}

#[test]
fn bang_negates_truthiness() {
    assert_eq!(run("print(!nil);"), "true\n");
    assert_eq!(run("print(!0);"), "false\n");
    assert_eq!(run("print(!\"\");"), "false\n");
    assert_eq!(run("print(!false);"), "true\n");
}

#[test]
fn comparisons_work_on_numbers_and_strings() {
    assert_eq!(run("print(1 < 2);"), "true\n");
    assert_eq!(run("print(2 <= 1);"), "false\n");
    assert_eq!(run("print(\"a\" < \"b\");"), "true\n");
    assert_eq!(run("print(\"b\" >= \"b\");"), "true\n");
}

#[test]
fn comparisons_reject_mixed_operand_types() {
    let message = runtime_message("print(1 < \"a\");");
    assert!(
        message.contains("Operands must all be of the same type."),
        "unexpected message: {message}"
    );
}

#[test]
fn equality_allows_any_operands() {
    assert_eq!(run("print(nil == nil);"), "true\n");
    assert_eq!(run("print(1 == \"1\");"), "false\n");
    assert_eq!(run("print(\"a\" == \"a\");"), "true\n");
    assert_eq!(run("print(1 != 2);"), "true\n");
    assert_eq!(run("print(true == 1);"), "false\n");
}

#[test]
fn logical_operators_short_circuit_and_return_operands() {
    assert_eq!(run("print(nil or \"fallback\");"), "fallback\n");
    assert_eq!(run("print(1 or 2);"), "1\n");
    assert_eq!(run("print(false and 2);"), "false\n");
    assert_eq!(run("print(1 and 2);"), "2\n");
}

#[test]
fn short_circuit_skips_the_right_operand() {
    // boom() would raise; short-circuiting must not reach it.
    assert_eq!(
        run("fun boom() { return missing_global; } print(true or boom());"),
        "true\n"
    );
    assert_eq!(
        run("fun boom() { return missing_global; } print(false and boom());"),
        "false\n"
    );
}

#[test]
fn conditional_evaluates_only_the_selected_branch() {
    assert_eq!(run("print(true ? 1 : missing_global);"), "1\n");
    assert_eq!(run("print(false ? missing_global : 2);"), "2\n");
}

#[test]
fn conditional_selects_by_truthiness() {
    assert_eq!(run("print(0 ? \"yes\" : \"no\");"), "yes\n");
    assert_eq!(run("print(nil ? \"yes\" : \"no\");"), "no\n");
}

#[test]
fn comma_operator_returns_the_right_operand() {
    assert_eq!(run("print((1, 2, 3));"), "3\n");
}

#[test]
fn if_else_branches() {
    assert_eq!(run("if (1 < 2) print(\"then\"); else print(\"else\");"), "then\n");
    assert_eq!(run("if (1 > 2) print(\"then\"); else print(\"else\");"), "else\n");
}

#[test]
fn while_loop_counts() {
    assert_eq!(run("var i = 0; while (i < 3) { print(i); i = i + 1; }"), "0\n1\n2\n");
}

#[test]
fn for_loop_desugars_to_while() {
    assert_eq!(run("for (var i = 0; i < 3; i = i + 1) print(i);"), "0\n1\n2\n");
}

#[test]
fn for_loop_clauses_are_optional() {
    assert_eq!(
        run("var i = 0; for (;;) { if (i == 2) break; print(i); i = i + 1; }"),
        "0\n1\n"
    );
}

#[test]
fn break_exits_the_innermost_loop_only() {
    let source = "
        var total = 0;
        var i = 0;
        while (i < 3) {
            var j = 0;
            while (true) {
                if (j >= 2) break;
                j = j + 1;
                total = total + 1;
            }
            i = i + 1;
        }
        print(total);
    ";
    assert_eq!(run(source), "6\n");
}

#[test]
fn assignment_is_an_expression_yielding_the_value() {
    assert_eq!(run("var a = 1; print(a = 5);"), "5\n");
}

#[test]
fn assignment_to_undeclared_global_is_an_error() {
    let message = runtime_message("missing = 1;");
    assert!(message.contains("Undefined variable 'missing'."), "unexpected: {message}");
}

#[test]
fn reading_an_undeclared_global_is_an_error() {
    let message = runtime_message("print(missing);");
    assert!(message.contains("Undefined variable 'missing'."), "unexpected: {message}");
}

#[test]
fn uninitialized_global_read_is_an_error() {
    let message = runtime_message("var x; print(x);");
    assert!(
        message.contains("Variable must be initialized before use."),
        "unexpected message: {message}"
    );
}

#[test]
fn uninitialized_local_read_is_an_error() {
    let message = runtime_message("{ var u; print(u); }");
    assert!(
        message.contains("Variable must be initialized before use."),
        "unexpected message: {message}"
    );
}

#[test]
fn assigning_before_reading_satisfies_the_sentinel() {
    assert_eq!(run("var x; x = 9; print(x);"), "9\n");
    assert_eq!(run("{ var y; y = 1; print(y); }"), "1\n");
}

#[test]
fn calling_a_non_callable_is_an_error() {
    let message = runtime_message("\"abc\"();");
    assert!(
        message.contains("Can only call functions and classes."),
        "unexpected message: {message}"
    );
}

#[test]
fn arity_mismatch_is_an_error() {
    let message = runtime_message("fun f(a, b) { return a + b; } f(1);");
    assert!(
        message.contains("Expected 2 arguments but got 1."),
        "unexpected message: {message}"
    );
}

#[test]
fn runtime_error_reports_line_and_lexeme() {
    let message = runtime_message("var a = 1;\nprint(a + nil);");
    assert_eq!(message, "[line 2] Error at '+' : Operands must be numbers or strings.");
}

#[test]
fn block_scoping_shadows_and_restores() {
    let source = "
        var a = \"g\";
        {
            var a = \"1\";
            {
                var a = \"2\";
                print(a);
            }
            print(a);
        }
        print(a);
    ";
    assert_eq!(run(source), "2\n1\ng\n");
}

#[test]
fn nested_function_calls_evaluate_arguments_left_to_right() {
    let source = "
        var order = \"\";
        fun note(tag, value) { order = order + tag; return value; }
        fun add(a, b, c) { return a + b + c; }
        print(add(note(\"a\", 1), note(\"b\", 2), note(\"c\", 3)));
        print(order);
    ";
    assert_eq!(run(source), "6\nabc\n");
}

#[test]
fn clock_is_a_nonnegative_number() {
    // Printed output is a number; just check it parses.
    let output = run("print(clock() >= 0);");
    assert_eq!(output, "true\n");
}

use std::fs;
use std::path::Path;

use denrim::{Denrim, Diagnostic};
use denrim::stdlib;

// Scripts annotate what they expect with trailing comments:
//   print 1;          // expect: 1
//   nil();            // expect runtime error: Can only call functions and classes.
//   var = 1;          // error: at '=': Expect variable name.

const EXPECT_OUTPUT: &str = "// expect: ";
const EXPECT_RUNTIME_ERROR: &str = "// expect runtime error: ";
const EXPECT_ERROR: &str = "// error: ";


#[derive(Debug, Default)]
struct Expectations {
    output: Vec<String>,
    errors: Vec<(usize, String)>,
}

fn parse_expectations(source: &str) -> Expectations {
    let mut expect = Expectations::default();

    for (idx, line) in source.lines().enumerate() {
        let lineno = idx + 1;

        if let Some(pos) = line.find(EXPECT_OUTPUT) {
            expect.output.push(line[pos + EXPECT_OUTPUT.len()..].to_string());
        } else if let Some(pos) = line.find(EXPECT_RUNTIME_ERROR) {
            expect.errors.push((lineno, line[pos + EXPECT_RUNTIME_ERROR.len()..].to_string()));
        } else if let Some(pos) = line.find(EXPECT_ERROR) {
            expect.errors.push((lineno, line[pos + EXPECT_ERROR.len()..].to_string()));
        }
    }

    expect
}

fn run_test_script(path: &Path) {
    let source = fs::read_to_string(path)
        .unwrap_or_else(|error| panic!("could not read {}: {}", path.display(), error));

    let expect = parse_expectations(&source);

    let mut engine = Denrim::new();
    stdlib::install_prelude(engine.vm_mut());
    engine.capture_output();

    let diagnostics = engine.execute(&source);
    let output = engine.take_output();

    let errors = diagnostics.errors()
        .map(|Diagnostic { line, message, .. }| (*line, message.clone()))
        .collect::<Vec<_>>();

    assert_eq!(errors, expect.errors, "unexpected errors in {}", path.display());

    let output = output.lines().collect::<Vec<_>>();
    assert_eq!(output, expect.output, "unexpected output from {}", path.display());
}

macro_rules! test_script {
    ( $name:tt, $path:expr ) => {
        #[test]
        fn $name() {
            run_test_script(Path::new($path))
        }
    };
}


test_script!(empty_file, "tests/scripts/empty_file.dnr");
test_script!(precedence, "tests/scripts/precedence.dnr");
test_script!(print_values, "tests/scripts/print_values.dnr");

mod arithmetic_tests {
    use super::*;

    test_script!(numbers, "tests/scripts/arithmetic/numbers.dnr");
    test_script!(strings, "tests/scripts/arithmetic/strings.dnr");
    test_script!(integers, "tests/scripts/arithmetic/integers.dnr");
    test_script!(vectors, "tests/scripts/arithmetic/vectors.dnr");
    test_script!(mismatched_types, "tests/scripts/arithmetic/mismatched_types.dnr");
    test_script!(subtract_strings, "tests/scripts/arithmetic/subtract_strings.dnr");
    test_script!(negate_string, "tests/scripts/arithmetic/negate_string.dnr");
    test_script!(integer_overflow, "tests/scripts/arithmetic/integer_overflow.dnr");
    test_script!(comparison, "tests/scripts/arithmetic/comparison.dnr");
    test_script!(equality, "tests/scripts/arithmetic/equality.dnr");
}

mod variable_tests {
    use super::*;

    test_script!(shadowing, "tests/scripts/variable/shadowing.dnr");
    test_script!(local_and_global, "tests/scripts/variable/local_and_global.dnr");
    test_script!(local_does_not_touch_global, "tests/scripts/variable/local_does_not_touch_global.dnr");
    test_script!(undefined_global, "tests/scripts/variable/undefined_global.dnr");
    test_script!(assign_undefined, "tests/scripts/variable/assign_undefined.dnr");
    test_script!(redeclare_local, "tests/scripts/variable/redeclare_local.dnr");
    test_script!(own_initializer, "tests/scripts/variable/own_initializer.dnr");
    test_script!(redefine_global, "tests/scripts/variable/redefine_global.dnr");
}

mod if_tests {
    use super::*;

    test_script!(else_, "tests/scripts/if/else.dnr");
    test_script!(truth, "tests/scripts/if/truth.dnr");
}

mod logical_tests {
    use super::*;

    test_script!(and_or, "tests/scripts/logical/and_or.dnr");
}

mod loop_tests {
    use super::*;

    test_script!(while_, "tests/scripts/loop/while.dnr");
    test_script!(for_, "tests/scripts/loop/for.dnr");
    test_script!(for_scope, "tests/scripts/loop/for_scope.dnr");
}

mod function_tests {
    use super::*;

    test_script!(recursion, "tests/scripts/function/recursion.dnr");
    test_script!(arity, "tests/scripts/function/arity.dnr");
    test_script!(too_many_args, "tests/scripts/function/too_many_args.dnr");
    test_script!(return_nil, "tests/scripts/function/return_nil.dnr");
    test_script!(stack_overflow, "tests/scripts/function/stack_overflow.dnr");
    test_script!(not_callable, "tests/scripts/function/not_callable.dnr");
    test_script!(top_level_return, "tests/scripts/function/top_level_return.dnr");
    test_script!(runtime_error_line, "tests/scripts/function/runtime_error_line.dnr");
}

mod class_tests {
    use super::*;

    test_script!(fields_and_methods, "tests/scripts/class/fields_and_methods.dnr");
    test_script!(initializer, "tests/scripts/class/initializer.dnr");
    test_script!(bound_method, "tests/scripts/class/bound_method.dnr");
    test_script!(no_init_arity, "tests/scripts/class/no_init_arity.dnr");
    test_script!(undefined_property, "tests/scripts/class/undefined_property.dnr");
    test_script!(property_on_number, "tests/scripts/class/property_on_number.dnr");
    test_script!(field_on_string, "tests/scripts/class/field_on_string.dnr");
    test_script!(this_outside_class, "tests/scripts/class/this_outside_class.dnr");
    test_script!(this_in_nested_function, "tests/scripts/class/this_in_nested_function.dnr");
    test_script!(return_from_init, "tests/scripts/class/return_from_init.dnr");
    test_script!(super_without_superclass, "tests/scripts/class/super_without_superclass.dnr");
}

mod error_tests {
    use super::*;

    test_script!(two_syntax_errors, "tests/scripts/errors/two_syntax_errors.dnr");
    test_script!(lexer_errors, "tests/scripts/errors/lexer_errors.dnr");
    test_script!(invalid_assignment, "tests/scripts/errors/invalid_assignment.dnr");
    test_script!(missing_semicolon_at_end, "tests/scripts/errors/missing_semicolon_at_end.dnr");
}

mod prelude_tests {
    use super::*;

    test_script!(vectors, "tests/scripts/prelude/vectors.dnr");
    test_script!(clock, "tests/scripts/prelude/clock.dnr");
}

use crate::{
    lexer, parser,
    transpiler::{Transpiler, TranspilerOptions},
    util::fmt::tree,
    Error,
};

pub const TEST_PATH: &str = "test.nc";

/// Each variant contains the input.
pub enum Test {
    ParserProgram(&'static str),
    TranspilerProgram(&'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    OutputOk(&'static str),
    ExpectedErrors(&'static [&'static str]),
}

/// Runs the given stage, returning its formatted result (a tree or C source
/// text, empty on failure) and the formatted errors.
#[track_caller]
pub fn run_pipeline(test: Test) -> (String, Vec<String>) {
    let result = match test {
        Test::ParserProgram(input) => lexer::lex(input, TEST_PATH)
            .map_err(Error::from)
            .and_then(|tokens| parser::parse(&tokens).map_err(Error::from))
            .map(|root| tree::print_tree_string(&root)),
        Test::TranspilerProgram(input) => lexer::lex(input, TEST_PATH)
            .map_err(Error::from)
            .and_then(|tokens| parser::parse(&tokens).map_err(Error::from))
            .and_then(|root| Transpiler::new(TranspilerOptions::default()).compile(&root)),
    };
    match result {
        Ok(formatted) => (formatted, vec![]),
        Err(error) => (String::new(), vec![error.to_string()]),
    }
}

#[track_caller]
pub fn run_assertion(assertion: Assertion, formatted_actual: &str, actual_errors: &[String]) {
    match assertion {
        Assertion::TreeOk(expected) | Assertion::OutputOk(expected) => {
            let expected_errors: &[&str] = &[];
            ::pretty_assertions::assert_eq!(actual_errors, expected_errors);
            ::pretty_assertions::assert_eq!(formatted_actual.trim(), expected.trim());
        }
        Assertion::ExpectedErrors(expected_errors) => {
            ::pretty_assertions::assert_eq!(actual_errors, expected_errors);
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let $source_kind:ident = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind, $source_kind), $source);
                let (formatted_actual, formatted_actual_errors) =
                    crate::util::test_utils::run_pipeline(test);
                let ctx = (&formatted_actual, &formatted_actual_errors);
                tree_tests!(@@expand_assertions, ctx, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $ctx:expr, []) => {};
    (@@expand_assertions, $ctx:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $ctx.0,
            $ctx.1,
        );
        tree_tests!(@@expand_assertions, $ctx, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, output_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::OutputOk(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_errors, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedErrors($expected)
    };

    (@@get_test(parser, program), $source:expr) => {
        crate::util::test_utils::Test::ParserProgram($source)
    };
    (@@get_test(transpiler, program), $source:expr) => {
        crate::util::test_utils::Test::TranspilerProgram($source)
    };
}
pub(crate) use tree_tests;

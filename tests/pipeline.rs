use indoc::indoc;
use ncc::{
    lexer::lex,
    parser::{self, parse},
    token::TokenKind,
    types::{Mutability, Type, TypeError},
    Error,
};
use pretty_assertions::assert_eq;

#[test]
fn compiles_program() {
    let src = indoc! {"
        fn main() i32 {
            var x i32 = 1 + 2 * 3;
            {
                var y i32 = 4;
            }
        }

        fn other() i32 {}
    "};
    let expected = indoc! {"
        int main() {
            const int x = 1 + 2 * 3;
            const int y = 4;
        }
        int other() {
        }
    "};
    assert_eq!(ncc::compile(src, "main.nc").unwrap(), expected);
}

#[test]
fn compile_to_matches_compile() {
    let src = "fn main() i32 { var x i32 = 10 * 10; }";
    let out = ncc::compile_to(src, "main.nc", Vec::new()).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        ncc::compile(src, "main.nc").unwrap()
    );
}

#[test]
fn whitespace_only_input() {
    let tokens = lex(" \r\n\t \n", "empty.nc").unwrap();
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is(TokenKind::Eof));

    let root = parse(&tokens).unwrap();
    assert!(root.statements.is_empty());
    assert_eq!(ncc::compile(" \r\n\t \n", "empty.nc").unwrap(), "");
}

#[test]
fn unknown_type_is_reported_at_its_position() {
    let error = ncc::compile("fn f() bool { }", "f.nc").unwrap_err();
    let Error::Parse(error) = &error else {
        panic!("expected a parse error, got {error:?}");
    };
    assert_eq!(error.inner, parser::Error::ExpectedType);
    assert_eq!(error.span.substr(), "bool");
    assert_eq!(error.to_string(), "f.nc:1:8: expected a type");
}

#[test]
fn lex_errors_stop_the_pipeline() {
    let error = ncc::compile("fn main() i32 {\n  var x i32 = 1 - 2;\n}", "m.nc").unwrap_err();
    assert!(matches!(error, Error::Lex(_)));
    assert_eq!(
        error.to_string(),
        "syntax error at m.nc:2:17: unexpected character '-'"
    );
}

#[test]
fn invalid_byte_size_is_rejected_before_rendering() {
    let error = Type::int(true, 3, Mutability::ReadOnly).unwrap_err();
    assert_eq!(error, TypeError::NotPowerOfTwo { byte_size: 3 });
    assert_eq!(error.to_string(), "byte_size is not a power of 2");
}

#[test]
fn function_and_statement_counts() {
    for functions in 0..5 {
        for statements in 0..5 {
            let body: String = (0..statements)
                .map(|i| format!("var v{i} i32 = {i} + 1;"))
                .collect();
            let src: String = (0..functions)
                .map(|i| format!("fn f{i}() i32 {{ {body} }}\n"))
                .collect();

            let tokens = lex(&src, "gen.nc").unwrap();
            let root = parse(&tokens).unwrap();
            assert_eq!(root.statements.len(), functions);
            for func in &root.statements {
                let ncc::ast::Node::FuncDef(func) = func else {
                    panic!("expected a function");
                };
                assert_eq!(func.body.statements.len(), statements);
            }
        }
    }
}

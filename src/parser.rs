use std::borrow::Cow;

use tracing::debug;

use crate::{
    ast::{
        BinaryNode, BinaryOperator, FuncDefNode, LiteralNode, Node, ScopeKind, ScopeNode,
        VarDefNode,
    },
    token::{Keyword, Pos, Source, Spanned, Token, TokenKind, TokenValue},
    types::Type,
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Binary operators, from the lowest to the highest precedence.
const BINARY_PRECEDENCE: &[&[TokenKind]] = &[&[TokenKind::Plus], &[TokenKind::Star]];

/// Parses a full program, returning its global scope.
pub fn parse(tokens: &[Token]) -> Result<ScopeNode> {
    let root = Parser::new(tokens).parse_program()?;
    debug!(functions = root.statements.len(), "parsed program");
    Ok(root)
}

struct Parser<'tok> {
    /// Always ends with an end-of-input token.
    tokens: Cow<'tok, [Token]>,
    cursor: usize,
}

impl Parser<'_> {
    fn parse_program(&mut self) -> Result<ScopeNode> {
        let mut functions = Vec::with_capacity(4);
        while self.peek().is_keyword(Keyword::Fn) {
            functions.push(self.parse_function()?);
        }

        let eof = self.peek();
        if !eof.is_eof() {
            return Err(eof.span().wrap(Error::UnexpectedToken));
        }

        let (start, end) = match (functions.first(), functions.last()) {
            (Some(first), Some(last)) => (first.start().clone(), last.end().clone()),
            _ => (eof.start.clone(), eof.end.clone()),
        };
        Ok(ScopeNode {
            kind: ScopeKind::Global,
            statements: functions,
            start,
            end,
        })
    }

    fn parse_function(&mut self) -> Result<Node> {
        let start = self.advance().start.clone(); // fn
        let name = self.parse_ident()?;
        self.consume(TokenKind::LParen)?;
        self.consume(TokenKind::RParen)?;
        let return_ty = self.parse_type()?;
        let body = self.parse_block()?;
        Ok(Node::FuncDef(FuncDefNode {
            name,
            return_ty,
            start,
            end: body.end.clone(),
            body,
        }))
    }

    fn parse_block(&mut self) -> Result<ScopeNode> {
        let start = self.consume(TokenKind::LBrace)?.start.clone();
        let mut statements = Vec::new();
        while !self.is(TokenKind::RBrace) && !self.is(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        let end = self.consume(TokenKind::RBrace)?.end.clone();
        Ok(ScopeNode {
            kind: ScopeKind::Block,
            statements,
            start,
            end,
        })
    }

    fn parse_statement(&mut self) -> Result<Node> {
        let c = self.peek();
        if c.is(TokenKind::LBrace) {
            self.parse_block().map(Node::Scope)
        } else if c.is_keyword(Keyword::Var) {
            self.parse_var_def()
        } else {
            Err(c.span().wrap(Error::ExpectedStatement))
        }
    }

    fn parse_var_def(&mut self) -> Result<Node> {
        let start = self.advance().start.clone(); // var
        let name = self.parse_ident()?;
        let ty = self.parse_type()?;
        self.consume(TokenKind::Equals)?;
        let value = self.parse_expr()?;
        let end = self.consume(TokenKind::Semicolon)?.end.clone();
        Ok(Node::VarDef(VarDefNode {
            name,
            ty,
            value: Box::new(value),
            start,
            end,
        }))
    }

    fn parse_type(&mut self) -> Result<Type> {
        let c = self.peek();
        if !c.is_keyword(Keyword::I32) {
            return Err(c.span().wrap(Error::ExpectedType));
        }
        self.advance();
        Ok(Type::I32)
    }

    fn parse_ident(&mut self) -> Result<Box<str>> {
        let c = self.peek();
        let (TokenKind::Identifier, Some(TokenValue::Ident(name))) = (c.kind, &c.value) else {
            return Err(c.span().wrap(Error::ExpectedIdent));
        };
        let name = name.clone();
        self.advance();
        Ok(name)
    }

    fn parse_expr(&mut self) -> Result<Node> {
        self.parse_binary(BINARY_PRECEDENCE)
    }

    /// Parses a left-associative chain of the operators in `levels[0]`, whose
    /// operands are parsed with the remaining (tighter binding) levels.
    fn parse_binary(&mut self, levels: &[&[TokenKind]]) -> Result<Node> {
        let Some((operators, tighter)) = levels.split_first() else {
            return self.parse_value();
        };

        let mut lhs = self.parse_binary(tighter)?;
        while operators.contains(&self.peek().kind) {
            let op = match self.advance().kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Star => BinaryOperator::Mul,
                _ => unreachable!("not a binary operator"),
            };
            let rhs = self.parse_binary(tighter)?;
            lhs = Node::Binary(BinaryNode {
                op,
                start: lhs.start().clone(),
                end: rhs.end().clone(),
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    fn parse_value(&mut self) -> Result<Node> {
        let c = self.peek();
        let (TokenKind::Int, Some(TokenValue::Int(value))) = (c.kind, &c.value) else {
            return Err(c.span().wrap(Error::ExpectedValue));
        };
        let literal = LiteralNode {
            value: *value,
            start: c.start.clone(),
            end: c.end.clone(),
        };
        self.advance();
        Ok(Node::Literal(literal))
    }
}

impl<'tok> Parser<'tok> {
    /// Creates a new parser. If the tokens don't end with an end-of-input
    /// token, one is appended right after the last token.
    fn new(tokens: &'tok [Token]) -> Parser<'tok> {
        let tokens = match tokens.last() {
            Some(last) if last.is_eof() => Cow::Borrowed(tokens),
            last => {
                let pos = match last {
                    Some(last) => last.end.clone(),
                    None => Pos::new(Source::new("", "")),
                };
                let mut owned = Vec::with_capacity(tokens.len() + 1);
                owned.extend_from_slice(tokens);
                owned.push(Token::new(TokenKind::Eof, None, pos.to_empty_span()));
                Cow::Owned(owned)
            }
        };
        Parser { tokens, cursor: 0 }
    }

    /// Returns the current token. Past the end, this is the end-of-input
    /// token.
    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.cursor.min(last)]
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> &Token {
        self.cursor += 1;
        let last = self.tokens.len() - 1;
        &self.tokens[(self.cursor - 1).min(last)]
    }

    /// Checks whether the current token matches the given kind.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().is(expect)
    }

    /// Advances if the current token matches the provided kind, returning it.
    /// If not, returns an error.
    fn consume(&mut self, expect: TokenKind) -> Result<&Token> {
        let c = self.peek();
        if c.is(expect) {
            Ok(self.advance())
        } else {
            Err(c.span().wrap(Error::Expected(expect)))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("expected an identifier")]
    ExpectedIdent,
    #[error("expected {0}")]
    Expected(TokenKind),
    #[error("expected a type")]
    ExpectedType,
    #[error("expected a value")]
    ExpectedValue,
    #[error("expected a statement")]
    ExpectedStatement,
    #[error("unexpected token")]
    UnexpectedToken,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::lex, util::test_utils::tree_tests};

    tree_tests!(
        use parser;

        fn test_empty_program() {
            let program = " \n\t ";
            let tree_ok = r#"
                ScopeNode - GlobalScope
                    statements: []
            "#;
        }

        fn test_precedence() {
            let program = "fn main() i32 { var x i32 = 1 + 2 * 3 + 4; }";
            let tree_ok = r#"
                ScopeNode - GlobalScope
                    statements: [
                        FuncDefNode - FuncDef
                            name: "main"
                            return_ty: i32
                            body: ScopeNode - Scope
                                statements: [
                                    VarDefNode - VarDef
                                        name: "x"
                                        ty: i32
                                        value: BinaryNode - BinAdd
                                            lhs: BinaryNode - BinAdd
                                                lhs: LiteralNode - IntLit
                                                    value: 1
                                                rhs: BinaryNode - BinMul
                                                    lhs: LiteralNode - IntLit
                                                        value: 2
                                                    rhs: LiteralNode - IntLit
                                                        value: 3
                                            rhs: LiteralNode - IntLit
                                                value: 4
                                ]
                    ]
            "#;
        }

        fn test_nested_blocks_and_functions() {
            let program = "fn a() i32 { { var y i32 = 2; } } fn b() i32 {}";
            let tree_ok = r#"
                ScopeNode - GlobalScope
                    statements: [
                        FuncDefNode - FuncDef
                            name: "a"
                            return_ty: i32
                            body: ScopeNode - Scope
                                statements: [
                                    ScopeNode - Scope
                                        statements: [
                                            VarDefNode - VarDef
                                                name: "y"
                                                ty: i32
                                                value: LiteralNode - IntLit
                                                    value: 2
                                        ]
                                ]
                        FuncDefNode - FuncDef
                            name: "b"
                            return_ty: i32
                            body: ScopeNode - Scope
                                statements: []
                    ]
            "#;
        }

        fn test_unknown_type() {
            let program = "fn f() bool { }";
            let expected_errors = &["syntax error at test.nc:1:8: expected a type"];
        }

        fn test_missing_name() {
            let program = "fn () i32 {}";
            let expected_errors = &["syntax error at test.nc:1:4: expected an identifier"];
        }

        fn test_missing_paren() {
            let program = "fn main( i32 {}";
            let expected_errors = &["syntax error at test.nc:1:10: expected ')'"];
        }

        fn test_unclosed_block() {
            let program = "fn main() i32 {";
            let expected_errors = &["syntax error at test.nc:1:16: expected '}'"];
        }

        fn test_expression_statement() {
            let program = "fn main() i32 { 1; }";
            let expected_errors = &["syntax error at test.nc:1:17: expected a statement"];
        }

        fn test_missing_value() {
            let program = "fn main() i32 { var x i32 = ; }";
            let expected_errors = &["syntax error at test.nc:1:29: expected a value"];
        }

        fn test_missing_semicolon() {
            let program = "fn main() i32 { var x i32 = 1 }";
            let expected_errors = &["syntax error at test.nc:1:31: expected ';'"];
        }

        fn test_trailing_token() {
            let program = "fn main() i32 {} }";
            let expected_errors = &["syntax error at test.nc:1:18: unexpected token"];
        }

        fn test_missing_open_paren() {
            let program = "fn main ) i32 {}";
            let expected_errors = &["syntax error at test.nc:1:9: expected '('"];
        }

        fn test_missing_body() {
            let program = "fn main() i32 var";
            let expected_errors = &["syntax error at test.nc:1:15: expected '{'"];
        }

        fn test_missing_equals() {
            let program = "fn main() i32 { var x i32 1; }";
            let expected_errors = &["syntax error at test.nc:1:27: expected '='"];
        }

        fn test_top_level_statement() {
            let program = "var x i32 = 1;";
            let expected_errors = &["syntax error at test.nc:1:1: unexpected token"];
        }
    );

    #[test]
    fn root_span_covers_functions() {
        let tokens = lex("\n  fn a() i32 {}\n fn b() i32 { }  \n", "t.nc").unwrap();
        let root = parse(&tokens).unwrap();
        assert_eq!(root.statements.len(), 2);
        assert_eq!(root.span().substr(), "fn a() i32 {}\n fn b() i32 { }");
        assert_eq!(root.start.to_string(), "t.nc:2:3");
    }

    #[test]
    fn empty_root_span_is_eof() {
        let tokens = lex("  \n ", "t.nc").unwrap();
        let root = parse(&tokens).unwrap();
        assert!(root.statements.is_empty());
        assert_eq!(root.start, tokens[0].start);
        assert_eq!(root.end, tokens[0].end);
    }

    #[test]
    fn missing_eof_is_synthesized() {
        let tokens = lex("fn main() i32 {}", "t.nc").unwrap();
        let without_eof = &tokens[..tokens.len() - 1];
        let root = parse(without_eof).unwrap();
        assert_eq!(root.statements.len(), 1);

        let error = parse(&without_eof[..without_eof.len() - 1]).unwrap_err();
        assert_eq!(error.inner, Error::Expected(TokenKind::RBrace));
        assert_eq!(error.span.start.index, 15);
    }

    #[test]
    fn no_tokens_is_an_empty_program() {
        let root = parse(&[]).unwrap();
        assert_eq!(root.kind, ScopeKind::Global);
        assert!(root.statements.is_empty());
    }

    #[test]
    fn var_def_span() {
        let tokens = lex("fn main() i32 { var x i32 = 1 * 2; }", "t.nc").unwrap();
        let root = parse(&tokens).unwrap();
        let func = &root.statements[0];
        assert_eq!(func.span().substr(), "fn main() i32 { var x i32 = 1 * 2; }");
        let Node::FuncDef(func) = func else {
            panic!("expected a function");
        };
        let var = &func.body.statements[0];
        assert_eq!(var.span().substr(), "var x i32 = 1 * 2;");
        let Node::VarDef(var) = var else {
            panic!("expected a variable definition");
        };
        assert_eq!(var.value.span().substr(), "1 * 2");
    }
}

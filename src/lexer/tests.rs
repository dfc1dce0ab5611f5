#![cfg(test)]

use crate::lexer::{Lexer, Token, TokenType};


fn collect_kinds(source: &str) -> Vec<TokenType> {
    Lexer::new(source).map(|token| token.kind).collect()
}

#[test]
fn lexer_matches_punctuation_and_operators() {
    let kinds = collect_kinds("( ) { } , . - + ; / * ! != = == > >= < <=");

    assert_eq!(kinds, vec![
        TokenType::OpenParen, TokenType::CloseParen,
        TokenType::OpenBrace, TokenType::CloseBrace,
        TokenType::Comma, TokenType::OpAccess,
        TokenType::OpSub, TokenType::OpAdd,
        TokenType::Semicolon, TokenType::OpDiv, TokenType::OpMul,
        TokenType::OpNot, TokenType::OpNE,
        TokenType::OpAssign, TokenType::OpEQ,
        TokenType::OpGT, TokenType::OpGE,
        TokenType::OpLT, TokenType::OpLE,
        TokenType::EOF,
    ]);
}

#[test]
fn lexer_two_char_operators_need_no_whitespace() {
    let kinds = collect_kinds("a>=b!=!c");

    assert_eq!(kinds, vec![
        TokenType::Identifier, TokenType::OpGE, TokenType::Identifier,
        TokenType::OpNE, TokenType::OpNot, TokenType::Identifier,
        TokenType::EOF,
    ]);
}

#[test]
fn lexer_matches_keywords_and_identifiers() {
    let mut lexer = Lexer::new("class classy fn fnord this _this print2 while");

    let expected = [
        (TokenType::Class, "class"),
        (TokenType::Identifier, "classy"),
        (TokenType::Fun, "fn"),
        (TokenType::Identifier, "fnord"),
        (TokenType::This, "this"),
        (TokenType::Identifier, "_this"),
        (TokenType::Identifier, "print2"),
        (TokenType::While, "while"),
    ];

    for (kind, lexeme) in expected.iter() {
        let out = lexer.next_token();
        assert!(out.kind == *kind && out.lexeme == *lexeme, "unexpected output: {:?}", out);
    }
    assert!(lexer.next_token().is_eof());
}

#[test]
fn lexer_reads_number_literals() {
    let mut lexer = Lexer::new("123 4.5 6. .7");

    let out = lexer.next_token();
    assert!(matches!(out, Token { kind: TokenType::NumberLiteral, lexeme: "123", line: 1 }), "unexpected output: {:?}", out);

    let out = lexer.next_token();
    assert!(matches!(out, Token { kind: TokenType::NumberLiteral, lexeme: "4.5", line: 1 }), "unexpected output: {:?}", out);

    // a trailing dot is not part of the number
    let out = lexer.next_token();
    assert!(matches!(out, Token { kind: TokenType::NumberLiteral, lexeme: "6", .. }), "unexpected output: {:?}", out);
    let out = lexer.next_token();
    assert!(matches!(out, Token { kind: TokenType::OpAccess, .. }), "unexpected output: {:?}", out);

    // neither is a leading one
    let out = lexer.next_token();
    assert!(matches!(out, Token { kind: TokenType::OpAccess, .. }), "unexpected output: {:?}", out);
    let out = lexer.next_token();
    assert!(matches!(out, Token { kind: TokenType::NumberLiteral, lexeme: "7", .. }), "unexpected output: {:?}", out);
}

#[test]
fn lexer_reads_string_literals_with_quotes() {
    let mut lexer = Lexer::new("\"hello world\" \"\"");

    let out = lexer.next_token();
    assert!(matches!(out, Token { kind: TokenType::StringLiteral, lexeme: "\"hello world\"", .. }), "unexpected output: {:?}", out);

    let out = lexer.next_token();
    assert!(matches!(out, Token { kind: TokenType::StringLiteral, lexeme: "\"\"", .. }), "unexpected output: {:?}", out);
}

#[test]
fn lexer_strings_do_not_process_escapes() {
    let mut lexer = Lexer::new(r#""a\nb""#);

    let out = lexer.next_token();
    assert_eq!(out.kind, TokenType::StringLiteral);
    assert_eq!(out.lexeme, r#""a\nb""#);
}

#[test]
fn lexer_unterminated_string_is_error_token() {
    let mut lexer = Lexer::new("print \"oops");

    assert_eq!(lexer.next_token().kind, TokenType::Print);

    let out = lexer.next_token();
    assert!(matches!(out, Token { kind: TokenType::Error, lexeme: "Unterminated string.", .. }), "unexpected output: {:?}", out);

    assert!(lexer.next_token().is_eof());
}

#[test]
fn lexer_unexpected_character_is_error_token() {
    let mut lexer = Lexer::new("a @ b");

    assert_eq!(lexer.next_token().kind, TokenType::Identifier);

    let out = lexer.next_token();
    assert!(matches!(out, Token { kind: TokenType::Error, lexeme: "Unexpected character.", .. }), "unexpected output: {:?}", out);

    // scanning continues after the bad char
    let out = lexer.next_token();
    assert!(matches!(out, Token { kind: TokenType::Identifier, lexeme: "b", .. }), "unexpected output: {:?}", out);
}

#[test]
fn lexer_skips_non_ascii_chars_whole() {
    let mut lexer = Lexer::new("é x \"ü\"");

    assert_eq!(lexer.next_token().kind, TokenType::Error);
    assert_eq!(lexer.next_token().lexeme, "x");
    assert_eq!(lexer.next_token().lexeme, "\"ü\"");
}

#[test]
fn lexer_skips_comments() {
    let kinds = collect_kinds("var x; // a comment ( { \nprint x; // trailing");

    assert_eq!(kinds, vec![
        TokenType::Var, TokenType::Identifier, TokenType::Semicolon,
        TokenType::Print, TokenType::Identifier, TokenType::Semicolon,
        TokenType::EOF,
    ]);
}

#[test]
fn lexer_tracks_line_numbers() {
    let mut lexer = Lexer::new(" \nfoo \n\n  bar // x\n\"a\nb\" baz");

    let out = lexer.next_token();
    assert!(matches!(out, Token { lexeme: "foo", line: 2, .. }), "unexpected output: {:?}", out);

    let out = lexer.next_token();
    assert!(matches!(out, Token { lexeme: "bar", line: 4, .. }), "unexpected output: {:?}", out);

    // multi-line strings count their newlines
    let out = lexer.next_token();
    assert!(matches!(out, Token { kind: TokenType::StringLiteral, line: 6, .. }), "unexpected output: {:?}", out);

    let out = lexer.next_token();
    assert!(matches!(out, Token { lexeme: "baz", line: 6, .. }), "unexpected output: {:?}", out);
}

#[test]
fn lexer_eof_is_repeatable() {
    let mut lexer = Lexer::new("x");

    assert_eq!(lexer.next_token().kind, TokenType::Identifier);
    for _ in 0..3 {
        let out = lexer.next_token();
        assert!(matches!(out, Token { kind: TokenType::EOF, lexeme: "", line: 1 }), "unexpected output: {:?}", out);
    }
}

#[test]
fn lexer_iterator_stops_after_eof() {
    let tokens = Lexer::new("").collect::<Vec<Token>>();
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_eof());
}

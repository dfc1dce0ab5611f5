mod token;
mod tests;

pub use token::*;

use crate::language;


// Lexer

// scanning works on byte offsets into the source text so that lexemes can be
// handed out as slices, but advances a whole char at a time to keep every
// offset on a char boundary.

#[derive(Debug, Clone)]
pub struct Lexer<'s> {
    source: &'s str,
    start: usize,    // start of the token being scanned
    current: usize,  // one ahead of current char
    line: usize,
    done: bool,      // set once the iterator has produced EOF
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Token<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = self.next_token();
        if token.is_eof() {
            self.done = true;
        }
        Some(token)
    }
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Lexer {
            source,
            start: 0,
            current: 0,
            line: 1,
            done: false,
        }
    }

    /// Produce the next token. Errors are reported as tokens of type `TokenType::Error`
    /// whose lexeme is the error message. After the end of input this keeps returning EOF.
    pub fn next_token(&mut self) -> Token<'s> {
        self.skip_whitespace();

        // starting a new token
        self.start = self.current;

        let next = match self.advance() {
            Some(ch) => ch,
            None => return self.make_token(TokenType::EOF),
        };

        if is_alpha(next) {
            return self.identifier();
        }
        if next.is_ascii_digit() {
            return self.number();
        }

        let kind = match next {
            '(' => TokenType::OpenParen,
            ')' => TokenType::CloseParen,
            '{' => TokenType::OpenBrace,
            '}' => TokenType::CloseBrace,
            ',' => TokenType::Comma,
            ';' => TokenType::Semicolon,
            '.' => TokenType::OpAccess,
            '-' => TokenType::OpSub,
            '+' => TokenType::OpAdd,
            '/' => TokenType::OpDiv,
            '*' => TokenType::OpMul,

            '!' => if self.match_char('=') { TokenType::OpNE } else { TokenType::OpNot },
            '=' => if self.match_char('=') { TokenType::OpEQ } else { TokenType::OpAssign },
            '<' => if self.match_char('=') { TokenType::OpLE } else { TokenType::OpLT },
            '>' => if self.match_char('=') { TokenType::OpGE } else { TokenType::OpGT },

            '"' => return self.string(),

            _ => return self.error_token("Unexpected character."),
        };

        self.make_token(kind)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.current..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let next = self.peek();
        if let Some(ch) = next {
            self.current += ch.len_utf8();
        }
        next
    }

    fn match_char(&mut self, expected: char) -> bool {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.current += ch.len_utf8();
                true
            },
            _ => false,
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\r') | Some('\t') => { self.advance(); },

                Some('\n') => {
                    self.line += 1;
                    self.advance();
                },

                Some('/') if self.source[self.current..].starts_with(language::COMMENT_START) => {
                    // a comment goes until the end of the line
                    while !matches!(self.peek(), Some('\n') | None) {
                        self.advance();
                    }
                },

                _ => break,
            }
        }
    }

    fn string(&mut self) -> Token<'s> {
        loop {
            match self.peek() {
                None => return self.error_token("Unterminated string."),
                Some('"') => break,
                Some('\n') => self.line += 1,
                _ => { },
            }
            self.advance();
        }

        // the closing quote
        self.advance();
        self.make_token(TokenType::StringLiteral)
    }

    fn number(&mut self) -> Token<'s> {
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.advance();
        }

        // look for a fractional part
        if self.peek() == Some('.') && matches!(self.peek_next(), Some(ch) if ch.is_ascii_digit()) {
            self.advance();  // consume the "."

            while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
                self.advance();
            }
        }

        self.make_token(TokenType::NumberLiteral)
    }

    fn identifier(&mut self) -> Token<'s> {
        while matches!(self.peek(), Some(ch) if is_alpha(ch) || ch.is_ascii_digit()) {
            self.advance();
        }

        let text = &self.source[self.start..self.current];
        let kind = language::KEYWORDS.get(text).copied()
            .unwrap_or(TokenType::Identifier);

        self.make_token(kind)
    }

    fn make_token(&self, kind: TokenType) -> Token<'s> {
        Token {
            kind,
            lexeme: &self.source[self.start..self.current],
            line: self.line,
        }
    }

    fn error_token(&self, message: &'static str) -> Token<'s> {
        Token {
            kind: TokenType::Error,
            lexeme: message,
            line: self.line,
        }
    }
}

fn is_alpha(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

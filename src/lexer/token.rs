use core::fmt;

// Token Types

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Delimiters, Separators, punctuation
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Comma,
    Semicolon,

    // Operator Symbols
    OpAdd, OpSub, OpMul, OpDiv,
    OpNot, OpAssign, OpAccess,
    OpLT, OpLE, OpGT, OpGE, OpEQ, OpNE,

    // Keywords
    And, Or,
    True, False, Nil,
    Var, If, Else, While, For, Return,
    Fun, Class, This, Super,
    Print,

    // Literals
    Identifier,
    StringLiteral,
    NumberLiteral,

    // Misc
    Error,
    EOF,
}

impl TokenType {
    /// Tokens that can begin a new declaration or statement, used to resynchronize after a syntax error.
    pub fn starts_statement(&self) -> bool {
        matches!(self,
            Self::Class | Self::Fun | Self::Var | Self::For
            | Self::If | Self::While | Self::Print | Self::Return
        )
    }
}


/// Token Output
///
/// The lexeme borrows from the source text, except for error tokens which carry a diagnostic message instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'s> {
    pub kind: TokenType,
    pub lexeme: &'s str,
    pub line: usize,
}

impl<'s> Token<'s> {
    /// A token that does not come from source text, used to prime the parser before the first advance().
    pub fn synthetic(kind: TokenType, lexeme: &'s str) -> Self {
        Self { kind, lexeme, line: 0 }
    }

    pub fn is_error(&self) -> bool { self.kind == TokenType::Error }
    pub fn is_eof(&self) -> bool { self.kind == TokenType::EOF }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenType::EOF => fmt.write_str("end"),
            _ => write!(fmt, "'{}'", self.lexeme),
        }
    }
}

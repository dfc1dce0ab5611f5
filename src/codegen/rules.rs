// Pratt parser rule table

use crate::lexer::TokenType;
use crate::codegen::Compiler;


// binding power, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None,
    Assignment,  // =
    Or,          // or
    And,         // and
    Equality,    // == !=
    Comparison,  // < > <= >=
    Term,        // + -
    Factor,      // * /
    Unary,       // ! -
    Call,        // . ()
    Primary,
}

impl Precedence {
    /// The next tighter binding level, used to make binary operators left-associative.
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Assignment,
            Self::Assignment => Self::Or,
            Self::Or => Self::And,
            Self::And => Self::Equality,
            Self::Equality => Self::Comparison,
            Self::Comparison => Self::Term,
            Self::Term => Self::Factor,
            Self::Factor => Self::Unary,
            Self::Unary => Self::Call,
            Self::Call | Self::Primary => Self::Primary,
        }
    }
}


pub type ParseFn<'s> = fn(&mut Compiler<'s>, bool);

pub struct ParseRule<'s> {
    pub prefix: Option<ParseFn<'s>>,
    pub infix: Option<ParseFn<'s>>,
    pub precedence: Precedence,
}

impl<'s> ParseRule<'s> {
    fn new(prefix: Option<ParseFn<'s>>, infix: Option<ParseFn<'s>>, precedence: Precedence) -> Self {
        Self { prefix, infix, precedence }
    }
}

pub fn get_rule<'s>(kind: TokenType) -> ParseRule<'s> {
    match kind {
        TokenType::OpenParen     => ParseRule::new(Some(Compiler::grouping), Some(Compiler::call), Precedence::Call),
        TokenType::OpAccess      => ParseRule::new(None, Some(Compiler::dot), Precedence::Call),

        TokenType::OpSub         => ParseRule::new(Some(Compiler::unary), Some(Compiler::binary), Precedence::Term),
        TokenType::OpAdd         => ParseRule::new(None, Some(Compiler::binary), Precedence::Term),
        TokenType::OpDiv         => ParseRule::new(None, Some(Compiler::binary), Precedence::Factor),
        TokenType::OpMul         => ParseRule::new(None, Some(Compiler::binary), Precedence::Factor),

        TokenType::OpNot         => ParseRule::new(Some(Compiler::unary), None, Precedence::None),
        TokenType::OpNE          => ParseRule::new(None, Some(Compiler::binary), Precedence::Equality),
        TokenType::OpEQ          => ParseRule::new(None, Some(Compiler::binary), Precedence::Equality),
        TokenType::OpGT          => ParseRule::new(None, Some(Compiler::binary), Precedence::Comparison),
        TokenType::OpGE          => ParseRule::new(None, Some(Compiler::binary), Precedence::Comparison),
        TokenType::OpLT          => ParseRule::new(None, Some(Compiler::binary), Precedence::Comparison),
        TokenType::OpLE          => ParseRule::new(None, Some(Compiler::binary), Precedence::Comparison),

        TokenType::Identifier    => ParseRule::new(Some(Compiler::variable), None, Precedence::None),
        TokenType::StringLiteral => ParseRule::new(Some(Compiler::string), None, Precedence::None),
        TokenType::NumberLiteral => ParseRule::new(Some(Compiler::number), None, Precedence::None),

        TokenType::And           => ParseRule::new(None, Some(Compiler::and), Precedence::And),
        TokenType::Or            => ParseRule::new(None, Some(Compiler::or), Precedence::Or),

        TokenType::False
        | TokenType::True
        | TokenType::Nil         => ParseRule::new(Some(Compiler::literal), None, Precedence::None),

        TokenType::This          => ParseRule::new(Some(Compiler::this), None, Precedence::None),
        TokenType::Super         => ParseRule::new(Some(Compiler::super_), None, Precedence::None),

        _ => ParseRule::new(None, None, Precedence::None),
    }
}

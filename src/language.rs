use once_cell::sync::Lazy;
use crate::lexer::TokenType;
use crate::runtime::{HashMap, DefaultBuildHasher};


pub type IntType = i64;     // internal representation for host integers
pub type FloatType = f64;   // internal representation for script numbers
pub type VectorType = f32;  // component type of vector values


pub static COMMENT_START: &str = "//";

// hard limits imposed by the width of instruction operands
pub const MAX_PARAMS: usize = 255;
pub const MAX_ARGS: usize = 255;
pub const MAX_LOCALS: usize = u8::MAX as usize + 1;

pub static INIT_METHOD: &str = "init";
pub static THIS_NAME: &str = "this";


pub static KEYWORDS: Lazy<HashMap<&'static str, TokenType>> = Lazy::new(|| {
    let mut keywords = HashMap::with_hasher(DefaultBuildHasher::default());

    keywords.insert("and",     TokenType::And);
    keywords.insert("class",   TokenType::Class);
    keywords.insert("else",    TokenType::Else);
    keywords.insert("false",   TokenType::False);
    keywords.insert("fn",      TokenType::Fun);
    keywords.insert("for",     TokenType::For);
    keywords.insert("if",      TokenType::If);
    keywords.insert("nil",     TokenType::Nil);
    keywords.insert("or",      TokenType::Or);
    keywords.insert("print",   TokenType::Print);
    keywords.insert("return",  TokenType::Return);
    keywords.insert("super",   TokenType::Super);
    keywords.insert("this",    TokenType::This);
    keywords.insert("true",    TokenType::True);
    keywords.insert("var",     TokenType::Var);
    keywords.insert("while",   TokenType::While);

    keywords
});

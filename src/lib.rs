pub mod utils;

pub mod source;
pub mod lexer;

pub mod language;
pub mod codegen;
pub mod runtime;
pub mod stdlib;

pub mod diagnostics;
pub mod frontend;
pub mod debug;

mod engine;

pub use engine::Denrim;
pub use codegen::{compile, Compiler, CompileOptions, CompileOutput};
pub use runtime::{Value, VirtualMachine};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};

pub mod dasm;
pub mod traceback;

pub use dasm::{Disassembler, disassemble_all};
pub use traceback::{TraceSite, Traceback};

mod tests;

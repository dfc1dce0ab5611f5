use std::fmt;
use std::fmt::{Write, Formatter};

use crate::utils;
use crate::codegen::{Chunk, OpCode};
use crate::runtime::{Value, Function};


pub struct Disassembler<'c> {
    chunk: &'c Chunk,
    title: Option<String>,
}

impl<'c> Disassembler<'c> {
    pub fn new(chunk: &'c Chunk) -> Self {
        Self { chunk, title: None }
    }

    pub fn with_title(mut self, title: impl fmt::Display) -> Self {
        self.title.replace(title.to_string()); self
    }

    fn decode_chunk(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        let mut offset = 0;
        while offset < self.chunk.len() {
            offset = self.decode_instr(fmt, offset)?;
            writeln!(fmt)?;
        }
        Ok(())
    }

    fn decode_instr(&self, fmt: &mut Formatter<'_>, offset: usize) -> Result<usize, fmt::Error> {
        let mut line = String::new();

        write!(line, "{:04} ", offset)?;

        // source line, or a bar if unchanged from the previous instruction
        let lineno = self.chunk.line(offset);
        if offset > 0 && lineno == self.chunk.line(offset - 1) {
            line.push_str("   | ");
        } else {
            write!(line, "{: >4} ", lineno)?;
        }

        let bytes = self.chunk.bytes();
        let opcode = OpCode::from_byte(bytes[offset]);
        match opcode {
            Some(opcode @ (OpCode::LoadConst | OpCode::DefineGlobal | OpCode::StoreGlobal | OpCode::LoadGlobal
                | OpCode::Class | OpCode::LoadProperty | OpCode::StoreProperty | OpCode::Method)) => {
                let cid = bytes[offset + 1];
                write!(line, "{:16} {: >4}    ", opcode, cid)?;
                self.write_const(&mut line, self.chunk.lookup_const(cid))?;
            },

            Some(opcode @ (OpCode::LoadLocal | OpCode::StoreLocal | OpCode::Call)) => {
                write!(line, "{:16} {: >4}", opcode, bytes[offset + 1])?;
            },

            Some(opcode @ (OpCode::Jump | OpCode::JumpIfFalse)) => {
                let jump = usize::from(self.chunk.read_u16(offset + 1));
                write!(line, "{:16} {: >4} -> {:04}", opcode, jump, offset + 3 + jump)?;
            },

            Some(OpCode::Loop) => {
                let jump = usize::from(self.chunk.read_u16(offset + 1));
                let target = (offset + 3).saturating_sub(jump);
                write!(line, "{:16} {: >4} -> {:04}", OpCode::Loop, jump, target)?;
            },

            Some(opcode) => {
                write!(line, "{:16}", opcode)?;
            },

            None => {
                write!(line, "Unknown! {:#x}", bytes[offset])?;
            }
        }

        fmt.write_str(line.trim_end())?;

        Ok(offset + opcode.map_or(1, |op| op.instr_len()))
    }

    /// A single decoded instruction, without a trailing newline.
    pub fn instr_at(&self, offset: usize) -> impl fmt::Display + '_ {
        utils::delegate_fmt(move |fmt| self.decode_instr(fmt, offset).map(|_| ()))
    }

    fn write_const(&self, fmt: &mut impl fmt::Write, value: &Value) -> fmt::Result {
        match value {
            Value::String(string) => write!(fmt, "\"{}\"", utils::trim_str(string, 16)),
            _ => write!(fmt, "{}", value),
        }
    }
}

impl fmt::Display for Disassembler<'_> {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        if let Some(title) = self.title.as_ref() {
            writeln!(fmt, "== {} ==", title)?;
        }
        self.decode_chunk(fmt)
    }
}


/// Disassemble a function and every function nested in its constants.
pub fn disassemble_all(function: &Function) -> String {
    let mut output = String::new();
    let mut pending = vec![ function ];

    while let Some(function) = pending.pop() {
        // writing to a String can't fail
        let _ = write!(output, "{}", Disassembler::new(function.chunk()).with_title(function));
        output.push('\n');

        // reverse so that nested functions come out in declaration order
        for value in function.chunk().consts().iter().rev() {
            if let Value::Function(nested) = value {
                pending.push(nested);
            }
        }
    }

    output
}

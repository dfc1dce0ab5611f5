// Opcodes

// Rust enums are not like C enums! They're more like unions.
// So if we want to convert between them and integer constants easily,
// we need to explictly define each value as a const

// 0x00         Control

                        // width set here so that the longest mnemonic is 16 chars
const OP_RETURN:        u8 = 0x00;  // return from current function

// 0x10-30      Immediate Values

const OP_POP:           u8 = 0x10;

const OP_LD_CONST:      u8 = 0x21;  // load a constant from the chunk's const pool

const OP_CR_GLOBAL:     u8 = 0x23;
const OP_ST_GLOBAL:     u8 = 0x25;
const OP_LD_GLOBAL:     u8 = 0x27;

const OP_ST_LOCAL:      u8 = 0x2A;
const OP_LD_LOCAL:      u8 = 0x2C;

const OP_NIL:           u8 = 0x30;
const OP_TRUE:          u8 = 0x32;
const OP_FALSE:         u8 = 0x33;

// 0x40         Unary Operations

const OP_NEG:           u8 = 0x40;
const OP_NOT:           u8 = 0x43;

// 0x50-60      Binary Operations

const OP_ADD:           u8 = 0x55;
const OP_SUB:           u8 = 0x56;
const OP_MUL:           u8 = 0x57;
const OP_DIV:           u8 = 0x58;

const OP_EQ:            u8 = 0x5A;
const OP_LT:            u8 = 0x5C;
const OP_GT:            u8 = 0x5F;

// 0x70         Jumps

const OP_JUMP:          u8 = 0x70;  // 16-bit forward offset
const OP_JUMP_FALSE:    u8 = 0x71;  // does not pop the condition
const OP_LOOP:          u8 = 0x72;  // 16-bit backward offset

// 0x80         Calls

const OP_CALL:          u8 = 0x80;

// 0x90         Classes

const OP_CLASS:         u8 = 0x90;
const OP_LD_PROPERTY:   u8 = 0x91;
const OP_ST_PROPERTY:   u8 = 0x92;
const OP_METHOD:        u8 = 0x93;

// 0xF0         Misc

const OP_PRINT:         u8 = 0xF0;


#[repr(u8)]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum OpCode {
    Return = OP_RETURN,

    Pop = OP_POP,
    LoadConst = OP_LD_CONST,

    DefineGlobal = OP_CR_GLOBAL,
    StoreGlobal = OP_ST_GLOBAL,
    LoadGlobal = OP_LD_GLOBAL,
    StoreLocal = OP_ST_LOCAL,
    LoadLocal = OP_LD_LOCAL,

    Nil = OP_NIL,
    True = OP_TRUE,
    False = OP_FALSE,

    Neg = OP_NEG,
    Not = OP_NOT,

    Add = OP_ADD,
    Sub = OP_SUB,
    Mul = OP_MUL,
    Div = OP_DIV,
    EQ = OP_EQ,
    LT = OP_LT,
    GT = OP_GT,

    Jump = OP_JUMP,
    JumpIfFalse = OP_JUMP_FALSE,
    Loop = OP_LOOP,

    Call = OP_CALL,

    Class = OP_CLASS,
    LoadProperty = OP_LD_PROPERTY,
    StoreProperty = OP_ST_PROPERTY,
    Method = OP_METHOD,

    Print = OP_PRINT,
}

impl OpCode {
    pub fn from_byte(byte: u8) -> Option<OpCode> {
        let opcode = match byte {
            OP_RETURN => Self::Return,

            OP_POP => Self::Pop,
            OP_LD_CONST => Self::LoadConst,

            OP_CR_GLOBAL => Self::DefineGlobal,
            OP_ST_GLOBAL => Self::StoreGlobal,
            OP_LD_GLOBAL => Self::LoadGlobal,
            OP_ST_LOCAL => Self::StoreLocal,
            OP_LD_LOCAL => Self::LoadLocal,

            OP_NIL => Self::Nil,
            OP_TRUE => Self::True,
            OP_FALSE => Self::False,

            OP_NEG => Self::Neg,
            OP_NOT => Self::Not,

            OP_ADD => Self::Add,
            OP_SUB => Self::Sub,
            OP_MUL => Self::Mul,
            OP_DIV => Self::Div,
            OP_EQ => Self::EQ,
            OP_LT => Self::LT,
            OP_GT => Self::GT,

            OP_JUMP => Self::Jump,
            OP_JUMP_FALSE => Self::JumpIfFalse,
            OP_LOOP => Self::Loop,

            OP_CALL => Self::Call,

            OP_CLASS => Self::Class,
            OP_LD_PROPERTY => Self::LoadProperty,
            OP_ST_PROPERTY => Self::StoreProperty,
            OP_METHOD => Self::Method,

            OP_PRINT => Self::Print,

            _ => return None,
        };
        Some(opcode)
    }

    pub fn instr_len(&self) -> usize {
        match self {
            Self::Return => 1,

            Self::Pop => 1,
            Self::LoadConst => 2,

            Self::DefineGlobal => 2,
            Self::StoreGlobal => 2,
            Self::LoadGlobal => 2,
            Self::StoreLocal => 2,
            Self::LoadLocal => 2,

            Self::Nil => 1,
            Self::True => 1,
            Self::False => 1,

            Self::Neg => 1,
            Self::Not => 1,

            Self::Add => 1,
            Self::Sub => 1,
            Self::Mul => 1,
            Self::Div => 1,
            Self::EQ => 1,
            Self::LT => 1,
            Self::GT => 1,

            Self::Jump => 3,
            Self::JumpIfFalse => 3,
            Self::Loop => 3,

            Self::Call => 2,

            Self::Class => 2,
            Self::LoadProperty => 2,
            Self::StoreProperty => 2,
            Self::Method => 2,

            Self::Print => 1,
        }
    }
}

impl From<OpCode> for u8 {
    fn from(opcode: OpCode) -> Self { opcode as u8 }
}

impl PartialEq<u8> for OpCode {
    fn eq(&self, other: &u8) -> bool { *other == (*self).into() }
}

// For disassembly/debugging
impl std::fmt::Display for OpCode {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mnemonic = match *self {
            Self::Return => "OP_RETURN",

            Self::Pop => "OP_POP",
            Self::LoadConst => "OP_LD_CONST",

            Self::DefineGlobal => "OP_CR_GLOBAL",
            Self::StoreGlobal => "OP_ST_GLOBAL",
            Self::LoadGlobal => "OP_LD_GLOBAL",
            Self::StoreLocal => "OP_ST_LOCAL",
            Self::LoadLocal => "OP_LD_LOCAL",

            Self::Nil => "OP_NIL",
            Self::True => "OP_TRUE",
            Self::False => "OP_FALSE",

            Self::Neg => "OP_NEG",
            Self::Not => "OP_NOT",

            Self::Add => "OP_ADD",
            Self::Sub => "OP_SUB",
            Self::Mul => "OP_MUL",
            Self::Div => "OP_DIV",
            Self::EQ => "OP_EQ",
            Self::LT => "OP_LT",
            Self::GT => "OP_GT",

            Self::Jump => "OP_JUMP",
            Self::JumpIfFalse => "OP_JUMP_FALSE",
            Self::Loop => "OP_LOOP",

            Self::Call => "OP_CALL",

            Self::Class => "OP_CLASS",
            Self::LoadProperty => "OP_LD_PROPERTY",
            Self::StoreProperty => "OP_ST_PROPERTY",
            Self::Method => "OP_METHOD",

            Self::Print => "OP_PRINT",
        };

        if let Some(width) = fmt.width() {
            write!(fmt, "{:1$}", mnemonic, width)
        } else {
            fmt.write_str(mnemonic)
        }
    }
}

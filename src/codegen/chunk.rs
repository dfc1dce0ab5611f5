use crate::runtime::Value;


pub type ConstID = u8;


/// A unit of bytecode: instructions, the source line of every byte, and the constant pool.
#[derive(Debug, Default)]
pub struct Chunk {
    bytes: Vec<u8>,
    lines: Vec<usize>,
    consts: Vec<Value>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    // Bytes

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    // using Into<u8> so that OpCodes can be accepted without extra fuss
    pub fn write(&mut self, byte: impl Into<u8>, line: usize) {
        self.bytes.push(byte.into());
        self.lines.push(line);
    }

    pub fn patch_bytes(&mut self, offset: usize, patch: &[u8]) {
        let patch_range = offset..(offset + patch.len());
        let target = &mut self.bytes[patch_range];
        target.copy_from_slice(patch);
    }

    pub fn read_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes([ self.bytes[offset], self.bytes[offset + 1] ])
    }

    // Lines

    /// The source line that produced the byte at `offset`.
    pub fn line(&self, offset: usize) -> usize {
        self.lines.get(offset).copied().unwrap_or(0)
    }

    pub fn lines(&self) -> &[usize] {
        self.lines.as_slice()
    }

    // Constants

    /// Appends to the pool. Indices of existing constants never change.
    pub fn add_const(&mut self, value: Value) -> usize {
        self.consts.push(value);
        self.consts.len() - 1
    }

    pub fn consts(&self) -> &[Value] {
        self.consts.as_slice()
    }

    pub fn lookup_const(&self, index: impl Into<usize>) -> &Value {
        &self.consts[index.into()]
    }
}

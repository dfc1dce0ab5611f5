use core::fmt;
use std::rc::Rc;

use crate::codegen::Chunk;
use crate::runtime::Value;
use crate::runtime::class::Instance;
use crate::runtime::vm::VirtualMachine;
use crate::runtime::errors::ExecResult;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Script,
    Function,
    Method,
    Initializer,
}

impl FunctionKind {
    /// Methods and initializers reserve stack slot 0 for the receiver.
    pub fn has_receiver(&self) -> bool {
        matches!(self, Self::Method | Self::Initializer)
    }
}


/// A compiled script function. Immutable once the compiler hands it out.
#[derive(Debug)]
pub struct Function {
    name: Rc<str>,
    kind: FunctionKind,
    arity: usize,
    chunk: Chunk,
    external_entry: bool,
}

impl Function {
    pub fn new(name: impl Into<Rc<str>>, kind: FunctionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            arity: 0,
            chunk: Chunk::new(),
            external_entry: false,
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn kind(&self) -> FunctionKind { self.kind }
    pub fn arity(&self) -> usize { self.arity }
    pub fn chunk(&self) -> &Chunk { &self.chunk }

    /// Calls to this function are handed to the host's external dispatch hook instead of running bytecode.
    pub fn is_external_entry(&self) -> bool { self.external_entry }

    pub(crate) fn chunk_mut(&mut self) -> &mut Chunk { &mut self.chunk }
    pub(crate) fn set_arity(&mut self, arity: usize) { self.arity = arity }
    pub(crate) fn set_external_entry(&mut self, external: bool) { self.external_entry = external }
}

impl fmt::Display for Function {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FunctionKind::Script => fmt.write_str("<script>"),
            _ => write!(fmt, "<fn {}>", self.name),
        }
    }
}


/// Signature for host functions. Receives the calling VM (so that natives can call back into scripts),
/// the arguments, and the receiver instance when called as a method.
pub type NativeFn = dyn Fn(&mut VirtualMachine, &[Value], Option<&Rc<Instance>>) -> ExecResult<Value>;

pub struct NativeFunction {
    name: Rc<str>,
    func: Box<NativeFn>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<Rc<str>>, func: F) -> Self
    where F: Fn(&mut VirtualMachine, &[Value], Option<&Rc<Instance>>) -> ExecResult<Value> + 'static {
        Self { name: name.into(), func: Box::new(func) }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn invoke(&self, vm: &mut VirtualMachine, args: &[Value], receiver: Option<&Rc<Instance>>) -> ExecResult<Value> {
        (self.func)(vm, args, receiver)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "<native fn {}>", self.name)
    }
}

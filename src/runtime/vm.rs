use std::rc::Rc;

use crate::language;
use crate::codegen::OpCode;
use crate::runtime::{Value, HashMap, DefaultBuildHasher};
use crate::runtime::ops;
use crate::runtime::function::{Function, NativeFunction};
use crate::runtime::class::{Class, Instance, Method};
use crate::runtime::errors::{ExecResult, RuntimeError};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::debug::dasm::Disassembler;

mod callframe;
mod stack;

pub use callframe::VMCallFrame;
pub use stack::ValueStack;


pub const FRAMES_MAX: usize = 64;
pub const STACK_MAX: usize = FRAMES_MAX * (u8::MAX as usize + 1);


// Helper macros
macro_rules! eval_binary_op {
    ( $self:expr, $eval_func:tt ) => {
        {
            let rhs = $self.stack.pop();
            let result = ops::$eval_func($self.stack.peek(0), &rhs)?;
            $self.stack.replace(result);
        }
    };
}

macro_rules! eval_cmp {
    ( $self:expr, $eval_func:tt ) => {
        {
            let rhs = $self.stack.pop();
            let result = ops::$eval_func($self.stack.peek(0), &rhs);
            $self.stack.replace(Value::Bool(result));
        }
    };
}


/// Where `print` output goes.
#[derive(Debug)]
pub enum Output {
    Stdout,
    Capture(String),
}

/// Host hook that receives calls to functions compiled as external entry points.
pub type ExternalDispatch = dyn FnMut(&mut VirtualMachine, &Rc<Function>, &[Value]) -> ExecResult<Value>;


// Stack-based Virtual Machine
pub struct VirtualMachine {
    frames: Vec<VMCallFrame>,
    stack: ValueStack,
    globals: HashMap<Rc<str>, Value>,
    diagnostics: Diagnostics,
    output: Output,
    external: Option<Box<ExternalDispatch>>,
    host_calls: usize,  // nesting depth of interpret() and host calls
}

impl Default for VirtualMachine {
    fn default() -> Self { Self::new() }
}

impl VirtualMachine {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            stack: ValueStack::with_limit(STACK_MAX),
            globals: HashMap::with_hasher(DefaultBuildHasher::default()),
            diagnostics: Diagnostics::new(),
            output: Output::Stdout,
            external: None,
            host_calls: 0,
        }
    }

    // Globals

    pub fn define_global(&mut self, name: impl Into<Rc<str>>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    pub fn get_global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    // Host registration

    pub fn register_fn<F>(&mut self, name: &str, func: F) -> Value
    where F: Fn(&mut VirtualMachine, &[Value], Option<&Rc<Instance>>) -> ExecResult<Value> + 'static {
        let native = Value::NativeFunction(Rc::new(NativeFunction::new(name, func)));
        self.define_global(name, native.clone());
        native
    }

    pub fn register_class(&mut self, name: &str) -> Value {
        let class = Value::Class(Rc::new(Class::new(name)));
        self.define_global(name, class.clone());
        class
    }

    /// Attach a native method to a class. Returns nil if `class` is not a class.
    pub fn register_method<F>(&mut self, class: &Value, name: &str, func: F) -> Value
    where F: Fn(&mut VirtualMachine, &[Value], Option<&Rc<Instance>>) -> ExecResult<Value> + 'static {
        let class = match class.as_class() {
            Some(class) => class,
            None => {
                log::warn!("can't register method '{}' on a {}", name, class.type_name());
                return Value::Nil;
            }
        };

        let method = Value::NativeFunction(Rc::new(NativeFunction::new(name, func)));
        class.add_method(Rc::from(name), method.clone());
        method
    }

    pub fn set_external_dispatch<F>(&mut self, dispatch: F)
    where F: FnMut(&mut VirtualMachine, &Rc<Function>, &[Value]) -> ExecResult<Value> + 'static {
        self.external.replace(Box::new(dispatch));
    }

    // Output and diagnostics

    pub fn set_output(&mut self, output: Output) {
        self.output = output;
    }

    /// Start capturing `print` output instead of writing it to stdout.
    pub fn capture_output(&mut self) {
        self.output = Output::Capture(String::new());
    }

    /// Take whatever `print` output was captured so far.
    pub fn take_output(&mut self) -> String {
        match &mut self.output {
            Output::Capture(buf) => std::mem::take(buf),
            Output::Stdout => String::new(),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics { &self.diagnostics }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn stack_len(&self) -> usize { self.stack.len() }
    pub fn frame_count(&self) -> usize { self.frames.len() }

    // Execution

    /// Run a compiled script. Runtime errors are also recorded in the diagnostics.
    /// Fails without touching the VM state if a script is already running.
    pub fn interpret(&mut self, script: Rc<Function>) -> ExecResult<()> {
        if self.host_calls > 0 {
            return Err(RuntimeError::vm_busy());
        }
        self.reset();

        self.host_calls += 1;
        let result = self.stack.push(Value::Function(script.clone()))
            .and_then(|_| self.call_function(script, 0))
            .and_then(|_| self.run(0));
        self.host_calls -= 1;

        if let Err(error) = result {
            self.report_error(&error);
            self.reset();
            return Err(error);
        }
        Ok(())
    }

    /// Call a script or native value from the host, optionally with a receiver bound to `this`.
    /// May be used while the VM is running, e.g. from inside a native function.
    pub fn call_value_from_host(&mut self, callee: &Value, receiver: Option<Value>, args: &[Value]) -> ExecResult<Value> {
        let depth = self.frames.len();
        let stack_len = self.stack.len();

        self.host_calls += 1;
        let result = self.invoke_from_host(callee, receiver, args, depth);
        self.host_calls -= 1;

        if let Err(error) = result.as_ref() {
            self.frames.truncate(depth);
            self.stack.truncate(stack_len);

            // nested calls leave reporting to whoever called into the VM first
            if self.host_calls == 0 {
                self.report_error(error);
            }
        }
        result
    }

    pub fn call_from_host(&mut self, callee: &Value, receiver: Option<Value>, args: &[Value]) -> bool {
        self.call_value_from_host(callee, receiver, args).is_ok()
    }

    fn invoke_from_host(&mut self, callee: &Value, receiver: Option<Value>, args: &[Value], depth: usize) -> ExecResult<Value> {
        let instance = receiver.as_ref().and_then(Value::as_instance).cloned();

        // the receiver takes the place of the callee in slot 0
        self.stack.push(receiver.unwrap_or_else(|| callee.clone()))?;
        for arg in args.iter() {
            self.stack.push(arg.clone())?;
        }

        match callee {
            Value::NativeFunction(native) if instance.is_some() =>
                self.call_native(native, args.len(), instance)?,
            _ => self.call_value(callee.clone(), args.len())?,
        }

        if self.frames.len() > depth {
            self.run(depth)
        } else {
            // natives and bodyless constructors complete immediately
            Ok(self.stack.pop())
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.frames.clear();
    }

    fn report_error(&mut self, error: &RuntimeError) {
        log::debug!("{}\n{}", error, error.traceback());
        let line = error.line().unwrap_or(0);
        self.diagnostics.push(Diagnostic::error(line, error.message()));
    }

    // Calls

    fn call_value(&mut self, callee: Value, nargs: usize) -> ExecResult<()> {
        match callee {
            Value::Function(function) => self.call_function(function, nargs),

            Value::NativeFunction(native) => self.call_native(&native, nargs, None),

            Value::BoundMethod(bound) => {
                let slot = self.stack.len() - nargs - 1;
                self.stack.replace_at(slot, bound.receiver().clone());

                match bound.method() {
                    Method::Script(function) => self.call_function(function.clone(), nargs),
                    Method::Native(native) => {
                        let receiver = bound.receiver().as_instance().cloned();
                        self.call_native(native, nargs, receiver)
                    }
                }
            },

            Value::Class(class) => self.call_class(class, nargs),

            _ => Err(RuntimeError::not_callable(&callee)),
        }
    }

    fn call_function(&mut self, function: Rc<Function>, nargs: usize) -> ExecResult<()> {
        if function.is_external_entry() {
            return self.call_external(function, nargs);
        }

        if nargs != function.arity() {
            return Err(RuntimeError::arity_mismatch(function.arity(), nargs));
        }

        if self.frames.len() >= FRAMES_MAX {
            return Err(RuntimeError::stack_overflow());
        }

        log::trace!("call {} with {} args", function, nargs);

        let stack_idx = self.stack.len() - nargs - 1;
        self.frames.push(VMCallFrame::new(function, stack_idx));
        Ok(())
    }

    // the arity of natives is not checked, they receive whatever was passed
    fn call_native(&mut self, native: &Rc<NativeFunction>, nargs: usize, receiver: Option<Rc<Instance>>) -> ExecResult<()> {
        log::trace!("call {} with {} args", native, nargs);

        let args = self.stack.pop_many(nargs);
        let native = native.clone();
        let result = native.invoke(self, &args, receiver.as_ref())?;

        // replace the callee
        self.stack.replace(result);
        Ok(())
    }

    fn call_class(&mut self, class: Rc<Class>, nargs: usize) -> ExecResult<()> {
        let instance = Rc::new(Instance::new(class.clone()));

        let slot = self.stack.len() - nargs - 1;
        self.stack.replace_at(slot, Value::Instance(instance.clone()));

        match class.find_method(language::INIT_METHOD) {
            Some(Value::Function(init)) => self.call_function(init, nargs),

            // the instance stays in the callee slot as the result
            Some(Value::NativeFunction(init)) => {
                let args = self.stack.pop_many(nargs);
                init.invoke(self, &args, Some(&instance))?;
                Ok(())
            },

            _ if nargs != 0 => Err(RuntimeError::arity_mismatch(0, nargs)),

            _ => Ok(()),
        }
    }

    fn call_external(&mut self, function: Rc<Function>, nargs: usize) -> ExecResult<()> {
        log::debug!("external dispatch for {}", function);

        // take the hook out while it runs, so that it can borrow the VM
        let mut dispatch = self.external.take()
            .ok_or_else(|| RuntimeError::no_external_dispatch(function.name()))?;

        let args = self.stack.pop_many(nargs);
        let result = dispatch(self, &function, &args);

        if self.external.is_none() {
            self.external.replace(dispatch);
        }

        self.stack.replace(result?);
        Ok(())
    }

    // Dispatch loop

    #[inline(always)]
    fn frame(&mut self) -> &mut VMCallFrame {
        self.frames.last_mut().expect("no call frame")
    }

    #[inline(always)]
    fn read_byte(&mut self) -> u8 {
        self.frame().fetch_byte()
    }

    #[inline(always)]
    fn read_u16(&mut self) -> u16 {
        self.frame().fetch_u16()
    }

    #[inline(always)]
    fn read_const(&mut self) -> Value {
        let cid = self.read_byte();
        self.frame().function().chunk().lookup_const(cid).clone()
    }

    fn read_name(&mut self) -> Rc<str> {
        match self.read_const() {
            Value::String(name) => name,
            _ => panic!("invalid operand"),
        }
    }

    /// Runs until the frame at index `depth` returns, producing its return value.
    fn run(&mut self, depth: usize) -> ExecResult<Value> {
        loop {
            let result = self.exec_next();
            match result {
                Ok(None) => { },
                Ok(Some(value)) if self.frames.len() == depth => return Ok(value),
                Ok(Some(value)) => self.stack.push(value)?,

                Err(error) => {
                    let error = self.frames[depth..].iter().rev()
                        .fold(error, |error, frame| error.push_trace(frame.trace_site()));
                    return Err(error);
                }
            }
        }
    }

    fn trace_instr(&self) {
        if let Some(frame) = self.frames.last() {
            let chunk = frame.function().chunk();
            log::trace!("stack: {:?}", &self.stack.as_slice()[frame.stack_frame()..]);
            log::trace!("{}", Disassembler::new(chunk).instr_at(frame.pc));
        }
    }

    // returns the value of a finished call frame
    fn exec_next(&mut self) -> ExecResult<Option<Value>> {
        if log::log_enabled!(log::Level::Trace) {
            self.trace_instr();
        }

        let op_byte = self.read_byte();
        let opcode = OpCode::from_byte(op_byte)
            .unwrap_or_else(|| panic!("invalid instruction: {:x}", op_byte));

        match opcode {
            OpCode::Return => {
                let result = self.stack.pop();
                let frame = self.frames.pop().expect("no call frame");
                self.stack.truncate(frame.stack_frame());

                log::trace!("return from {}", frame.function());
                return Ok(Some(result));
            },

            OpCode::Pop => {
                self.stack.pop();
            },

            OpCode::LoadConst => {
                let value = self.read_const();
                self.stack.push(value)?;
            },

            OpCode::DefineGlobal => {
                let name = self.read_name();
                let value = self.stack.pop();
                self.globals.insert(name, value);
            },
            OpCode::StoreGlobal => {
                let name = self.read_name();
                let value = self.stack.peek(0).clone();
                match self.globals.get_mut(&*name) {
                    Some(store) => *store = value,
                    None => return Err(RuntimeError::name_not_defined(&name)),
                }
            },
            OpCode::LoadGlobal => {
                let name = self.read_name();
                let value = self.globals.get(&*name).cloned()
                    .ok_or_else(|| RuntimeError::name_not_defined(&name))?;
                self.stack.push(value)?;
            },

            OpCode::StoreLocal => {
                let slot = usize::from(self.read_byte());
                let index = self.frame().stack_frame() + slot;
                self.stack.replace_at(index, self.stack.peek(0).clone());
            },
            OpCode::LoadLocal => {
                let slot = usize::from(self.read_byte());
                let index = self.frame().stack_frame() + slot;
                let value = self.stack.peek_at(index).clone();
                self.stack.push(value)?;
            },

            OpCode::Nil => self.stack.push(Value::Nil)?,
            OpCode::True => self.stack.push(Value::Bool(true))?,
            OpCode::False => self.stack.push(Value::Bool(false))?,

            OpCode::Neg => {
                let value = ops::eval_neg(self.stack.peek(0))?;
                self.stack.replace(value);
            },
            OpCode::Not => {
                let value = ops::eval_not(self.stack.peek(0));
                self.stack.replace(value);
            },

            OpCode::Add => eval_binary_op!(self, eval_add),
            OpCode::Sub => eval_binary_op!(self, eval_sub),
            OpCode::Mul => eval_binary_op!(self, eval_mul),
            OpCode::Div => eval_binary_op!(self, eval_div),

            OpCode::EQ => eval_cmp!(self, eval_eq),
            OpCode::LT => eval_cmp!(self, eval_lt),
            OpCode::GT => eval_cmp!(self, eval_gt),

            OpCode::Jump => {
                let offset = usize::from(self.read_u16());
                self.frame().pc += offset;
            },
            OpCode::JumpIfFalse => {
                let offset = usize::from(self.read_u16());
                if self.stack.peek(0).is_falsey() {
                    self.frame().pc += offset;
                }
            },
            OpCode::Loop => {
                let offset = usize::from(self.read_u16());
                self.frame().pc -= offset;
            },

            OpCode::Call => {
                let nargs = usize::from(self.read_byte());
                let callee = self.stack.peek(nargs).clone();
                self.call_value(callee, nargs)?;
            },

            OpCode::Class => {
                let name = self.read_name();
                self.stack.push(Value::Class(Rc::new(Class::new(name))))?;
            },
            OpCode::Method => {
                let name = self.read_name();
                let method = self.stack.pop();
                let class = self.stack.peek(0).as_class()
                    .expect("method target is not a class");
                class.add_method(name, method);
            },

            OpCode::LoadProperty => {
                let name = self.read_name();
                let instance = self.stack.peek(0).as_instance().cloned()
                    .ok_or_else(RuntimeError::property_on_non_instance)?;

                let value = instance.get_property(&name)
                    .ok_or_else(|| RuntimeError::undefined_property(&name))?;
                self.stack.replace(value);
            },
            OpCode::StoreProperty => {
                let name = self.read_name();
                let value = self.stack.pop();
                let instance = self.stack.peek(0).as_instance().cloned()
                    .ok_or_else(RuntimeError::field_on_non_instance)?;

                instance.set_field(name, value.clone());
                self.stack.replace(value);
            },

            OpCode::Print => {
                let value = self.stack.pop();
                match &mut self.output {
                    Output::Stdout => println!("{}", value),
                    Output::Capture(buf) => {
                        buf.push_str(&value.to_string());
                        buf.push('\n');
                    },
                }
            },
        }

        Ok(None)
    }
}

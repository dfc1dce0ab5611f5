use std::rc::Rc;

use crate::codegen::{Compiler, CompileOptions};
use crate::runtime::{Value, Instance, VirtualMachine};
use crate::runtime::errors::ExecResult;
use crate::diagnostics::Diagnostics;


/// An embedded script engine: a compiler configuration plus a VM whose globals persist across runs.
pub struct Denrim {
    vm: VirtualMachine,
    options: CompileOptions,
}

impl Default for Denrim {
    fn default() -> Self { Self::new() }
}

impl Denrim {
    pub fn new() -> Self {
        Self::with_options(CompileOptions::default())
    }

    pub fn with_options(options: CompileOptions) -> Self {
        Self { vm: VirtualMachine::new(), options }
    }

    pub fn vm(&self) -> &VirtualMachine { &self.vm }
    pub fn vm_mut(&mut self) -> &mut VirtualMachine { &mut self.vm }

    pub fn options(&self) -> &CompileOptions { &self.options }

    /// Compile and run `source`, returning everything reported along the way.
    /// Nothing runs if compilation fails.
    pub fn execute(&mut self, source: &str) -> Diagnostics {
        let output = Compiler::with_options(source, self.options.clone()).compile();

        let mut diagnostics = output.diagnostics;
        if let Some(script) = output.function {
            if let Err(error) = self.vm.interpret(script) {
                log::debug!("script failed: {}", error);
            }
            diagnostics.append(self.vm.take_diagnostics());
        }
        diagnostics
    }

    pub fn call(&mut self, callee: &Value, receiver: Option<Value>, args: &[Value]) -> bool {
        self.vm.call_from_host(callee, receiver, args)
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        self.vm.take_diagnostics()
    }

    pub fn register_fn<F>(&mut self, name: &str, func: F) -> Value
    where F: Fn(&mut VirtualMachine, &[Value], Option<&Rc<Instance>>) -> ExecResult<Value> + 'static {
        self.vm.register_fn(name, func)
    }

    pub fn register_class(&mut self, name: &str) -> Value {
        self.vm.register_class(name)
    }

    pub fn register_method<F>(&mut self, class: &Value, name: &str, func: F) -> Value
    where F: Fn(&mut VirtualMachine, &[Value], Option<&Rc<Instance>>) -> ExecResult<Value> + 'static {
        self.vm.register_method(class, name, func)
    }

    pub fn capture_output(&mut self) {
        self.vm.capture_output()
    }

    pub fn take_output(&mut self) -> String {
        self.vm.take_output()
    }
}

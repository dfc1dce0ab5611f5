use std::rc::Rc;

use crate::runtime::Function;
use crate::debug::traceback::TraceSite;


#[derive(Debug)]
pub struct VMCallFrame {
    function: Rc<Function>,
    pub(super) pc: usize,
    stack_idx: usize,  // start index for this frame in the value stack
}

impl VMCallFrame {
    pub fn new(function: Rc<Function>, stack_idx: usize) -> Self {
        Self { function, pc: 0, stack_idx }
    }

    #[inline]
    pub fn function(&self) -> &Rc<Function> { &self.function }

    #[inline]
    pub fn stack_frame(&self) -> usize { self.stack_idx }

    #[inline]
    pub fn fetch_byte(&mut self) -> u8 {
        let byte = self.function.chunk().bytes()[self.pc];
        self.pc += 1;
        byte
    }

    #[inline]
    pub fn fetch_u16(&mut self) -> u16 {
        let value = self.function.chunk().read_u16(self.pc);
        self.pc += 2;
        value
    }

    /// Source line of the instruction being executed.
    pub fn current_line(&self) -> usize {
        self.function.chunk().line(self.pc.saturating_sub(1))
    }

    pub fn trace_site(&self) -> TraceSite {
        let name = match self.function.name() {
            "" => None,
            name => Some(Rc::from(name)),
        };
        TraceSite::new(name, self.current_line())
    }
}

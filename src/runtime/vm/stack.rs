use crate::runtime::Value;
use crate::runtime::errors::{ExecResult, RuntimeError};


/// Bounded stack of values shared by every call frame.
#[derive(Debug)]
pub struct ValueStack {
    values: Vec<Value>,
    limit: usize,
}

impl ValueStack {
    pub fn with_limit(limit: usize) -> Self {
        Self { values: Vec::new(), limit }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline(always)]
    pub fn push(&mut self, value: Value) -> ExecResult<()> {
        if self.values.len() >= self.limit {
            return Err(RuntimeError::stack_overflow());
        }
        self.values.push(value);
        Ok(())
    }

    #[inline(always)]
    pub fn pop(&mut self) -> Value {
        self.values.pop().expect("empty stack")
    }

    /// Removes the top `count` values, returning them in push order.
    #[inline]
    pub fn pop_many(&mut self, count: usize) -> Vec<Value> {
        self.values.split_off(self.values.len() - count)
    }

    #[inline(always)]
    pub fn peek(&self, distance: usize) -> &Value {
        let idx = self.values.len() - 1 - distance;
        self.values.get(idx).expect("stack offset out of bounds")
    }

    #[inline(always)]
    pub fn peek_at(&self, index: usize) -> &Value {
        self.values.get(index).expect("stack index out of bounds")
    }

    #[inline(always)]
    pub fn replace(&mut self, value: Value) {
        *self.values.last_mut().expect("empty stack") = value;
    }

    #[inline(always)]
    pub fn replace_at(&mut self, index: usize, value: Value) {
        let item = self.values.get_mut(index)
            .expect("stack index out of bounds");

        *item = value;
    }

    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len)
    }

    pub fn clear(&mut self) {
        self.values.clear()
    }

    pub fn as_slice(&self) -> &[Value] {
        self.values.as_slice()
    }
}

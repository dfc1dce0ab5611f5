// Scope Tracking

use crate::language::{self, MAX_LOCALS};
use crate::runtime::{Function, FunctionKind, HashMap, DefaultBuildHasher};
use crate::codegen::chunk::ConstID;
use crate::codegen::errors::{CompileResult, CompileError, ErrorKind, Location};


pub type LocalIndex = u8;


#[derive(Debug, Clone)]
pub struct Local<'s> {
    name: &'s str,
    depth: Option<usize>,  // None until the initializer has been compiled
}

impl<'s> Local<'s> {
    pub fn is_initialized(&self) -> bool { self.depth.is_some() }
}


/// Compile-time state for the function currently being generated.
#[derive(Debug)]
pub struct FunctionState<'s> {
    function: Function,
    locals: Vec<Local<'s>>,
    scope_depth: usize,
    names: HashMap<&'s str, ConstID>,  // dedup for identifier constants
}

impl<'s> FunctionState<'s> {
    pub fn new(function: Function) -> Self {
        // slot 0 holds the callee, or the receiver for methods
        let slot_zero = if function.kind().has_receiver() { language::THIS_NAME } else { "" };

        Self {
            function,
            locals: vec![ Local { name: slot_zero, depth: Some(0) } ],
            scope_depth: 0,
            names: HashMap::with_hasher(DefaultBuildHasher::default()),
        }
    }

    pub fn kind(&self) -> FunctionKind { self.function.kind() }
    pub fn function_mut(&mut self) -> &mut Function { &mut self.function }
    pub fn into_function(self) -> Function { self.function }

    pub fn is_global_scope(&self) -> bool { self.scope_depth == 0 }

    pub fn lookup_name(&self, name: &str) -> Option<ConstID> {
        self.names.get(name).copied()
    }

    pub fn insert_name(&mut self, name: &'s str, cid: ConstID) {
        self.names.insert(name, cid);
    }

    pub fn begin_scope(&mut self) {
        self.scope_depth += 1;
    }

    /// Leaves the innermost block, returning how many locals went out of scope.
    pub fn end_scope(&mut self) -> usize {
        self.scope_depth -= 1;

        let depth = self.scope_depth;
        let in_scope = self.locals.iter()
            .rposition(|local| matches!(local.depth, Some(d) if d <= depth))
            .map_or(0, |idx| idx + 1);

        let count = self.locals.len() - in_scope;
        self.locals.truncate(in_scope);
        count
    }

    /// Whether a local with this name was already declared in the innermost scope.
    pub fn is_declared_in_scope(&self, name: &str) -> bool {
        self.locals.iter().rev()
            .take_while(|local| !matches!(local.depth, Some(d) if d < self.scope_depth))
            .any(|local| local.name == name)
    }

    pub fn add_local(&mut self, name: &'s str, line: usize) -> CompileResult<()> {
        if self.locals.len() >= MAX_LOCALS {
            return Err(CompileError::new(ErrorKind::TooManyLocals, line, Location::At(name.to_string())));
        }
        self.locals.push(Local { name, depth: None });
        Ok(())
    }

    pub fn mark_initialized(&mut self) {
        let depth = self.scope_depth;
        if let Some(local) = self.locals.last_mut() {
            local.depth.replace(depth);
        }
    }

    /// Searches innermost first. The returned local may still be uninitialized.
    pub fn resolve_local(&self, name: &str) -> Option<(LocalIndex, &Local<'s>)> {
        self.locals.iter().enumerate().rev()
            .find(|(_, local)| local.name == name)
            .map(|(idx, local)| (idx as LocalIndex, local))
    }
}

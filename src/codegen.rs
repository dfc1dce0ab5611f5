use std::rc::Rc;

use crate::language::{self, MAX_ARGS, MAX_PARAMS, FloatType};
use crate::lexer::{Lexer, Token, TokenType};
use crate::runtime::{Value, Function, FunctionKind, HashSet, DefaultBuildHasher};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::debug::dasm::Disassembler;

pub mod chunk;
pub mod opcodes;
pub mod errors;
pub mod scope;
pub mod rules;

pub use opcodes::OpCode;
pub use chunk::{Chunk, ConstID};
pub use errors::{CompileResult, CompileError, ErrorKind};

use errors::Location;
use scope::{FunctionState, LocalIndex};
use rules::{Precedence, get_rule};

mod tests;


/// Compile a source string with default options.
pub fn compile(source: &str) -> CompileOutput {
    Compiler::new(source).compile()
}


#[derive(Debug, Clone)]
pub struct CompileOptions {
    external_entries: HashSet<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { external_entries: HashSet::with_hasher(DefaultBuildHasher::default()) }
    }
}

impl CompileOptions {
    pub fn new() -> Self { Self::default() }

    /// Functions declared with this name are tagged as external entry points,
    /// and calls to them are routed to the VM's external dispatch hook.
    pub fn mark_external(mut self, name: impl Into<String>) -> Self {
        self.external_entries.insert(name.into()); self
    }

    pub fn is_external(&self, name: &str) -> bool {
        self.external_entries.contains(name)
    }
}


// Output container

#[derive(Debug)]
pub struct CompileOutput {
    pub function: Option<Rc<Function>>,
    pub diagnostics: Diagnostics,
}

impl CompileOutput {
    pub fn is_ok(&self) -> bool { self.function.is_some() }
}


// Compiler

pub struct Compiler<'s> {
    lexer: Lexer<'s>,
    previous: Token<'s>,
    current: Token<'s>,
    panic_mode: bool,
    errors: Vec<CompileError>,

    functions: Vec<FunctionState<'s>>,

    options: CompileOptions,
    externals_seen: HashSet<&'s str>,
}

impl<'s> Compiler<'s> {
    pub fn new(source: &'s str) -> Self {
        Self::with_options(source, CompileOptions::default())
    }

    pub fn with_options(source: &'s str, options: CompileOptions) -> Self {
        let script = Function::new("", FunctionKind::Script);

        Self {
            lexer: Lexer::new(source),
            previous: Token::synthetic(TokenType::EOF, ""),
            current: Token::synthetic(TokenType::EOF, ""),
            panic_mode: false,
            errors: Vec::new(),

            functions: vec![ FunctionState::new(script) ],

            options,
            externals_seen: HashSet::with_hasher(DefaultBuildHasher::default()),
        }
    }

    pub fn compile(mut self) -> CompileOutput {
        self.advance();
        while !self.match_token(TokenType::EOF) {
            self.declaration();
        }

        let script = self.end_function();

        let mut diagnostics = Diagnostics::new();
        for error in self.errors.iter() {
            diagnostics.push(error.into());
        }

        let line = self.previous.line;
        for name in self.options.external_entries.iter() {
            if !self.externals_seen.contains(name.as_str()) {
                diagnostics.push(Diagnostic::warning(line, format!("External entry '{}' is never declared.", name)));
            }
        }

        let function = if self.errors.is_empty() { Some(script) } else { None };
        CompileOutput { function, diagnostics }
    }

    // Function contexts

    fn state(&self) -> &FunctionState<'s> {
        self.functions.last().expect("no function state")
    }

    fn state_mut(&mut self) -> &mut FunctionState<'s> {
        self.functions.last_mut().expect("no function state")
    }

    fn current_chunk(&mut self) -> &mut Chunk {
        self.state_mut().function_mut().chunk_mut()
    }

    fn begin_function(&mut self, name: &'s str, kind: FunctionKind) {
        let mut function = Function::new(name, kind);
        if self.options.is_external(name) {
            log::debug!("{} is an external entry point", name);
            function.set_external_entry(true);
            self.externals_seen.insert(name);
        }
        self.functions.push(FunctionState::new(function));
    }

    fn end_function(&mut self) -> Rc<Function> {
        self.emit_return();

        let function = self.functions.pop().expect("no function state").into_function();

        log::debug!("compiled {} ({} bytes, {} consts)", function, function.chunk().len(), function.chunk().consts().len());
        if self.errors.is_empty() && log::log_enabled!(log::Level::Trace) {
            log::trace!("{}", Disassembler::new(function.chunk()).with_title(&function));
        }

        Rc::new(function)
    }

    // Token stream

    fn advance(&mut self) {
        self.previous = self.current;

        loop {
            self.current = self.lexer.next_token();
            if !self.current.is_error() {
                break;
            }

            let message = self.current.lexeme.to_string();
            self.error_at_current(ErrorKind::LexerError(message));
        }
    }

    fn check(&self, kind: TokenType) -> bool {
        self.current.kind == kind
    }

    fn match_token(&mut self, kind: TokenType) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    fn consume(&mut self, kind: TokenType, message: &'static str) {
        if self.check(kind) {
            self.advance();
        } else {
            self.error_at_current(ErrorKind::Expected(message));
        }
    }

    // Errors

    fn error_at(&mut self, token: Token<'s>, kind: ErrorKind) {
        let location = match token.kind {
            TokenType::EOF => Location::End,
            TokenType::Error => Location::Unknown,
            _ => Location::At(token.lexeme.to_string()),
        };
        self.report(CompileError::new(kind, token.line, location));
    }

    fn error(&mut self, kind: ErrorKind) {
        self.error_at(self.previous, kind)
    }

    fn error_at_current(&mut self, kind: ErrorKind) {
        self.error_at(self.current, kind)
    }

    // further errors are suppressed until we resynchronize
    fn report(&mut self, error: CompileError) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.errors.push(error);
    }

    fn synchronize(&mut self) {
        self.panic_mode = false;

        while !self.check(TokenType::EOF) {
            if self.previous.kind == TokenType::Semicolon || self.current.kind.starts_statement() {
                return;
            }
            self.advance();
        }
    }

    // Bytecode emission

    fn emit_byte(&mut self, byte: impl Into<u8>) {
        let line = self.previous.line;
        self.current_chunk().write(byte, line);
    }

    fn emit_instr(&mut self, opcode: OpCode) {
        self.emit_byte(opcode);
    }

    fn emit_instr_byte(&mut self, opcode: OpCode, byte: u8) {
        self.emit_byte(opcode);
        self.emit_byte(byte);
    }

    fn emit_return(&mut self) {
        if self.state().kind() == FunctionKind::Initializer {
            self.emit_instr_byte(OpCode::LoadLocal, 0);
        } else {
            self.emit_instr(OpCode::Nil);
        }
        self.emit_instr(OpCode::Return);
    }

    fn make_const(&mut self, value: Value) -> ConstID {
        let index = self.current_chunk().add_const(value);
        match ConstID::try_from(index) {
            Ok(cid) => cid,
            Err(..) => {
                self.error(ErrorKind::ConstPoolLimit);
                0
            }
        }
    }

    fn emit_const(&mut self, value: Value) {
        let cid = self.make_const(value);
        self.emit_instr_byte(OpCode::LoadConst, cid);
    }

    fn identifier_const(&mut self, name: &'s str) -> ConstID {
        if let Some(cid) = self.state().lookup_name(name) {
            return cid;
        }

        let cid = self.make_const(Value::from(name));
        self.state_mut().insert_name(name, cid);
        cid
    }

    // emits a jump with a placeholder offset, returning the location to patch
    fn emit_jump(&mut self, opcode: OpCode) -> usize {
        self.emit_instr(opcode);
        self.emit_byte(0xFF);
        self.emit_byte(0xFF);
        self.current_chunk().len() - 2
    }

    fn patch_jump(&mut self, offset: usize) {
        // -2 to adjust for the jump offset itself
        let jump = self.current_chunk().len() - offset - 2;
        match u16::try_from(jump) {
            Ok(jump) => self.current_chunk().patch_bytes(offset, &jump.to_le_bytes()),
            Err(..) => self.error(ErrorKind::JumpTooLarge),
        }
    }

    fn emit_loop(&mut self, loop_start: usize) {
        self.emit_instr(OpCode::Loop);

        // +2 to include the operand of the loop instruction
        let jump = self.current_chunk().len() - loop_start + 2;
        let jump = u16::try_from(jump).unwrap_or_else(|_| {
            self.error(ErrorKind::LoopTooLarge);
            0
        });

        for byte in jump.to_le_bytes() {
            self.emit_byte(byte);
        }
    }

    // Declarations

    fn declaration(&mut self) {
        if self.match_token(TokenType::Class) {
            self.class_declaration();
        } else if self.match_token(TokenType::Fun) {
            self.fun_declaration();
        } else if self.match_token(TokenType::Var) {
            self.var_declaration();
        } else {
            self.statement();
        }

        if self.panic_mode {
            self.synchronize();
        }
    }

    fn class_declaration(&mut self) {
        self.consume(TokenType::Identifier, "Expect class name.");
        let class_name = self.previous.lexeme;
        let name_cid = self.identifier_const(class_name);
        self.declare_variable();

        self.emit_instr_byte(OpCode::Class, name_cid);
        self.define_variable(name_cid);

        // load the class back so that methods can be attached to it
        self.named_variable(class_name, false);
        self.consume(TokenType::OpenBrace, "Expect '{' before class body.");
        while !self.check(TokenType::CloseBrace) && !self.check(TokenType::EOF) {
            self.method();
        }
        self.consume(TokenType::CloseBrace, "Expect '}' after class body.");
        self.emit_instr(OpCode::Pop);
    }

    fn method(&mut self) {
        self.consume(TokenType::Identifier, "Expect method name.");
        let name = self.previous.lexeme;
        let name_cid = self.identifier_const(name);

        let kind =
            if name == language::INIT_METHOD { FunctionKind::Initializer }
            else { FunctionKind::Method };

        self.function(kind);
        self.emit_instr_byte(OpCode::Method, name_cid);
    }

    fn fun_declaration(&mut self) {
        let global = self.parse_variable("Expect function name.");
        // a function may refer to itself
        self.mark_initialized();
        self.function(FunctionKind::Function);
        self.define_variable(global);
    }

    fn function(&mut self, kind: FunctionKind) {
        let name = self.previous.lexeme;
        self.begin_function(name, kind);
        self.state_mut().begin_scope();

        self.consume(TokenType::OpenParen, "Expect '(' after function name.");
        if !self.check(TokenType::CloseParen) {
            let mut arity = 0;
            loop {
                arity += 1;
                if arity > MAX_PARAMS {
                    self.error_at_current(ErrorKind::TooManyParams);
                }
                self.state_mut().function_mut().set_arity(arity);

                let cid = self.parse_variable("Expect parameter name.");
                self.define_variable(cid);

                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::CloseParen, "Expect ')' after parameters.");
        self.consume(TokenType::OpenBrace, "Expect '{' before function body.");
        self.block();

        // no end_scope(), the whole frame is discarded on return
        let function = self.end_function();
        self.emit_const(Value::Function(function));
    }

    fn var_declaration(&mut self) {
        let global = self.parse_variable("Expect variable name.");

        if self.match_token(TokenType::OpAssign) {
            self.expression();
        } else {
            self.emit_instr(OpCode::Nil);
        }
        self.consume(TokenType::Semicolon, "Expect ';' after variable declaration.");

        self.define_variable(global);
    }

    // Variables

    fn parse_variable(&mut self, message: &'static str) -> ConstID {
        self.consume(TokenType::Identifier, message);

        self.declare_variable();
        if !self.state().is_global_scope() {
            return 0;
        }

        self.identifier_const(self.previous.lexeme)
    }

    fn declare_variable(&mut self) {
        if self.state().is_global_scope() {
            return;
        }

        let name = self.previous;
        if self.state().is_declared_in_scope(name.lexeme) {
            self.error(ErrorKind::LocalRedeclared);
        }

        if let Err(error) = self.state_mut().add_local(name.lexeme, name.line) {
            self.report(error);
        }
    }

    fn mark_initialized(&mut self) {
        if self.state().is_global_scope() {
            return;
        }
        self.state_mut().mark_initialized();
    }

    fn define_variable(&mut self, global: ConstID) {
        if !self.state().is_global_scope() {
            self.mark_initialized();
            return;
        }
        self.emit_instr_byte(OpCode::DefineGlobal, global);
    }

    fn resolve_local(&mut self, name: &str) -> Option<LocalIndex> {
        let (index, initialized) = self.state().resolve_local(name)
            .map(|(index, local)| (index, local.is_initialized()))?;

        if !initialized {
            self.error(ErrorKind::LocalOwnInitializer);
        }
        Some(index)
    }

    fn named_variable(&mut self, name: &'s str, can_assign: bool) {
        let (load, store, arg) = match self.resolve_local(name) {
            Some(index) => (OpCode::LoadLocal, OpCode::StoreLocal, index),
            None => (OpCode::LoadGlobal, OpCode::StoreGlobal, self.identifier_const(name)),
        };

        if can_assign && self.match_token(TokenType::OpAssign) {
            self.expression();
            self.emit_instr_byte(store, arg);
        } else {
            self.emit_instr_byte(load, arg);
        }
    }

    // Statements

    fn statement(&mut self) {
        if self.match_token(TokenType::Print) {
            self.print_statement();
        } else if self.match_token(TokenType::For) {
            self.for_statement();
        } else if self.match_token(TokenType::If) {
            self.if_statement();
        } else if self.match_token(TokenType::Return) {
            self.return_statement();
        } else if self.match_token(TokenType::While) {
            self.while_statement();
        } else if self.match_token(TokenType::OpenBrace) {
            self.state_mut().begin_scope();
            self.block();
            self.end_scope();
        } else {
            self.expression_statement();
        }
    }

    fn block(&mut self) {
        while !self.check(TokenType::CloseBrace) && !self.check(TokenType::EOF) {
            self.declaration();
        }
        self.consume(TokenType::CloseBrace, "Expect '}' after block.");
    }

    fn end_scope(&mut self) {
        let count = self.state_mut().end_scope();
        for _ in 0..count {
            self.emit_instr(OpCode::Pop);
        }
    }

    fn print_statement(&mut self) {
        self.expression();
        self.consume(TokenType::Semicolon, "Expect ';' after value.");
        self.emit_instr(OpCode::Print);
    }

    fn expression_statement(&mut self) {
        self.expression();
        self.consume(TokenType::Semicolon, "Expect ';' after expression.");
        self.emit_instr(OpCode::Pop);
    }

    fn if_statement(&mut self) {
        self.consume(TokenType::OpenParen, "Expect '(' after 'if'.");
        self.expression();
        self.consume(TokenType::CloseParen, "Expect ')' after condition.");

        let then_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_instr(OpCode::Pop);
        self.statement();

        let else_jump = self.emit_jump(OpCode::Jump);
        self.patch_jump(then_jump);
        self.emit_instr(OpCode::Pop);

        if self.match_token(TokenType::Else) {
            self.statement();
        }
        self.patch_jump(else_jump);
    }

    fn while_statement(&mut self) {
        let loop_start = self.current_chunk().len();

        self.consume(TokenType::OpenParen, "Expect '(' after 'while'.");
        self.expression();
        self.consume(TokenType::CloseParen, "Expect ')' after condition.");

        let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
        self.emit_instr(OpCode::Pop);
        self.statement();
        self.emit_loop(loop_start);

        self.patch_jump(exit_jump);
        self.emit_instr(OpCode::Pop);
    }

    fn for_statement(&mut self) {
        self.state_mut().begin_scope();

        self.consume(TokenType::OpenParen, "Expect '(' after 'for'.");
        if self.match_token(TokenType::Semicolon) {
            // no initializer
        } else if self.match_token(TokenType::Var) {
            self.var_declaration();
        } else {
            self.expression_statement();
        }

        let mut loop_start = self.current_chunk().len();

        let mut exit_jump = None;
        if !self.match_token(TokenType::Semicolon) {
            self.expression();
            self.consume(TokenType::Semicolon, "Expect ';' after loop condition.");

            exit_jump = Some(self.emit_jump(OpCode::JumpIfFalse));
            self.emit_instr(OpCode::Pop);
        }

        // the increment runs after the body, so jump over it on the way in
        if !self.match_token(TokenType::CloseParen) {
            let body_jump = self.emit_jump(OpCode::Jump);
            let increment_start = self.current_chunk().len();

            self.expression();
            self.emit_instr(OpCode::Pop);
            self.consume(TokenType::CloseParen, "Expect ')' after for clauses.");

            self.emit_loop(loop_start);
            loop_start = increment_start;
            self.patch_jump(body_jump);
        }

        self.statement();
        self.emit_loop(loop_start);

        if let Some(exit_jump) = exit_jump {
            self.patch_jump(exit_jump);
            self.emit_instr(OpCode::Pop);
        }

        self.end_scope();
    }

    fn return_statement(&mut self) {
        if self.state().kind() == FunctionKind::Script {
            self.error(ErrorKind::ReturnFromTopLevel);
        }

        if self.match_token(TokenType::Semicolon) {
            self.emit_return();
        } else {
            if self.state().kind() == FunctionKind::Initializer {
                self.error(ErrorKind::ReturnValueFromInit);
            }

            self.expression();
            self.consume(TokenType::Semicolon, "Expect ';' after return value.");
            self.emit_instr(OpCode::Return);
        }
    }

    // Expressions

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();

        let prefix = match get_rule(self.previous.kind).prefix {
            Some(prefix) => prefix,
            None => {
                self.error(ErrorKind::ExpectedExpression);
                return;
            }
        };

        let can_assign = precedence <= Precedence::Assignment;
        prefix(self, can_assign);

        while precedence <= get_rule(self.current.kind).precedence {
            self.advance();
            if let Some(infix) = get_rule(self.previous.kind).infix {
                infix(self, can_assign);
            }
        }

        if can_assign && self.match_token(TokenType::OpAssign) {
            self.error(ErrorKind::InvalidAssignmentTarget);
        }
    }

    fn grouping(&mut self, _can_assign: bool) {
        self.expression();
        self.consume(TokenType::CloseParen, "Expect ')' after expression.");
    }

    fn number(&mut self, _can_assign: bool) {
        match self.previous.lexeme.parse::<FloatType>() {
            Ok(value) => self.emit_const(Value::Number(value)),
            Err(..) => self.error(ErrorKind::InvalidNumber),
        }
    }

    fn string(&mut self, _can_assign: bool) {
        // strip the quotes
        let lexeme = self.previous.lexeme;
        let text = &lexeme[1..(lexeme.len() - 1)];
        self.emit_const(Value::from(text));
    }

    fn literal(&mut self, _can_assign: bool) {
        match self.previous.kind {
            TokenType::False => self.emit_instr(OpCode::False),
            TokenType::True => self.emit_instr(OpCode::True),
            TokenType::Nil => self.emit_instr(OpCode::Nil),
            _ => unreachable!(),
        }
    }

    fn variable(&mut self, can_assign: bool) {
        self.named_variable(self.previous.lexeme, can_assign);
    }

    fn this(&mut self, _can_assign: bool) {
        if !self.state().kind().has_receiver() {
            self.error(ErrorKind::ThisOutsideClass);
            return;
        }
        self.named_variable(language::THIS_NAME, false);
    }

    fn super_(&mut self, _can_assign: bool) {
        self.error(ErrorKind::SuperWithoutSuperclass);
    }

    fn unary(&mut self, _can_assign: bool) {
        let operator = self.previous.kind;

        self.parse_precedence(Precedence::Unary);

        match operator {
            TokenType::OpSub => self.emit_instr(OpCode::Neg),
            TokenType::OpNot => self.emit_instr(OpCode::Not),
            _ => unreachable!(),
        }
    }

    fn binary(&mut self, _can_assign: bool) {
        let operator = self.previous.kind;

        let rule = get_rule(operator);
        self.parse_precedence(rule.precedence.next());

        match operator {
            TokenType::OpAdd => self.emit_instr(OpCode::Add),
            TokenType::OpSub => self.emit_instr(OpCode::Sub),
            TokenType::OpMul => self.emit_instr(OpCode::Mul),
            TokenType::OpDiv => self.emit_instr(OpCode::Div),

            TokenType::OpEQ => self.emit_instr(OpCode::EQ),
            TokenType::OpGT => self.emit_instr(OpCode::GT),
            TokenType::OpLT => self.emit_instr(OpCode::LT),

            // negated forms
            TokenType::OpNE => { self.emit_instr(OpCode::EQ); self.emit_instr(OpCode::Not); },
            TokenType::OpGE => { self.emit_instr(OpCode::LT); self.emit_instr(OpCode::Not); },
            TokenType::OpLE => { self.emit_instr(OpCode::GT); self.emit_instr(OpCode::Not); },

            _ => unreachable!(),
        }
    }

    fn and(&mut self, _can_assign: bool) {
        let end_jump = self.emit_jump(OpCode::JumpIfFalse);

        self.emit_instr(OpCode::Pop);
        self.parse_precedence(Precedence::And);

        self.patch_jump(end_jump);
    }

    fn or(&mut self, _can_assign: bool) {
        let else_jump = self.emit_jump(OpCode::JumpIfFalse);
        let end_jump = self.emit_jump(OpCode::Jump);

        self.patch_jump(else_jump);
        self.emit_instr(OpCode::Pop);

        self.parse_precedence(Precedence::Or);
        self.patch_jump(end_jump);
    }

    fn call(&mut self, _can_assign: bool) {
        let nargs = self.argument_list();
        self.emit_instr_byte(OpCode::Call, nargs);
    }

    fn argument_list(&mut self) -> u8 {
        let mut nargs: usize = 0;
        if !self.check(TokenType::CloseParen) {
            loop {
                self.expression();
                if nargs == MAX_ARGS {
                    self.error(ErrorKind::TooManyArgs);
                }
                nargs += 1;

                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::CloseParen, "Expect ')' after arguments.");

        u8::try_from(nargs).unwrap_or(u8::MAX)
    }

    fn dot(&mut self, can_assign: bool) {
        self.consume(TokenType::Identifier, "Expect property name after '.'.");
        let name_cid = self.identifier_const(self.previous.lexeme);

        if can_assign && self.match_token(TokenType::OpAssign) {
            self.expression();
            self.emit_instr_byte(OpCode::StoreProperty, name_cid);
        } else {
            self.emit_instr_byte(OpCode::LoadProperty, name_cid);
        }
    }
}

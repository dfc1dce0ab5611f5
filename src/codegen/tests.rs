#![cfg(test)]

use std::rc::Rc;

use crate::codegen::{compile, Compiler, CompileOptions, Chunk, OpCode};
use crate::runtime::{Value, Function, FunctionKind};


fn compile_ok(source: &str) -> Rc<Function> {
    let output = compile(source);
    assert!(!output.diagnostics.has_errors(), "{:?}", output.diagnostics);
    output.function.expect("compiled function")
}

fn opcodes(chunk: &Chunk) -> Vec<OpCode> {
    let mut opcodes = Vec::new();
    let mut offset = 0;
    while offset < chunk.len() {
        let opcode = OpCode::from_byte(chunk.bytes()[offset])
            .unwrap_or_else(|| panic!("invalid opcode at {}", offset));

        opcodes.push(opcode);
        offset += opcode.instr_len();
    }
    opcodes
}

fn nested_functions(function: &Function) -> Vec<Rc<Function>> {
    function.chunk().consts().iter()
        .filter_map(|value| match value {
            Value::Function(function) => Some(function.clone()),
            _ => None,
        })
        .collect()
}

fn error_messages(source: &str) -> Vec<(usize, String)> {
    compile(source).diagnostics.errors()
        .map(|diagnostic| (diagnostic.line, diagnostic.message.clone()))
        .collect()
}


#[test]
fn compile_empty_script() {
    let script = compile_ok("");
    assert_eq!(script.kind(), FunctionKind::Script);
    assert_eq!(opcodes(script.chunk()), vec![ OpCode::Nil, OpCode::Return ]);
}

#[test]
fn compile_negated_comparisons() {
    let cases = [
        ("print 1 != 2;", OpCode::EQ),
        ("print 1 >= 2;", OpCode::LT),
        ("print 1 <= 2;", OpCode::GT),
    ];

    for (source, comparison) in cases {
        let script = compile_ok(source);
        assert_eq!(opcodes(script.chunk()), vec![
            OpCode::LoadConst, OpCode::LoadConst, comparison, OpCode::Not, OpCode::Print,
            OpCode::Nil, OpCode::Return,
        ], "{}", source);
    }
}

#[test]
fn compile_block_pops_locals() {
    let script = compile_ok("{ var a = 1; var b = 2; }");
    assert_eq!(opcodes(script.chunk()), vec![
        OpCode::LoadConst, OpCode::LoadConst, OpCode::Pop, OpCode::Pop,
        OpCode::Nil, OpCode::Return,
    ]);
}

#[test]
fn compile_locals_use_slots() {
    let script = compile_ok("{ var a = 1; var b = a; b = 2; }");
    let bytes = script.chunk().bytes();

    // slot 0 is reserved for the callee
    assert_eq!(bytes[2], u8::from(OpCode::LoadLocal));
    assert_eq!(bytes[3], 1);
    assert_eq!(bytes[6], u8::from(OpCode::StoreLocal));
    assert_eq!(bytes[7], 2);
}

#[test]
fn compile_dedups_identifier_consts() {
    let script = compile_ok("var x = 1;\nx = x + 1;\nprint x;");

    let names = script.chunk().consts().iter()
        .filter(|value| value.as_str() == Some("x"))
        .count();

    assert_eq!(names, 1);
}

#[test]
fn compile_patches_if_jumps() {
    let script = compile_ok("if (true) print 1;");
    let chunk = script.chunk();

    assert_eq!(opcodes(chunk), vec![
        OpCode::True, OpCode::JumpIfFalse, OpCode::Pop, OpCode::LoadConst, OpCode::Print,
        OpCode::Jump, OpCode::Pop, OpCode::Nil, OpCode::Return,
    ]);

    // then-jump lands on the pop for the else branch, else-jump lands after it
    assert_eq!(chunk.read_u16(2), 7);
    assert_eq!(chunk.read_u16(9), 1);
}

#[test]
fn compile_loop_jumps_back_to_condition() {
    let script = compile_ok("while (false) {}");
    let chunk = script.chunk();

    assert_eq!(opcodes(chunk), vec![
        OpCode::False, OpCode::JumpIfFalse, OpCode::Pop, OpCode::Loop, OpCode::Pop,
        OpCode::Nil, OpCode::Return,
    ]);

    assert_eq!(chunk.read_u16(2), 4);
    assert_eq!(chunk.read_u16(6), 8);
}

#[test]
fn compile_function_declaration() {
    let script = compile_ok("fn add(a, b) { return a + b; }");

    let functions = nested_functions(&script);
    assert_eq!(functions.len(), 1);

    let add = &functions[0];
    assert_eq!(add.name(), "add");
    assert_eq!(add.arity(), 2);
    assert_eq!(add.kind(), FunctionKind::Function);
    assert!(!add.is_external_entry());

    assert_eq!(opcodes(add.chunk()), vec![
        OpCode::LoadLocal, OpCode::LoadLocal, OpCode::Add, OpCode::Return,
        OpCode::Nil, OpCode::Return,
    ]);
}

#[test]
fn compile_class_methods() {
    let script = compile_ok("class A {\n  init() {}\n  m() {}\n}");

    assert_eq!(opcodes(script.chunk()), vec![
        OpCode::Class, OpCode::DefineGlobal, OpCode::LoadGlobal,
        OpCode::LoadConst, OpCode::Method,
        OpCode::LoadConst, OpCode::Method,
        OpCode::Pop, OpCode::Nil, OpCode::Return,
    ]);

    let methods = nested_functions(&script);
    let kinds = methods.iter().map(|method| method.kind()).collect::<Vec<_>>();
    assert_eq!(kinds, vec![ FunctionKind::Initializer, FunctionKind::Method ]);

    // initializers implicitly return the receiver
    assert_eq!(opcodes(methods[0].chunk()), vec![ OpCode::LoadLocal, OpCode::Return ]);
}

#[test]
fn compile_records_lines() {
    let script = compile_ok("print 1;\n\nprint 2;");
    let chunk = script.chunk();

    assert_eq!(chunk.line(0), 1);
    assert_eq!(chunk.line(3), 3);
}

#[test]
fn compile_marks_external_entries() {
    let options = CompileOptions::new().mark_external("kernel");
    let output = Compiler::with_options("fn kernel(x) {}\nfn helper() {}", options).compile();

    assert!(output.diagnostics.is_empty());
    let script = output.function.expect("compiled function");

    let entries = nested_functions(&script).iter()
        .map(|function| (function.name().to_string(), function.is_external_entry()))
        .collect::<Vec<_>>();

    assert_eq!(entries, vec![ ("kernel".to_string(), true), ("helper".to_string(), false) ]);
}

#[test]
fn compile_errors_produce_no_function() {
    let output = compile("print 1 +;\nvar = 3;\nprint 2;");

    assert!(!output.is_ok());
    assert!(output.function.is_none());

    let errors = output.diagnostics.errors()
        .map(|diagnostic| (diagnostic.line, diagnostic.message.as_str()))
        .collect::<Vec<_>>();

    assert_eq!(errors, vec![
        (1, "at ';': Expect expression."),
        (2, "at '=': Expect variable name."),
    ]);
}

#[test]
fn compile_error_unterminated_string() {
    assert_eq!(error_messages("print \"oops;"), vec![ (1, "Unterminated string.".to_string()) ]);
}

#[test]
fn compile_error_missing_paren() {
    assert_eq!(
        error_messages("print (1 + 2;"),
        vec![ (1, "at ';': Expect ')' after expression.".to_string()) ],
    );
}

#[test]
fn compile_error_too_many_locals() {
    let mut source = String::from("{\n");
    for idx in 0..256 {
        source.push_str(&format!("var a{};\n", idx));
    }
    source.push_str("}\n");

    // slot 0 is taken, so the 256th declaration overflows
    let errors = error_messages(&source);
    assert_eq!(errors, vec![ (257, "at 'a255': Too many local variables in function.".to_string()) ]);
}

#[test]
fn compile_error_too_many_consts() {
    let source = (0..=256)
        .map(|idx| format!("print {};", idx))
        .collect::<Vec<_>>()
        .join("\n");

    let errors = error_messages(&source);
    assert_eq!(errors, vec![ (257, "at '256': Too many constants in one chunk.".to_string()) ]);
}

#[test]
fn compile_error_too_many_params() {
    let params = (0..256)
        .map(|idx| format!("p{}", idx))
        .collect::<Vec<_>>()
        .join(", ");

    let errors = error_messages(&format!("fn f({}) {{}}", params));
    assert_eq!(errors, vec![ (1, "at 'p255': Can't have more than 255 parameters.".to_string()) ]);
}

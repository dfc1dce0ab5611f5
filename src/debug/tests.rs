#![cfg(test)]

use std::rc::Rc;

use crate::codegen::compile;
use crate::runtime::Function;
use crate::debug::{Disassembler, disassemble_all, TraceSite, Traceback};


fn compile_ok(source: &str) -> Rc<Function> {
    compile(source).function.expect("compiled function")
}


#[test]
fn disassemble_simple_chunk() {
    let script = compile_ok("print 1;");
    let listing = Disassembler::new(script.chunk()).with_title("test").to_string();
    let lines = listing.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "== test ==");
    assert!(lines[1].starts_with("0000    1 OP_LD_CONST"), "{}", lines[1]);
    assert!(lines[1].ends_with(" 1"), "{}", lines[1]);
    assert_eq!(lines[2], "0002    | OP_PRINT");
    assert_eq!(lines[3], "0003    | OP_NIL");
    assert_eq!(lines[4], "0004    | OP_RETURN");
}

#[test]
fn disassemble_shows_jump_targets() {
    let script = compile_ok("if (true) print 1;");
    let listing = Disassembler::new(script.chunk()).to_string();

    let jump = listing.lines()
        .find(|line| line.contains("OP_JUMP_FALSE"))
        .expect("conditional jump");

    assert!(jump.ends_with("-> 0011"), "{}", jump);
}

#[test]
fn disassemble_quotes_strings() {
    let script = compile_ok("print \"hello\";");
    let listing = Disassembler::new(script.chunk()).to_string();
    assert!(listing.contains("\"hello\""));
}

#[test]
fn disassemble_trims_long_non_ascii_strings() {
    let script = compile_ok("print \"ééééééééééééééééééé\";");
    let listing = disassemble_all(&script);
    assert!(listing.contains("\"ééééééééééééé...\""), "{}", listing);
}

#[test]
fn disassemble_keeps_short_strings() {
    let script = compile_ok("print \"ééééé\";");
    let listing = Disassembler::new(script.chunk()).to_string();
    assert!(listing.contains("\"ééééé\""));
}

#[test]
fn disassemble_single_instruction() {
    let script = compile_ok("print 1;");
    let dasm = Disassembler::new(script.chunk());
    assert_eq!(dasm.instr_at(2).to_string(), "0002    | OP_PRINT");
}

#[test]
fn disassemble_nested_functions_in_order() {
    let script = compile_ok("fn f() {}\nfn g() {}");
    let listing = disassemble_all(&script);

    let script_pos = listing.find("== <script> ==").expect("script listing");
    let f_pos = listing.find("== <fn f> ==").expect("f listing");
    let g_pos = listing.find("== <fn g> ==").expect("g listing");

    assert!(script_pos < f_pos && f_pos < g_pos);
}

#[test]
fn traceback_formatting() {
    let sites = vec![
        TraceSite::new(Some(Rc::from("inner")), 3),
        TraceSite::new(None, 7),
    ];

    let traceback = Traceback::new(&sites);
    assert!(!traceback.is_empty());
    assert_eq!(traceback.to_string(), "[line 3] in inner()\n[line 7] in script\n");

    assert!(Traceback::new(&[]).is_empty());
}

use std::io::{self, Write};
use std::path::PathBuf;
use clap::{Command, Arg, ArgMatches};

use denrim::{Denrim, compile};
use denrim::frontend;
use denrim::source::{ScriptSource, SourceType};
use denrim::debug::disassemble_all;
use denrim::stdlib;

fn main() {
    env_logger::init();

    let app = Command::new("denrim")
        .version(clap::crate_version!())
        .about("An interpreter for the Denrim scripting language")
        .arg(
            Arg::new("file")
            .index(1)
            .help("Path to input script file")
            .value_name("FILE")
        )
        .arg(
            Arg::new("cmd")
            .short('c')
            .help("Execute a snippet then exit")
            .value_name("CMD")
        )
        .arg(
            Arg::new("interactive")
            .short('i')
            .help("Drop into an interactive REPL after executing")
        )
        .arg(
            Arg::new("disassemble")
            .short('d')
            .help("Print compiled bytecode instead of executing")
        );

    let version = app.get_version().unwrap_or("");
    let args = app.get_matches();

    let mut script = None;
    if let Some(s) = args.value_of("cmd") {
        let source = SourceType::String(s.to_string());
        script = Some(ScriptSource::new("<cmd>", source));
    } else if let Some(s) = args.value_of("file") {
        let source = SourceType::File(PathBuf::from(s));
        script = Some(ScriptSource::new(s, source));
    }

    let mut engine = Denrim::new();
    stdlib::install_prelude(engine.vm_mut());

    let script = match script {
        Some(script) => script,
        None => {
            start_repl(&args, version, engine);
            return;
        }
    };

    if args.is_present("disassemble") {
        disassemble(&script);
    } else if execute(&mut engine, &script) && args.is_present("interactive") {
        start_repl(&args, version, engine);
    }
}

fn start_repl(_args: &ArgMatches, version: &str, engine: Denrim) {
    println!("\nDenrim Version {}\n", version);

    let mut repl = Repl::new(engine);
    repl.run();
}

fn read_source(script: &ScriptSource) -> Option<String> {
    match script.read_text() {
        Ok(text) => Some(text),
        Err(error) => {
            println!("Error reading source: {}.", error);
            None
        }
    }
}

fn execute(engine: &mut Denrim, script: &ScriptSource) -> bool {
    let source_text = match read_source(script) {
        Some(text) => text,
        None => return false,
    };

    let diagnostics = engine.execute(&source_text);
    if !diagnostics.is_empty() {
        println!("Errors in {}:\n", script);
        frontend::print_diagnostics(&diagnostics, &source_text);
    }
    !diagnostics.has_errors()
}

fn disassemble(script: &ScriptSource) {
    let source_text = match read_source(script) {
        Some(text) => text,
        None => return,
    };

    let output = compile(&source_text);
    match output.function {
        Some(function) => print!("{}", disassemble_all(&function)),
        None => {
            println!("Errors in {}:\n", script);
            frontend::print_diagnostics(&output.diagnostics, &source_text);
        }
    }
}


//////// REPL ////////


const PROMT_START: &str = ">>> ";
const PROMT_CONTINUE: &str = "... ";

struct Repl {
    engine: Denrim,
}

enum ReadLine {
    Ok(String),
    Empty,
    Restart,
    Quit,
}

impl Repl {
    pub fn new(engine: Denrim) -> Self {
        Self { engine }
    }

    fn read_line(&self, prompt: &'static str) -> ReadLine {
        let mut stdout = io::stdout();
        if stdout.write_all(prompt.as_bytes()).and_then(|_| stdout.flush()).is_err() {
            return ReadLine::Quit;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => return ReadLine::Quit,  // EOF
            Ok(..) => { },
            Err(error) => {
                println!("Could not read input: {}", error);
                return ReadLine::Restart;
            }
        }

        input = input.trim_end().to_string();

        if input.is_empty() {
            return ReadLine::Empty;
        }

        if input == "quit" || input.contains('\x04') {
            return ReadLine::Quit;
        }

        ReadLine::Ok(input)
    }

    pub fn run(&mut self) {
        loop {
            let mut input = String::new();

            loop {
                let prompt =
                    if input.is_empty() { PROMT_START }
                    else { PROMT_CONTINUE };

                match self.read_line(prompt) {
                    ReadLine::Quit => return,
                    ReadLine::Restart => continue,
                    ReadLine::Empty => {
                        if input.is_empty() { continue }
                        else { break }
                    },
                    ReadLine::Ok(line) => {
                        input.push_str(&line);
                        input.push('\n');

                        // keep reading while the only complaint is running out of input
                        if !is_incomplete(&input) {
                            break
                        }
                    }
                }
            }

            let diagnostics = self.engine.execute(&input);
            frontend::print_diagnostics(&diagnostics, &input);
        }
    }
}

fn is_incomplete(input: &str) -> bool {
    compile(input).diagnostics.errors()
        .any(|diagnostic| diagnostic.message.starts_with("at end"))
}

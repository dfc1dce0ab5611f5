//! output/error reporting and formatting

use std::fmt;
use std::fmt::Formatter;
use crate::utils;
use crate::diagnostics::{Diagnostic, Diagnostics};


pub fn render_diagnostic<'a>(diagnostic: &'a Diagnostic, source_text: &'a str) -> impl fmt::Display + 'a {
    utils::delegate_fmt(|fmt| fmt_diagnostic(fmt, diagnostic, source_text))
}

pub fn fmt_diagnostic(fmt: &mut Formatter<'_>, diagnostic: &Diagnostic, source_text: &str) -> fmt::Result {
    // Write error message
    let title = utils::title_case_string(&diagnostic.severity.to_string());
    writeln!(fmt, "{} [line {}]: {}", title, diagnostic.line, diagnostic.message)?;

    // Write source line
    fmt_source_line(fmt, diagnostic.line, source_text)
}

fn fmt_source_line(fmt: &mut Formatter<'_>, lineno: usize, source_text: &str) -> fmt::Result {
    let line = lineno.checked_sub(1)
        .and_then(|idx| source_text.lines().nth(idx));

    if let Some(line) = line {
        let margin = format!("{: >3}", lineno);
        writeln!(fmt, "{}|    {}", margin, line.trim_end())?;
    }
    Ok(())
}

pub fn print_diagnostics(diagnostics: &Diagnostics, source_text: &str) {
    for diagnostic in diagnostics.iter() {
        println!("{}", render_diagnostic(diagnostic, source_text));
    }
}

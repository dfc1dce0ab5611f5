use std::fmt;
use std::rc::Rc;


/// Traceback information
#[derive(Debug, Clone)]
pub struct TraceSite {
    function: Option<Rc<str>>,  // None for the top-level script
    line: usize,
}

impl TraceSite {
    pub fn new(function: Option<Rc<str>>, line: usize) -> Self {
        Self { function, line }
    }

    pub fn function(&self) -> Option<&str> { self.function.as_deref() }
    pub fn line(&self) -> usize { self.line }
}

impl fmt::Display for TraceSite {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.function.as_deref() {
            Some(name) => write!(fmt, "[line {}] in {}()", self.line, name),
            None => write!(fmt, "[line {}] in script", self.line),
        }
    }
}


pub struct Traceback<'a> {
    sites: &'a [TraceSite],
}

impl<'a> Traceback<'a> {
    pub fn new(sites: &'a [TraceSite]) -> Self {
        Self { sites }
    }

    pub fn is_empty(&self) -> bool { self.sites.is_empty() }
}

// innermost call first, the way the error unwound
impl fmt::Display for Traceback<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        for site in self.sites.iter() {
            writeln!(fmt, "{}", site)?;
        }
        Ok(())
    }
}

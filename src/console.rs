//! Console output.
//!
//! Every message goes to two places: a `tracing` event (which ends up in the
//! log file) and a line on the console. Console lines may be coloured; the
//! colouring strategy is picked once when the [`Reporter`] is built.

use colored::Colorize;
use std::cell::RefCell;
use std::io::{self, Write};

/// Decorates parts of console messages.
pub trait Palette {
    /// Things that were created or found, e.g. folder and vendor names.
    fn highlight(&self, text: &str) -> String;
    /// Filesystem locations.
    fn location(&self, text: &str) -> String;
    fn caution(&self, text: &str) -> String;
    fn failure(&self, text: &str) -> String;
}

/// No decoration at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Palette for Plain {
    fn highlight(&self, text: &str) -> String {
        text.to_string()
    }

    fn location(&self, text: &str) -> String {
        text.to_string()
    }

    fn caution(&self, text: &str) -> String {
        text.to_string()
    }

    fn failure(&self, text: &str) -> String {
        text.to_string()
    }
}

/// ANSI colours via the `colored` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Colored;

impl Palette for Colored {
    fn highlight(&self, text: &str) -> String {
        text.green().to_string()
    }

    fn location(&self, text: &str) -> String {
        text.blue().to_string()
    }

    fn caution(&self, text: &str) -> String {
        text.yellow().to_string()
    }

    fn failure(&self, text: &str) -> String {
        text.red().to_string()
    }
}

/// Picks the palette for this run.
pub fn palette(color: bool) -> Box<dyn Palette> {
    if color {
        Box::new(Colored)
    } else {
        Box::new(Plain)
    }
}

/// Writes each message to the console and to `tracing`.
///
/// Messages are closures over a [`Palette`] so the same text can be rendered
/// plain for the log and decorated for the terminal.
pub struct Reporter {
    palette: Box<dyn Palette>,
    out: RefCell<Box<dyn Write>>,
}

impl Reporter {
    pub fn new(palette: Box<dyn Palette>) -> Self {
        Self::with_writer(palette, Box::new(io::stdout()))
    }

    pub fn with_writer(palette: Box<dyn Palette>, out: Box<dyn Write>) -> Self {
        Self {
            palette,
            out: RefCell::new(out),
        }
    }

    /// Discards console output; events still reach `tracing`.
    pub fn silent() -> Self {
        Self::with_writer(Box::new(Plain), Box::new(io::sink()))
    }

    pub fn info(&self, message: impl Fn(&dyn Palette) -> String) {
        tracing::info!("{}", message(&Plain));
        self.print(message(self.palette.as_ref()));
    }

    /// Per-file detail; logged at debug level.
    pub fn detail(&self, message: impl Fn(&dyn Palette) -> String) {
        tracing::debug!("{}", message(&Plain));
        self.print(message(self.palette.as_ref()));
    }

    pub fn warn(&self, message: impl Fn(&dyn Palette) -> String) {
        tracing::warn!("{}", message(&Plain));
        self.print(message(self.palette.as_ref()));
    }

    pub fn error(&self, message: impl Fn(&dyn Palette) -> String) {
        tracing::error!("{}", message(&Plain));
        self.print(message(self.palette.as_ref()));
    }

    fn print(&self, line: String) {
        let mut out = self.out.borrow_mut();
        // A closed stdout shouldn't abort the copy job; the log file still has it.
        let _ = writeln!(out, "{line}");
    }
}

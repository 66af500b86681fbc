//! # tfwheels User Output
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! `Ui` is the single output sink for user-facing text: Info/Warn/Error
//! lines, help screens and follow-up instructions. Diagnostics go through
//! `tracing` instead.
//!
//! ## Architecture
//!
//! The sink is chosen once at the composition root and handed to whoever
//! needs to print:
//! - `Ui::stdout()`: stdout (errors to stderr), colored with `colored` only
//!   when stdout is a terminal;
//! - `Ui::buffer()`: captures plain text in memory; clones share the buffer,
//!   so a test can keep one clone and inspect what was printed.
//!
use colored::Colorize;
use std::cell::RefCell;
use std::io::IsTerminal;
use std::rc::Rc;

#[derive(Clone, Debug)]
enum Sink {
    Stdout { color: bool },
    Buffer(Rc<RefCell<String>>),
}

#[derive(Clone, Debug)]
pub struct Ui {
    sink: Sink,
}

impl Ui {
    pub fn stdout() -> Self {
        Self {
            sink: Sink::Stdout {
                color: std::io::stdout().is_terminal(),
            },
        }
    }

    pub fn buffer() -> Self {
        Self {
            sink: Sink::Buffer(Rc::new(RefCell::new(String::new()))),
        }
    }

    /// Everything printed so far. Always empty for the stdout sink.
    pub fn contents(&self) -> String {
        match &self.sink {
            Sink::Buffer(buffer) => buffer.borrow().clone(),
            Sink::Stdout { .. } => String::new(),
        }
    }

    fn color(&self) -> bool {
        matches!(self.sink, Sink::Stdout { color: true })
    }

    fn emit(&self, text: &str, to_stderr: bool) {
        match &self.sink {
            Sink::Stdout { .. } if to_stderr => eprintln!("{}", text),
            Sink::Stdout { .. } => println!("{}", text),
            Sink::Buffer(buffer) => {
                let mut buffer = buffer.borrow_mut();
                buffer.push_str(text);
                buffer.push('\n');
            }
        }
    }

    pub fn line(&self, text: impl AsRef<str>) {
        self.emit(text.as_ref(), false);
    }

    pub fn blank(&self) {
        self.emit("", false);
    }

    /// `text` in bold when coloring, unchanged otherwise.
    pub fn bold(&self, text: &str) -> String {
        if self.color() {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        let marker = if self.color() {
            "Info:".cyan().to_string()
        } else {
            "Info:".to_string()
        };
        self.emit(&format!("{} {}", marker, message.as_ref()), false);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        let marker = if self.color() {
            "Warn:".yellow().bold().to_string()
        } else {
            "Warn:".to_string()
        };
        self.emit(&format!("{} {}", marker, message.as_ref()), false);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        let marker = if self.color() {
            "Error:".red().bold().to_string()
        } else {
            "Error:".to_string()
        };
        self.emit(&format!("{} {}", marker, message.as_ref()), true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_collects_plain_markers() {
        let ui = Ui::buffer();
        let handle = ui.clone();
        ui.info("Writing cluster-aws.tf");
        ui.warn("credentials expired");
        ui.error("boom");
        ui.blank();
        ui.line(ui.bold("done"));
        assert_eq!(
            handle.contents(),
            "Info: Writing cluster-aws.tf\nWarn: credentials expired\nError: boom\n\ndone\n"
        );
    }
}

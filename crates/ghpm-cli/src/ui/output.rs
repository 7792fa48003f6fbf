//! Console reporter.

use crossterm::style::Stylize;
use ghpm_core::Reporter;

/// Prints status lines to stdout and problems to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        println!();
        println!("  {}", title.bold());
    }

    fn info(&self, msg: &str) {
        println!("  {} {msg}", "·".dark_grey());
    }

    fn success(&self, msg: &str) {
        println!("  {} {msg}", "✓".green());
    }

    fn warning(&self, msg: &str) {
        eprintln!("  {} {msg}", "!".yellow().bold());
    }

    fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".red().bold());
    }
}

//! Console formatting helpers.
//!
//! The helpers return plain text with a status glyph. [`emit`] adds color
//! when stdout is a terminal.

use std::io::{self, IsTerminal, Write};

use crossterm::style::{StyledContent, Stylize};

const SUCCESS: char = '✓';
const ERROR: char = '✗';
const WARNING: char = '⚠';
const INFO: char = 'ℹ';
const SKIPPED: char = '-';

pub fn success(message: &str) -> String {
    format!("{} {}", SUCCESS, message)
}

pub fn error(message: &str) -> String {
    format!("{} {}", ERROR, message)
}

pub fn warning(message: &str) -> String {
    format!("{} {}", WARNING, message)
}

pub fn info(message: &str) -> String {
    format!("{} {}", INFO, message)
}

pub fn skipped(message: &str) -> String {
    format!("{} {}", SKIPPED, message)
}

fn styled(line: &str) -> StyledContent<&str> {
    match line.trim_start().chars().next() {
        Some(SUCCESS) => line.green(),
        Some(ERROR) => line.red(),
        Some(WARNING) => line.yellow(),
        Some(INFO) => line.blue(),
        Some(SKIPPED) => line.dim(),
        _ => line.reset(),
    }
}

/// Print each line of `text` to stdout, colored by its leading glyph.
pub fn emit(text: &str) {
    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut out = stdout.lock();
    for line in text.lines() {
        let _ = if color {
            writeln!(out, "{}", styled(line))
        } else {
            writeln!(out, "{}", line)
        };
    }
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyphs() {
        assert_eq!(success("done"), "✓ done");
        assert_eq!(error("broke"), "✗ broke");
        assert_eq!(warning("careful"), "⚠ careful");
        assert_eq!(info("note"), "ℹ note");
        assert_eq!(skipped("a: not run"), "- a: not run");
    }
}

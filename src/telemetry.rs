//! Rendering of run events for human consumption.
//!
//! Formatters turn [`Event`](crate::event_bus::Event)s into display strings
//! for sinks that write to a terminal. Color is decided once per formatter
//! from the output mode, with auto-detection based on whether stderr is a
//! terminal.

use std::io::{IsTerminal, stderr};

use crate::event_bus::Event;

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_BOLD_CYAN: &str = "\x1b[1;36m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_YELLOW: &str = "\x1b[33m";

/// Output coloring policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatterMode {
    /// Detect from the environment: colored when stderr is a terminal.
    #[default]
    Auto,
    Colored,
    Plain,
}

impl FormatterMode {
    /// Resolves `Auto` against the current environment.
    #[must_use]
    pub fn auto_detect() -> Self {
        if stderr().is_terminal() {
            Self::Colored
        } else {
            Self::Plain
        }
    }

    #[must_use]
    pub fn is_colored(self) -> bool {
        match self {
            Self::Colored => true,
            Self::Plain => false,
            Self::Auto => Self::auto_detect() == Self::Colored,
        }
    }
}

/// Renders events into displayable text.
pub trait TranscriptFormatter {
    fn render_event(&self, event: &Event) -> String;
}

/// Default formatter: a speaker header line followed by the message body.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainFormatter {
    mode: FormatterMode,
}

impl PlainFormatter {
    #[must_use]
    pub fn new(mode: FormatterMode) -> Self {
        Self { mode }
    }
}

impl TranscriptFormatter for PlainFormatter {
    fn render_event(&self, event: &Event) -> String {
        let colored = self.mode.is_colored();
        match event {
            Event::Turn(turn) => {
                if colored {
                    format!(
                        "{ANSI_BOLD_CYAN}[{} @ round {}]{ANSI_RESET}\n{}\n",
                        turn.speaker, turn.round, turn.content
                    )
                } else {
                    format!("[{} @ round {}]\n{}\n", turn.speaker, turn.round, turn.content)
                }
            }
            Event::Diagnostic(diag) => {
                let stamp = diag.when.format("%H:%M:%S");
                if colored {
                    format!(
                        "{ANSI_YELLOW}[{}]{ANSI_RESET} {ANSI_DIM}{stamp}{ANSI_RESET} {}",
                        diag.scope, diag.message
                    )
                } else {
                    format!("[{}] {stamp} {}", diag.scope, diag.message)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_turn_rendering() {
        let formatter = PlainFormatter::new(FormatterMode::Plain);
        let rendered = formatter.render_event(&Event::turn("coder", 3, "fn main() {}"));
        assert_eq!(rendered, "[coder @ round 3]\nfn main() {}\n");
    }

    #[test]
    fn colored_turn_rendering_wraps_header() {
        let formatter = PlainFormatter::new(FormatterMode::Colored);
        let rendered = formatter.render_event(&Event::turn("coder", 3, "done"));
        assert!(rendered.starts_with(ANSI_BOLD_CYAN));
        assert!(rendered.contains("[coder @ round 3]"));
    }

    #[test]
    fn diagnostic_rendering_includes_scope() {
        let formatter = PlainFormatter::new(FormatterMode::Plain);
        let rendered = formatter.render_event(&Event::diagnostic("driver", "retrying"));
        assert!(rendered.starts_with("[driver]"));
        assert!(rendered.ends_with("retrying"));
    }
}

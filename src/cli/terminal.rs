//! Terminal capability detection and colouring.

use owo_colors::{colors::css, OwoColorize};

/// Whether coloured output should be used on stdout.
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Width of the terminal, if stdout is one.
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(width, _)| width.0)
}

/// Whether the terminal is too narrow for the full table layout.
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|width| width < 80)
}

/// Colouring for status output. Plain text when colour is unsupported.
pub trait Colorize {
    /// Green, for completed actions.
    fn success(&self) -> String;
    /// Amber, for things that need attention.
    fn warning(&self) -> String;
    /// Blue, for links and ids.
    fn info(&self) -> String;
    /// Dimmed, for hints.
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), |text| text.fg::<css::Green>().to_string())
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), |text| text.fg::<css::Orange>().to_string())
    }

    fn info(&self) -> String {
        paint(self.as_ref(), |text| text.fg::<css::LightBlue>().to_string())
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), |text| text.dimmed().to_string())
    }
}

fn paint(text: &str, style: impl FnOnce(&str) -> String) -> String {
    if supports_color() {
        style(text)
    } else {
        text.to_string()
    }
}

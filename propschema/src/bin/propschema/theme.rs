//! Colors and marks for the lines the CLI prints.

use colored::{Color, Colorize};

/// Separator between an example heading and its command lines.
pub const ARROW: &str = "→";

/// What a printed line is about; decides its color and leading mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    /// Documents matched their model
    Pass,
    Fail,
    /// Nothing to show, e.g. no models or no indexes
    Notice,
    /// `--verbose` diagnostics
    Trace,
    Heading,
    /// Commands, flags and environment variable names in help text
    Literal,
}

impl Tone {
    pub const fn color(self) -> Color {
        match self {
            Tone::Pass => Color::Green,
            Tone::Fail => Color::Red,
            Tone::Notice => Color::Yellow,
            Tone::Trace => Color::BrightBlack,
            Tone::Heading => Color::Cyan,
            Tone::Literal => Color::Magenta,
        }
    }

    pub const fn mark(self) -> Option<&'static str> {
        match self {
            Tone::Pass => Some("✓"),
            Tone::Fail => Some("✗"),
            Tone::Notice => Some("!"),
            Tone::Trace => Some(ARROW),
            Tone::Heading | Tone::Literal => None,
        }
    }

    /// `message` prefixed with this tone's mark. Unmarked tones are bold.
    pub fn paint(self, message: &str) -> String {
        match self.mark() {
            Some(mark) => format!("{} {}", mark.color(self.color()), message.color(self.color())),
            None => message.color(self.color()).bold().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tones_carry_a_mark() {
        assert_eq!(Tone::Pass.mark(), Some("✓"));
        assert_eq!(Tone::Fail.mark(), Some("✗"));
        assert_eq!(Tone::Trace.mark(), Some(ARROW));
        assert_eq!(Tone::Heading.mark(), None);
    }

    #[test]
    fn painted_lines_keep_the_message() {
        let line = Tone::Notice.paint("No models are registered.");
        assert!(line.contains('!'));
        assert!(line.contains("No models are registered."));
        assert!(Tone::Heading.paint("Indexes on users").contains("Indexes on users"));
    }
}

//! Source locations for syntax-tree nodes.
//!
//! Spans are line/column regions as reported by the external parser. The
//! runtime only threads them through for error reporting and editor
//! highlighting; it never computes them itself.

use std::fmt;

/// Region of source text covered by a node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Line of the first character.
    pub first_line: u32,
    /// Column of the first character.
    pub first_column: u32,
    /// Line of the last character.
    pub last_line: u32,
    /// Column one past the last character.
    pub last_column: u32,
}

impl Span {
    pub fn new(first_line: u32, first_column: u32, last_line: u32, last_column: u32) -> Self {
        Span {
            first_line,
            first_column,
            last_line,
            last_column,
        }
    }

    /// Span of a segment within a single line.
    pub fn line(line: u32, first_column: u32, last_column: u32) -> Self {
        Span::new(line, first_column, line, last_column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first_line == self.last_line {
            write!(
                f,
                "{}:{}-{}",
                self.first_line, self.first_column, self.last_column
            )
        } else {
            write!(
                f,
                "{}:{}-{}:{}",
                self.first_line, self.first_column, self.last_line, self.last_column
            )
        }
    }
}

/// Anything that knows where it came from in the source text.
pub trait Spanned {
    fn span(&self) -> Span;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_line_display() {
        assert_eq!(Span::line(3, 4, 9).to_string(), "3:4-9");
    }

    #[test]
    fn multi_line_display() {
        assert_eq!(Span::new(1, 0, 4, 7).to_string(), "1:0-4:7");
    }

    #[test]
    fn default_is_origin() {
        assert_eq!(Span::default(), Span::new(0, 0, 0, 0));
    }
}

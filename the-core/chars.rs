use crate::line_ending::LineEnding;

#[inline]
pub fn char_is_line_ending(ch: char) -> bool {
  LineEnding::from_char(ch).is_some()
}

/// Whitespace that can make up a line's indentation.
///
/// Line endings are excluded so that a blank line never reports its line
/// ending as part of the indent.
#[inline]
pub fn char_is_indent_whitespace(ch: char) -> bool {
  ch.is_whitespace() && !char_is_line_ending(ch) && ch != '\r'
}

use ropey::RopeSlice;
use the_core::line_ending::line_end_char_index;

/// A single point in a text buffer.
///
/// `character` counts chars from the start of the line. Ordering is by line,
/// then character.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
  pub line:      usize,
  pub character: usize,
}

impl Position {
  pub const fn new(line: usize, character: usize) -> Self {
    Self { line, character }
  }

  pub const fn zero() -> Self {
    Self {
      line:      0,
      character: 0,
    }
  }

  /// Start of `line`.
  pub const fn line_start(line: usize) -> Self {
    Self::new(line, 0)
  }
}

impl From<(usize, usize)> for Position {
  fn from(value: (usize, usize)) -> Self {
    Position::new(value.0, value.1)
  }
}

/// Converts a char index into a `Position`.
pub fn pos_at_char_idx(text: RopeSlice, char_idx: usize) -> Position {
  let char_idx = char_idx.min(text.len_chars());
  let line = text.char_to_line(char_idx);
  Position::new(line, char_idx - text.line_to_char(line))
}

/// Converts a `Position` into a char index, or `None` when the line does not
/// exist or the character lies past the end of the line's content.
pub fn checked_char_idx_at_pos(text: RopeSlice, pos: Position) -> Option<usize> {
  if pos.line >= text.len_lines() {
    return None;
  }
  let line_end = line_end_char_index(&text, pos.line);
  let line_start = text.line_to_char(pos.line);
  let idx = line_start + pos.character;
  (idx <= line_end).then_some(idx)
}

/// Converts a `Position` into a char index.
///
/// If the line exceeds the number of lines, the last line is used. If the
/// character exceeds the line's content, the line end is used.
pub fn char_idx_at_pos(text: RopeSlice, pos: Position) -> usize {
  let line = pos.line.min(text.len_lines().saturating_sub(1));
  let line_start = text.line_to_char(line);
  let line_end = line_end_char_index(&text, line);
  (line_start + pos.character).min(line_end)
}

#[cfg(test)]
mod test {
  use ropey::Rope;

  use super::*;

  #[test]
  fn test_ordering() {
    assert!(Position::new(0, 9) < Position::new(1, 0));
    assert!(Position::new(1, 2) < Position::new(1, 3));
    assert_eq!(Position::new(2, 2).max(Position::new(2, 1)), Position::new(2, 2));
  }

  #[test]
  fn test_pos_at_char_idx() {
    let text = Rope::from("ab\ncd\r\n\nef");
    let slice = text.slice(..);
    assert_eq!(pos_at_char_idx(slice, 0), Position::new(0, 0));
    assert_eq!(pos_at_char_idx(slice, 2), Position::new(0, 2));
    assert_eq!(pos_at_char_idx(slice, 3), Position::new(1, 0));
    assert_eq!(pos_at_char_idx(slice, 7), Position::new(2, 0));
    assert_eq!(pos_at_char_idx(slice, 10), Position::new(3, 2));
    assert_eq!(pos_at_char_idx(slice, 100), Position::new(3, 2));
  }

  #[test]
  fn test_char_idx_at_pos() {
    let text = Rope::from("ab\ncd\r\n\nef");
    let slice = text.slice(..);
    assert_eq!(char_idx_at_pos(slice, Position::new(1, 1)), 4);
    assert_eq!(char_idx_at_pos(slice, Position::new(1, 9)), 5);
    assert_eq!(char_idx_at_pos(slice, Position::new(9, 0)), 8);
    assert_eq!(checked_char_idx_at_pos(slice, Position::new(1, 2)), Some(5));
    assert_eq!(checked_char_idx_at_pos(slice, Position::new(1, 3)), None);
    assert_eq!(checked_char_idx_at_pos(slice, Position::new(4, 0)), None);
  }
}

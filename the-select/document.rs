//! Read-only document queries needed by the transforms.
//!
//! The host owns the document. Transforms only ever ask for a line's end
//! column, its indentation, and the text covered by a selection, so that is
//! all [`Document`] exposes. [`Rope`] implements it directly.

use std::borrow::Cow;

use ropey::{
  Rope,
  RopeSlice,
};
use the_core::line_ending::{
  first_non_whitespace_char_index,
  line_end_char_index,
};

use crate::{
  position::char_idx_at_pos,
  selection::Selection,
};

pub trait Document {
  fn line_count(&self) -> usize;

  /// Character offset of the end of `line`, not including its line ending.
  fn line_end(&self, line: usize) -> usize;

  /// Column of the first non-whitespace character of `line`.
  ///
  /// Whitespace-only lines report their length.
  fn first_non_whitespace(&self, line: usize) -> usize;

  /// Text covered by `selection`, from start to end.
  fn text(&self, selection: &Selection) -> Cow<'_, str>;
}

impl Document for RopeSlice<'_> {
  fn line_count(&self) -> usize {
    self.len_lines()
  }

  fn line_end(&self, line: usize) -> usize {
    let line = clamp_line(self, line);
    line_end_char_index(self, line) - self.line_to_char(line)
  }

  fn first_non_whitespace(&self, line: usize) -> usize {
    first_non_whitespace_char_index(self, clamp_line(self, line))
  }

  fn text(&self, selection: &Selection) -> Cow<'_, str> {
    selection_text(*self, selection)
  }
}

impl Document for Rope {
  fn line_count(&self) -> usize {
    self.len_lines()
  }

  fn line_end(&self, line: usize) -> usize {
    self.slice(..).line_end(line)
  }

  fn first_non_whitespace(&self, line: usize) -> usize {
    self.slice(..).first_non_whitespace(line)
  }

  fn text(&self, selection: &Selection) -> Cow<'_, str> {
    selection_text(self.slice(..), selection)
  }
}

fn selection_text<'a>(text: RopeSlice<'a>, selection: &Selection) -> Cow<'a, str> {
  let from = char_idx_at_pos(text, selection.start());
  let to = char_idx_at_pos(text, selection.end());
  text.slice(from..to).into()
}

/// Ropes always have at least one line, so clamping keeps lookups in bounds.
fn clamp_line(text: &RopeSlice, line: usize) -> usize {
  line.min(text.len_lines().saturating_sub(1))
}

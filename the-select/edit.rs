//! Text edit batches produced by edit commands.
//!
//! An [`EditBatch`] is an ordered list of [`EditOperation`]s addressed by
//! [`Position`]s of the document *before* any of them is applied, like an
//! editor's edit builder. All operations in a batch apply atomically: the
//! whole batch is validated against the document first, and nothing changes
//! if any operation is out of bounds or overlaps another.
//!
//! ```
//! use ropey::Rope;
//! use the_select::{
//!   edit::EditBatch,
//!   position::Position,
//! };
//!
//! let mut text = Rope::from("a\nbb\n");
//! let mut batch = EditBatch::new();
//! batch.insert(Position::new(0, 0), "  ");
//! batch.delete(Position::new(1, 0), Position::new(1, 1));
//! batch.apply(&mut text).unwrap();
//! assert_eq!(text, "  a\nb\n");
//! ```
//!
//! # Position Mapping
//!
//! [`EditBatch::map_selections`] moves selections through a batch. Inserts at
//! a selection's start push the start forward, inserts at its end leave the end
//! in place, and deleted text collapses onto the start of the deletion.

use ropey::{
  Rope,
  RopeSlice,
};
use thiserror::Error;

use crate::{
  Tendril,
  position::{
    Position,
    char_idx_at_pos,
    checked_char_idx_at_pos,
    pos_at_char_idx,
  },
  selection::{
    Selection,
    SelectionSet,
  },
};

pub type Result<T> = std::result::Result<T, EditError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditError {
  #[error("position {line}:{character} is out of bounds")]
  PositionOutOfBounds { line: usize, character: usize },
  #[error("invalid delete range: start {start:?} is after end {end:?}")]
  InvalidRange { start: Position, end: Position },
  #[error("edit at {from}..{to} overlaps previous edit ending at {prev_end}")]
  Overlapping {
    prev_end: usize,
    from:     usize,
    to:       usize,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
  /// Insert text at a position.
  Insert { at: Position, text: Tendril },

  /// Delete the text between two positions.
  Delete { start: Position, end: Position },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Assoc {
  /// Stay before insertions at this position.
  Before,
  /// Move after insertions at this position.
  After,
}

/// An operation resolved to char offsets, as a `from..to` replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Change {
  from: usize,
  to:   usize,
  text: Option<Tendril>,
}

impl Change {
  fn inserted_len(&self) -> usize {
    self.text.as_ref().map_or(0, |text| text.chars().count())
  }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EditBatch {
  operations: Vec<EditOperation>,
}

impl EditBatch {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      operations: Vec::with_capacity(capacity),
    }
  }

  /// Queues an insertion. Empty text is a no-op.
  pub fn insert(&mut self, at: Position, text: impl Into<Tendril>) {
    let text = text.into();
    if text.is_empty() {
      return;
    }
    self.operations.push(EditOperation::Insert { at, text });
  }

  /// Queues a deletion of `start..end`. An empty range is a no-op.
  pub fn delete(&mut self, start: Position, end: Position) {
    if start == end {
      return;
    }
    self.operations.push(EditOperation::Delete { start, end });
  }

  pub fn operations(&self) -> &[EditOperation] {
    &self.operations
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.operations.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.operations.is_empty()
  }

  /// Resolves every operation against `text` and orders them by offset.
  ///
  /// Insertions at the same offset keep the order they were queued in.
  fn resolve(&self, text: RopeSlice) -> Result<Vec<Change>> {
    let char_idx = |pos: Position| {
      checked_char_idx_at_pos(text, pos).ok_or(EditError::PositionOutOfBounds {
        line:      pos.line,
        character: pos.character,
      })
    };

    let mut changes = Vec::with_capacity(self.operations.len());
    for operation in &self.operations {
      let change = match operation {
        EditOperation::Insert { at, text } => {
          let at = char_idx(*at)?;
          Change {
            from: at,
            to:   at,
            text: Some(text.clone()),
          }
        },
        EditOperation::Delete { start, end } => {
          if start > end {
            return Err(EditError::InvalidRange {
              start: *start,
              end:   *end,
            });
          }
          Change {
            from: char_idx(*start)?,
            to:   char_idx(*end)?,
            text: None,
          }
        },
      };
      changes.push(change);
    }

    // Stable, so same-offset insertions stay in queue order and sort ahead of
    // a deletion starting at that offset.
    changes.sort_by_key(|change| (change.from, change.to));

    let mut prev_end = 0;
    for change in &changes {
      if change.from < prev_end {
        return Err(EditError::Overlapping {
          prev_end,
          from: change.from,
          to: change.to,
        });
      }
      prev_end = prev_end.max(change.to);
    }

    Ok(changes)
  }

  /// Applies the batch to `text`. On error `text` is left untouched.
  pub fn apply(&self, text: &mut Rope) -> Result<()> {
    let changes = self.resolve(text.slice(..))?;
    apply_changes(&changes, text);
    Ok(())
  }

  /// Applies the batch to a copy of `text`.
  pub fn apply_to(&self, text: &Rope) -> Result<Rope> {
    let mut text = text.clone();
    self.apply(&mut text)?;
    Ok(text)
  }

  /// Maps every selection through the batch, keeping order and count.
  pub fn map_selections(
    &self,
    before: RopeSlice,
    after: RopeSlice,
    selections: &SelectionSet,
  ) -> Result<SelectionSet> {
    let changes = self.resolve(before)?;
    if changes.is_empty() {
      return Ok(selections.clone());
    }

    Ok(selections.clone().transform(|selection| {
      if selection.is_empty() {
        let pos = map_through(&changes, before, after, selection.active, Assoc::After);
        return Selection::caret(pos);
      }
      let start = map_through(&changes, before, after, selection.start(), Assoc::After);
      let end = map_through(&changes, before, after, selection.end(), Assoc::Before);
      if selection.is_reversed() {
        Selection::new(end, start)
      } else {
        Selection::new(start, end)
      }
    }))
  }
}

fn apply_changes(changes: &[Change], text: &mut Rope) {
  // Back to front, so earlier offsets stay valid. Same-offset insertions end
  // up in queue order because each one lands in front of the previous.
  for change in changes.iter().rev() {
    if change.from < change.to {
      text.remove(change.from..change.to);
    }
    if let Some(fragment) = &change.text {
      text.insert(change.from, fragment);
    }
  }
}

fn map_through(
  changes: &[Change],
  before: RopeSlice,
  after: RopeSlice,
  pos: Position,
  assoc: Assoc,
) -> Position {
  let idx = char_idx_at_pos(before, pos);
  pos_at_char_idx(after, map_char_idx(changes, idx, assoc))
}

fn map_char_idx(changes: &[Change], pos: usize, assoc: Assoc) -> usize {
  let mut added = 0;
  let mut removed = 0;

  for change in changes {
    if change.from > pos {
      break;
    }

    let inserted = change.inserted_len();
    if change.from == change.to && change.from == pos {
      if assoc == Assoc::After {
        added += inserted;
      }
    } else if change.to <= pos {
      added += inserted;
      removed += change.to - change.from;
    } else {
      // Inside, or at the start of, a deleted range.
      let base = change.from + added - removed;
      return match assoc {
        Assoc::After => base + inserted,
        Assoc::Before => base,
      };
    }
  }

  pos + added - removed
}

#[cfg(test)]
mod test {
  use super::*;

  fn pos(line: usize, character: usize) -> Position {
    Position::new(line, character)
  }

  #[test]
  fn test_empty_operations_are_dropped() {
    let mut batch = EditBatch::new();
    batch.insert(pos(0, 0), "");
    batch.delete(pos(0, 1), pos(0, 1));
    assert!(batch.is_empty());
  }

  #[test]
  fn test_apply_inserts_and_deletes() {
    let mut text = Rope::from("  foo\nbar\n    baz\n");
    let mut batch = EditBatch::new();
    batch.insert(pos(1, 0), "  ");
    batch.delete(pos(2, 0), pos(2, 2));
    batch.insert(pos(0, 5), "!");
    batch.apply(&mut text).unwrap();
    assert_eq!(text, "  foo!\n  bar\n  baz\n");
  }

  #[test]
  fn test_same_offset_inserts_keep_queue_order() {
    let mut text = Rope::from("x");
    let mut batch = EditBatch::new();
    batch.insert(pos(0, 0), "a");
    batch.insert(pos(0, 0), "b");
    batch.insert(pos(0, 0), "c");
    batch.apply(&mut text).unwrap();
    assert_eq!(text, "abcx");
  }

  #[test]
  fn test_insert_at_delete_start() {
    let mut text = Rope::from("hello");
    let mut batch = EditBatch::new();
    batch.delete(pos(0, 0), pos(0, 2));
    batch.insert(pos(0, 0), "J");
    batch.apply(&mut text).unwrap();
    assert_eq!(text, "Jllo");
  }

  #[test]
  fn test_out_of_bounds_leaves_text_untouched() {
    let mut text = Rope::from("ab\ncd");
    let mut batch = EditBatch::new();
    batch.insert(pos(0, 0), "x");
    batch.insert(pos(0, 3), "y");
    assert_eq!(
      batch.apply(&mut text),
      Err(EditError::PositionOutOfBounds {
        line:      0,
        character: 3,
      })
    );
    assert_eq!(text, "ab\ncd");

    let mut batch = EditBatch::new();
    batch.insert(pos(2, 0), "x");
    assert!(matches!(
      batch.apply(&mut text),
      Err(EditError::PositionOutOfBounds { line: 2, .. })
    ));
  }

  #[test]
  fn test_overlapping_deletes() {
    let mut text = Rope::from("abcdef");
    let mut batch = EditBatch::new();
    batch.delete(pos(0, 0), pos(0, 3));
    batch.delete(pos(0, 2), pos(0, 4));
    assert_eq!(
      batch.apply(&mut text),
      Err(EditError::Overlapping {
        prev_end: 3,
        from:     2,
        to:       4,
      })
    );

    let mut batch = EditBatch::new();
    batch.delete(pos(0, 0), pos(0, 3));
    batch.insert(pos(0, 1), "x");
    assert!(matches!(batch.apply(&mut text), Err(EditError::Overlapping { .. })));
    assert_eq!(text, "abcdef");
  }

  #[test]
  fn test_invalid_range() {
    let mut text = Rope::from("abc");
    let mut batch = EditBatch::new();
    batch.delete(pos(0, 2), pos(0, 1));
    assert_eq!(
      batch.apply(&mut text),
      Err(EditError::InvalidRange {
        start: pos(0, 2),
        end:   pos(0, 1),
      })
    );
  }

  #[test]
  fn test_map_char_idx() {
    let changes = vec![
      Change {
        from: 2,
        to:   2,
        text: Some("xyz".into()),
      },
      Change {
        from: 5,
        to:   8,
        text: None,
      },
    ];

    assert_eq!(map_char_idx(&changes, 0, Assoc::After), 0);
    assert_eq!(map_char_idx(&changes, 2, Assoc::Before), 2);
    assert_eq!(map_char_idx(&changes, 2, Assoc::After), 5);
    assert_eq!(map_char_idx(&changes, 4, Assoc::Before), 7);
    assert_eq!(map_char_idx(&changes, 5, Assoc::After), 8);
    assert_eq!(map_char_idx(&changes, 6, Assoc::After), 8);
    assert_eq!(map_char_idx(&changes, 8, Assoc::After), 8);
    assert_eq!(map_char_idx(&changes, 10, Assoc::After), 10);
  }

  #[test]
  fn test_map_selections() {
    let before = Rope::from("ab\n    cd\n");
    let mut batch = EditBatch::new();
    batch.insert(pos(0, 0), "   ");
    batch.delete(pos(1, 0), pos(1, 2));
    let after = batch.apply_to(&before).unwrap();
    assert_eq!(after, "   ab\n  cd\n");

    let selections = SelectionSet::try_from(vec![
      Selection::new(pos(0, 0), pos(0, 2)),
      Selection::new(pos(1, 6), pos(1, 4)),
      Selection::caret(pos(1, 1)),
    ])
    .unwrap();

    let mapped = batch
      .map_selections(before.slice(..), after.slice(..), &selections)
      .unwrap();
    assert_eq!(
      mapped.selections(),
      &[
        Selection::new(pos(0, 3), pos(0, 5)),
        Selection::new(pos(1, 4), pos(1, 2)),
        Selection::caret(pos(1, 0)),
      ]
    );
  }
}

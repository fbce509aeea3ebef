//! Selections and ordered selection sets.
//!
//! A [`Selection`] has two positions: `anchor` and `active`. The `active` end
//! is where the caret sits, the `anchor` is the fixed end. When both are the
//! same position the selection is a caret.
//!
//! ```text
//! anchor=(0,2), active=(0,7): "he[llo w]orld"  (forward)
//! anchor=(0,7), active=(0,2): "he]llo w[orld"  (reversed)
//! anchor=(0,5), active=(0,5): "hello|world"    (caret)
//! ```
//!
//! A [`SelectionSet`] holds one or more selections in the order the host gave
//! them. Index 0 is the primary selection. Unlike a normalized selection, the
//! set is never sorted or merged implicitly: order only changes when a command
//! explicitly removes or merges entries.
//!
//! # Error Handling
//!
//! - **EmptySelection** - A set must contain at least one selection
//! - **IndexOutOfBounds** - Accessed selection index doesn't exist

use smallvec::{
  SmallVec,
  smallvec,
};
use thiserror::Error;

use crate::position::Position;

pub type Result<T> = std::result::Result<T, SelectionError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
  #[error("selection set must contain at least one selection")]
  EmptySelection,
  #[error("selection index {index} out of bounds for selection set of length {len}")]
  IndexOutOfBounds { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
  Forward,
  Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
  pub anchor: Position,
  pub active: Position,
}

impl Selection {
  pub const fn new(anchor: Position, active: Position) -> Self {
    Self { anchor, active }
  }

  #[inline]
  pub const fn caret(pos: Position) -> Self {
    Self::new(pos, pos)
  }

  /// Start of the selection.
  #[inline]
  #[must_use]
  pub fn start(&self) -> Position {
    std::cmp::min(self.anchor, self.active)
  }

  /// End of the selection.
  #[inline]
  #[must_use]
  pub fn end(&self) -> Position {
    std::cmp::max(self.anchor, self.active)
  }

  /// When the anchor and active positions are the same we only have a caret.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.active
  }

  #[inline]
  #[must_use]
  pub fn is_reversed(&self) -> bool {
    self.active < self.anchor
  }

  #[inline]
  #[must_use]
  pub fn direction(&self) -> Direction {
    if self.is_reversed() {
      Direction::Backward
    } else {
      Direction::Forward
    }
  }

  /// Swaps anchor and active.
  #[inline]
  #[must_use]
  pub fn flip(&self) -> Self {
    Self {
      anchor: self.active,
      active: self.anchor,
    }
  }

  /// Returns the selection if it already goes the way of `direction`, else
  /// flips it.
  #[inline]
  #[must_use]
  pub fn with_direction(self, direction: Direction) -> Self {
    if self.direction() == direction {
      self
    } else {
      self.flip()
    }
  }

  /// Check if two selections overlap.
  ///
  /// Selections that merely touch do not overlap, unless they share a start.
  pub fn overlaps(&self, other: &Self) -> bool {
    self.start() == other.start() || (self.end() > other.start() && other.end() > self.start())
  }

  /// Returns a selection that encompasses both inputs.
  ///
  /// The result is reversed only when both inputs are reversed.
  #[must_use]
  pub fn merge(&self, other: Self) -> Self {
    if self.is_reversed() && other.is_reversed() {
      Self {
        anchor: self.anchor.max(other.anchor),
        active: self.active.min(other.active),
      }
    } else {
      Self {
        anchor: self.start().min(other.start()),
        active: self.end().max(other.end()),
      }
    }
  }
}

impl From<(Position, Position)> for Selection {
  fn from((anchor, active): (Position, Position)) -> Self {
    Self::new(anchor, active)
  }
}

/// An ordered, non-empty list of selections.
/// INVARIANT: A set can never be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
  selections: SmallVec<[Selection; 1]>,
}

impl SelectionSet {
  pub fn new(selections: SmallVec<[Selection; 1]>) -> Result<Self> {
    if selections.is_empty() {
      return Err(SelectionError::EmptySelection);
    }
    Ok(Self { selections })
  }

  /// Constructs a set holding a single selection.
  #[must_use]
  pub fn single(selection: Selection) -> Self {
    Self {
      selections: smallvec![selection],
    }
  }

  pub fn caret(pos: Position) -> Self {
    Self::single(Selection::caret(pos))
  }

  /// The primary selection. Always the first entry.
  #[inline]
  pub fn primary(&self) -> Selection {
    self.selections[0]
  }

  #[inline]
  pub fn selections(&self) -> &[Selection] {
    &self.selections
  }

  /// Number of selections in the set. Never zero.
  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.selections.len()
  }

  /// Check if every selection in the set is a caret.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.selections.iter().all(Selection::is_empty)
  }

  pub fn get(&self, idx: usize) -> Result<Selection> {
    self.selections.get(idx).copied().ok_or(SelectionError::IndexOutOfBounds {
      index: idx,
      len:   self.selections.len(),
    })
  }

  #[inline(always)]
  pub fn iter(&self) -> std::slice::Iter<'_, Selection> {
    self.selections.iter()
  }

  /// Keeps only the primary selection.
  #[must_use]
  pub fn into_single(self) -> Self {
    if self.selections.len() == 1 {
      self
    } else {
      Self::single(self.primary())
    }
  }

  /// Drops the primary selection, unless it is the only one.
  #[must_use]
  pub fn without_primary(mut self) -> Self {
    if self.selections.len() > 1 {
      self.selections.remove(0);
    }
    self
  }

  /// Apply a transformation to every selection, keeping order and count.
  #[must_use]
  pub fn transform<F>(mut self, mut f: F) -> Self
  where
    F: FnMut(Selection) -> Selection,
  {
    for selection in self.selections.iter_mut() {
      *selection = f(*selection);
    }
    self
  }

  /// Keeps the selections accepted by `keep`, in order.
  ///
  /// Returns `None` when nothing survives so callers can choose a fallback.
  pub fn filter<F>(&self, mut keep: F) -> Option<Self>
  where
    F: FnMut(&Selection) -> bool,
  {
    let selections: SmallVec<[Selection; 1]> =
      self.selections.iter().copied().filter(|sel| keep(sel)).collect();
    Self::new(selections).ok()
  }
}

impl TryFrom<Vec<Selection>> for SelectionSet {
  type Error = SelectionError;

  fn try_from(selections: Vec<Selection>) -> Result<Self> {
    Self::new(SmallVec::from_vec(selections))
  }
}

impl From<Selection> for SelectionSet {
  fn from(selection: Selection) -> Self {
    Self::single(selection)
  }
}

impl<'a> IntoIterator for &'a SelectionSet {
  type Item = &'a Selection;
  type IntoIter = std::slice::Iter<'a, Selection>;

  fn into_iter(self) -> std::slice::Iter<'a, Selection> {
    self.selections.iter()
  }
}

impl IntoIterator for SelectionSet {
  type Item = Selection;
  type IntoIter = smallvec::IntoIter<[Selection; 1]>;

  fn into_iter(self) -> smallvec::IntoIter<[Selection; 1]> {
    self.selections.into_iter()
  }
}

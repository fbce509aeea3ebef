//! The selection-set transforms.
//!
//! Every function here is a pure snapshot transform: it reads the selections it
//! is given (and, for some commands, a [`Document`]) and returns either a new
//! [`SelectionSet`] or an [`EditBatch`] describing the text changes. Nothing is
//! mutated in place and no state survives between calls.
//!
//! Filtering transforms never produce an empty set. When nothing survives,
//! the result is the primary selection alone.

use std::collections::BTreeSet;

use regex::Regex;
use smallvec::SmallVec;

use crate::{
  document::Document,
  edit::EditBatch,
  position::Position,
  selection::{
    Direction,
    Selection,
    SelectionSet,
  },
};

/// Collapses every selection to a caret on its active end.
pub fn reduce(selections: &SelectionSet) -> SelectionSet {
  selections
    .clone()
    .transform(|selection| Selection::caret(selection.active))
}

/// Swaps anchor and active of every selection.
pub fn flip(selections: &SelectionSet) -> SelectionSet {
  selections.clone().transform(|selection| selection.flip())
}

/// Makes every selection face forward.
pub fn forward(selections: &SelectionSet) -> SelectionSet {
  selections
    .clone()
    .transform(|selection| selection.with_direction(Direction::Forward))
}

/// Makes every selection face backward.
pub fn backward(selections: &SelectionSet) -> SelectionSet {
  selections
    .clone()
    .transform(|selection| selection.with_direction(Direction::Backward))
}

/// Merges selections that continue each other across a line break.
///
/// A reference selection whose end sits at the end of its line absorbs another
/// selection starting at column 0 of the next line, giving `ref.start` to
/// `other.end`. The reference keeps absorbing until nothing else continues it,
/// then the next reference is considered. The merged selection keeps the
/// reference's slot; absorbed selections are dropped.
///
/// With `coalesce_overlapping`, overlapping selections are merged too, for
/// hosts that do not already do so. Both passes repeat until neither changes
/// anything, so merging an already merged set is a no-op.
pub fn merge<D>(selections: &SelectionSet, doc: &D, coalesce_overlapping: bool) -> SelectionSet
where
  D: Document + ?Sized,
{
  let mut slots: Vec<Option<Selection>> = selections.iter().copied().map(Some).collect();

  loop {
    let before = live(&slots);
    if coalesce_overlapping {
      coalesce(&mut slots);
    }
    join_lines(&mut slots, doc);

    // Every pass that changes anything drops at least one slot.
    if live(&slots) == before {
      break;
    }
  }

  collect_slots(slots, selections)
}

fn live(slots: &[Option<Selection>]) -> usize {
  slots.iter().flatten().count()
}

fn join_lines<D>(slots: &mut [Option<Selection>], doc: &D)
where
  D: Document + ?Sized,
{
  for idx in 0..slots.len() {
    let Some(mut current) = slots[idx] else {
      continue;
    };

    loop {
      let end = current.end();
      if end.line + 1 >= doc.line_count() || end.character != doc.line_end(end.line) {
        break;
      }

      let next_line = Position::line_start(end.line + 1);
      let candidate = (0..slots.len()).find(|&other| {
        other != idx && slots[other].is_some_and(|selection| selection.start() == next_line)
      });
      let Some(other) = candidate else {
        break;
      };
      let Some(absorbed) = slots[other].take() else {
        break;
      };

      tracing::trace!(
        reference = idx,
        absorbed = other,
        line = end.line,
        "merging selections across line break"
      );
      current = Selection::new(current.start(), absorbed.end());
      slots[idx] = Some(current);
    }
  }
}

/// Merges overlapping selections in place. The merged selection takes the
/// earliest slot of the selections it covers.
fn coalesce(slots: &mut [Option<Selection>]) {
  for idx in 0..slots.len() {
    if slots[idx].is_none() {
      continue;
    }

    let mut target = idx;
    while let Some(current) = slots[target] {
      let overlapping = (0..slots.len()).find(|&other| {
        other != target && slots[other].is_some_and(|selection| selection.overlaps(&current))
      });
      let Some(other) = overlapping else {
        break;
      };
      let Some(selection) = slots[other].take() else {
        break;
      };

      let merged = current.merge(selection);
      slots[target] = None;
      target = target.min(other);
      slots[target] = Some(merged);
    }
  }
}

fn collect_slots(slots: Vec<Option<Selection>>, original: &SelectionSet) -> SelectionSet {
  let selections: SmallVec<[Selection; 1]> = slots.into_iter().flatten().collect();
  // Merging only ever drops an entry after folding it into a surviving one.
  SelectionSet::new(selections).unwrap_or_else(|_| original.clone().into_single())
}

/// Pads every selection's start with spaces so all starts share the largest
/// start column.
pub fn align(selections: &SelectionSet) -> EditBatch {
  let start_char = selections
    .iter()
    .map(|selection| selection.start().character)
    .max()
    .unwrap_or(0);

  let mut batch = EditBatch::with_capacity(selections.len());
  for selection in selections {
    let start = selection.start();
    batch.insert(start, spaces(start_char - start.character));
  }
  batch
}

/// Copies the indentation of a source selection's line to the lines of every
/// other selection.
///
/// The source is the selection at `count` when there is one, otherwise the
/// primary. Lines indented deeper lose leading characters, lines indented less
/// get leading spaces. Each line is adjusted at most once, and the source's
/// own line is never touched.
pub fn align_copy<D>(selections: &SelectionSet, doc: &D, count: Option<usize>) -> EditBatch
where
  D: Document + ?Sized,
{
  let source_idx = count
    .filter(|&idx| idx < selections.len())
    .unwrap_or(0);
  let source = selections.selections()[source_idx];
  let source_line = source.start().line;
  let source_indent = doc.first_non_whitespace(source_line);

  let mut visited = BTreeSet::from([source_line]);
  let mut batch = EditBatch::new();

  for (idx, selection) in selections.iter().enumerate() {
    if idx == source_idx {
      continue;
    }

    let line = selection.start().line;
    if !visited.insert(line) {
      continue;
    }

    let indent = doc.first_non_whitespace(line);
    let line_start = Position::line_start(line);
    if indent > source_indent {
      batch.delete(line_start, Position::new(line, indent - source_indent));
    } else if indent < source_indent {
      batch.insert(line_start, spaces(source_indent - indent));
    }
  }

  batch
}

/// Keeps only the primary selection.
pub fn clear(selections: &SelectionSet) -> SelectionSet {
  selections.clone().into_single()
}

/// Drops the primary selection, unless it is the only one.
pub fn clear_main(selections: &SelectionSet) -> SelectionSet {
  selections.clone().without_primary()
}

/// Keeps the selections whose text matches `regex`.
pub fn keep_matching<D>(selections: &SelectionSet, doc: &D, regex: &Regex) -> SelectionSet
where
  D: Document + ?Sized,
{
  keep_or_remove_matches(selections, doc, regex, false)
}

/// Keeps the selections whose text does not match `regex`.
pub fn clear_matching<D>(selections: &SelectionSet, doc: &D, regex: &Regex) -> SelectionSet
where
  D: Document + ?Sized,
{
  keep_or_remove_matches(selections, doc, regex, true)
}

fn keep_or_remove_matches<D>(
  selections: &SelectionSet,
  doc: &D,
  regex: &Regex,
  remove: bool,
) -> SelectionSet
where
  D: Document + ?Sized,
{
  let kept = selections.filter(|selection| regex.is_match(&doc.text(selection)) ^ remove);

  match kept {
    Some(kept) => kept,
    None => {
      tracing::warn!(
        pattern = regex.as_str(),
        remove,
        "no selection left after filtering, keeping the primary selection"
      );
      selections.clone().into_single()
    },
  }
}

fn spaces(count: usize) -> String {
  " ".repeat(count)
}

//! Glue between commands and whatever owns the selections and the text.
//!
//! A [`Host`] hands out a snapshot of its selections and a read-only view of
//! its document, and later accepts either a new selection set or an edit batch.
//! [`run`] drives that cycle for one command. [`Editor`] is a small
//! rope-backed host, handy for tests and headless use.

use ropey::Rope;

use crate::{
  command::{
    Command,
    CommandFlags,
    CommandInput,
    Outcome,
    Result,
    execute,
  },
  config::Config,
  document::Document,
  edit::{
    EditBatch,
    EditError,
  },
  position::Position,
  selection::SelectionSet,
};

pub trait Host {
  type Doc: Document + ?Sized;

  fn selections(&self) -> &SelectionSet;

  fn set_selections(&mut self, selections: SelectionSet);

  fn document(&self) -> &Self::Doc;

  /// Applies every edit in `edits` or none of them.
  fn apply_edits(&mut self, edits: EditBatch) -> std::result::Result<(), EditError>;
}

/// Executes `command` against `host` and applies the outcome.
///
/// Selection commands replace the host's selections. Edit commands hand their
/// batch to [`Host::apply_edits`]; an empty batch is not applied.
pub fn run<H>(host: &mut H, command: Command, input: &CommandInput, config: &Config) -> Result<()>
where
  H: Host + ?Sized,
{
  let outcome = execute(command, host.selections(), host.document(), input, config)?;

  match outcome {
    Outcome::Selections(selections) => {
      debug_assert!(command.flags().contains(CommandFlags::CHANGE_SELECTIONS));
      tracing::trace!(%command, selections = selections.len(), "updating selections");
      host.set_selections(selections);
    },
    Outcome::Edits(edits) => {
      debug_assert!(command.flags().contains(CommandFlags::EDIT));
      if edits.is_empty() {
        tracing::trace!(%command, "no edits to apply");
        return Ok(());
      }
      tracing::trace!(%command, edits = edits.len(), "applying edits");
      host.apply_edits(edits)?;
    },
  }

  Ok(())
}

/// An in-memory host: a rope plus a selection set.
#[derive(Debug, Clone)]
pub struct Editor {
  text:       Rope,
  selections: SelectionSet,
}

impl Editor {
  /// Creates an editor with a single caret at the start of `text`.
  pub fn new(text: Rope) -> Self {
    Self {
      text,
      selections: SelectionSet::caret(Position::zero()),
    }
  }

  #[must_use]
  pub fn with_selections(mut self, selections: SelectionSet) -> Self {
    self.selections = selections;
    self
  }

  #[inline]
  pub fn text(&self) -> &Rope {
    &self.text
  }
}

impl Default for Editor {
  fn default() -> Self {
    Self::new(Rope::new())
  }
}

impl Host for Editor {
  type Doc = Rope;

  fn selections(&self) -> &SelectionSet {
    &self.selections
  }

  fn set_selections(&mut self, selections: SelectionSet) {
    self.selections = selections;
  }

  fn document(&self) -> &Rope {
    &self.text
  }

  fn apply_edits(&mut self, edits: EditBatch) -> std::result::Result<(), EditError> {
    let text = edits.apply_to(&self.text)?;
    let selections = edits.map_selections(self.text.slice(..), text.slice(..), &self.selections)?;

    self.text = text;
    self.selections = selections;
    Ok(())
  }
}

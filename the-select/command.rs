//! Selection commands as a closed set, plus the inputs they need.
//!
//! Each [`Command`] declares through [`CommandFlags`] whether it only changes
//! selections or also edits text, so a host can pick the right transactional
//! wrapper, and through [`InputKind`] which input it has to collect first.

use std::{
  fmt,
  str::FromStr,
};

use bitflags::bitflags;
use regex::{
  Regex,
  RegexBuilder,
};
use thiserror::Error;

use crate::{
  config::{
    Config,
    FilterConfig,
  },
  document::Document,
  edit::{
    EditBatch,
    EditError,
  },
  selection::{
    SelectionError,
    SelectionSet,
  },
  transform,
};

pub type Result<T> = std::result::Result<T, CommandError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CommandError {
  #[error("command `{command}` requires {kind} input")]
  MissingInput { command: Command, kind: InputKind },
  #[error("unknown command `{0}`")]
  UnknownCommand(String),
  #[error(transparent)]
  Selection(#[from] SelectionError),
  #[error(transparent)]
  Edit(#[from] EditError),
  #[error(transparent)]
  Regex(#[from] regex::Error),
}

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct CommandFlags: u8 {
    /// The command replaces the selection set.
    const CHANGE_SELECTIONS = 1 << 0;
    /// The command edits the document text.
    const EDIT              = 1 << 1;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
  None,
  Regex,
  Count,
}

impl fmt::Display for InputKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::None => "no",
      Self::Regex => "regex",
      Self::Count => "count",
    })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
  Reduce,
  Flip,
  Forward,
  Backward,
  Merge,
  Align,
  AlignCopy,
  Clear,
  ClearMain,
  KeepMatching,
  ClearMatching,
}

impl Command {
  pub const ALL: [Command; 11] = [
    Command::Reduce,
    Command::Flip,
    Command::Forward,
    Command::Backward,
    Command::Merge,
    Command::Align,
    Command::AlignCopy,
    Command::Clear,
    Command::ClearMain,
    Command::KeepMatching,
    Command::ClearMatching,
  ];

  /// Stable identifier used for registration and keymaps.
  pub const fn id(self) -> &'static str {
    match self {
      Self::Reduce => "selections.reduce",
      Self::Flip => "selections.flip",
      Self::Forward => "selections.forward",
      Self::Backward => "selections.backward",
      Self::Merge => "selections.merge",
      Self::Align => "selections.align",
      Self::AlignCopy => "selections.alignCopy",
      Self::Clear => "selections.clear",
      Self::ClearMain => "selections.clearMain",
      Self::KeepMatching => "selections.keepMatching",
      Self::ClearMatching => "selections.clearMatching",
    }
  }

  pub const fn flags(self) -> CommandFlags {
    match self {
      Self::Align | Self::AlignCopy => CommandFlags::EDIT,
      _ => CommandFlags::CHANGE_SELECTIONS,
    }
  }

  pub const fn input_kind(self) -> InputKind {
    match self {
      Self::KeepMatching | Self::ClearMatching => InputKind::Regex,
      Self::AlignCopy => InputKind::Count,
      _ => InputKind::None,
    }
  }

  #[inline]
  pub fn edits_text(self) -> bool {
    self.flags().contains(CommandFlags::EDIT)
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.id())
  }
}

impl FromStr for Command {
  type Err = CommandError;

  fn from_str(s: &str) -> Result<Self> {
    Command::ALL
      .into_iter()
      .find(|command| command.id() == s)
      .ok_or_else(|| CommandError::UnknownCommand(s.to_string()))
  }
}

/// Input collected by the host before running a command.
#[derive(Debug, Clone, Default)]
pub struct CommandInput {
  pub regex: Option<Regex>,
  pub count: Option<usize>,
}

impl CommandInput {
  pub fn with_regex(mut self, regex: Regex) -> Self {
    self.regex = Some(regex);
    self
  }

  pub fn with_count(mut self, count: usize) -> Self {
    self.count = Some(count);
    self
  }

  /// Compiles `pattern` honoring the case settings of `config`.
  ///
  /// `^` and `$` anchor to the whole selection text, not to each line in it.
  pub fn from_pattern(pattern: &str, config: &FilterConfig) -> Result<Self> {
    let regex = RegexBuilder::new(pattern)
      .case_insensitive(config.is_case_insensitive(pattern))
      .build()?;
    Ok(Self::default().with_regex(regex))
  }
}

/// What a command produced, for the host to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Selections(SelectionSet),
  Edits(EditBatch),
}

/// Runs `command` against a snapshot of the selections and the document.
pub fn execute<D>(
  command: Command,
  selections: &SelectionSet,
  doc: &D,
  input: &CommandInput,
  config: &Config,
) -> Result<Outcome>
where
  D: Document + ?Sized,
{
  tracing::debug!(%command, selections = selections.len(), "executing selection command");

  let regex = || {
    input.regex.as_ref().ok_or(CommandError::MissingInput {
      command,
      kind: InputKind::Regex,
    })
  };

  let outcome = match command {
    Command::Reduce => Outcome::Selections(transform::reduce(selections)),
    Command::Flip => Outcome::Selections(transform::flip(selections)),
    Command::Forward => Outcome::Selections(transform::forward(selections)),
    Command::Backward => Outcome::Selections(transform::backward(selections)),
    Command::Merge => {
      Outcome::Selections(transform::merge(
        selections,
        doc,
        config.merge.coalesce_overlapping,
      ))
    },
    Command::Align => Outcome::Edits(transform::align(selections)),
    Command::AlignCopy => Outcome::Edits(transform::align_copy(selections, doc, input.count)),
    Command::Clear => Outcome::Selections(transform::clear(selections)),
    Command::ClearMain => Outcome::Selections(transform::clear_main(selections)),
    Command::KeepMatching => {
      Outcome::Selections(transform::keep_matching(selections, doc, regex()?))
    },
    Command::ClearMatching => {
      Outcome::Selections(transform::clear_matching(selections, doc, regex()?))
    },
  };

  Ok(outcome)
}

#[cfg(test)]
mod test {
  use ropey::Rope;

  use super::*;
  use crate::{
    position::Position,
    selection::Selection,
  };

  #[test]
  fn test_ids_round_trip() {
    for command in Command::ALL {
      assert_eq!(command.id().parse::<Command>().unwrap(), command);
      assert_eq!(command.to_string(), command.id());
    }

    let err = "selections.explode".parse::<Command>().unwrap_err();
    assert!(matches!(err, CommandError::UnknownCommand(name) if name == "selections.explode"));
  }

  #[test]
  fn test_flags() {
    let edits: Vec<_> = Command::ALL
      .into_iter()
      .filter(|command| command.edits_text())
      .collect();
    assert_eq!(edits, vec![Command::Align, Command::AlignCopy]);

    for command in Command::ALL {
      let flags = command.flags();
      assert!(flags == CommandFlags::EDIT || flags == CommandFlags::CHANGE_SELECTIONS);
    }
  }

  #[test]
  fn test_input_kinds() {
    assert_eq!(Command::KeepMatching.input_kind(), InputKind::Regex);
    assert_eq!(Command::ClearMatching.input_kind(), InputKind::Regex);
    assert_eq!(Command::AlignCopy.input_kind(), InputKind::Count);
    assert_eq!(Command::Flip.input_kind(), InputKind::None);
  }

  #[test]
  fn test_missing_regex() {
    let doc = Rope::from("abc");
    let selections = SelectionSet::caret(Position::zero());
    let err = execute(
      Command::KeepMatching,
      &selections,
      &doc,
      &CommandInput::default(),
      &Config::default(),
    )
    .unwrap_err();
    assert!(matches!(
      err,
      CommandError::MissingInput {
        command: Command::KeepMatching,
        kind:    InputKind::Regex,
      }
    ));
  }

  #[test]
  fn test_from_pattern_smart_case() {
    let doc = Rope::from("Foo foo");
    let selections = SelectionSet::try_from(vec![
      Selection::new(Position::new(0, 0), Position::new(0, 3)),
      Selection::new(Position::new(0, 4), Position::new(0, 7)),
    ])
    .unwrap();
    let config = Config::default();

    let input = CommandInput::from_pattern("foo", &config.filter).unwrap();
    let outcome = execute(Command::KeepMatching, &selections, &doc, &input, &config).unwrap();
    assert_eq!(outcome, Outcome::Selections(selections.clone()));

    let input = CommandInput::from_pattern("Foo", &config.filter).unwrap();
    let outcome = execute(Command::ClearMatching, &selections, &doc, &input, &config).unwrap();
    assert_eq!(
      outcome,
      Outcome::Selections(SelectionSet::single(Selection::new(
        Position::new(0, 4),
        Position::new(0, 7)
      )))
    );
  }

  #[test]
  fn test_pattern_anchors_whole_selection() {
    let doc = Rope::from("a\nb\n");
    let selections = SelectionSet::try_from(vec![
      Selection::new(Position::new(0, 0), Position::new(1, 1)),
      Selection::new(Position::new(1, 0), Position::new(1, 1)),
    ])
    .unwrap();
    let config = Config::default();

    let input = CommandInput::from_pattern("^b$", &config.filter).unwrap();
    let outcome = execute(Command::KeepMatching, &selections, &doc, &input, &config).unwrap();
    assert_eq!(
      outcome,
      Outcome::Selections(SelectionSet::single(Selection::new(
        Position::new(1, 0),
        Position::new(1, 1)
      )))
    );
  }

  #[test]
  fn test_bad_pattern() {
    let err = CommandInput::from_pattern("(", &FilterConfig::default()).unwrap_err();
    assert!(matches!(err, CommandError::Regex(_)));
  }

  #[test]
  fn test_edit_commands_return_edits() {
    let doc = Rope::from("a\n  b\n");
    let selections = SelectionSet::try_from(vec![
      Selection::caret(Position::new(0, 0)),
      Selection::caret(Position::new(1, 2)),
    ])
    .unwrap();

    let outcome = execute(
      Command::Align,
      &selections,
      &doc,
      &CommandInput::default(),
      &Config::default(),
    )
    .unwrap();
    let Outcome::Edits(batch) = outcome else {
      panic!("align must produce edits");
    };
    assert_eq!(batch.apply_to(&doc).unwrap(), "  a\n  b\n");

    let outcome = execute(
      Command::AlignCopy,
      &selections,
      &doc,
      &CommandInput::default().with_count(1),
      &Config::default(),
    )
    .unwrap();
    let Outcome::Edits(batch) = outcome else {
      panic!("align-copy must produce edits");
    };
    assert_eq!(batch.apply_to(&doc).unwrap(), "  a\n  b\n");
  }
}

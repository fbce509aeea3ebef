//! Kakoune-style multi-selection transforms.
//!
//! A [`SelectionSet`](selection::SelectionSet) is an ordered, never-empty list
//! of anchor/active pairs. Every command in [`transform`] takes a snapshot of
//! that set (plus, for some commands, read-only document queries) and returns
//! either a new set or an [`EditBatch`](edit::EditBatch) for the host to apply.
//!
//! ```
//! use ropey::Rope;
//! use the_select::{
//!   command::{
//!     Command,
//!     CommandInput,
//!   },
//!   config::Config,
//!   host::{
//!     Editor,
//!     Host,
//!     run,
//!   },
//!   position::Position,
//!   selection::Selection,
//! };
//!
//! let mut editor = Editor::new(Rope::from("hello\nworld\n"));
//! editor.set_selections(
//!   vec![
//!     Selection::new(Position::new(0, 0), Position::new(0, 5)),
//!     Selection::new(Position::new(1, 0), Position::new(1, 3)),
//!   ]
//!   .try_into()
//!   .unwrap(),
//! );
//!
//! run(&mut editor, Command::Merge, &CommandInput::default(), &Config::default()).unwrap();
//! assert_eq!(editor.selections().len(), 1);
//! ```

use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod command;
pub mod config;
pub mod document;
pub mod edit;
pub mod host;
pub mod position;
pub mod selection;
pub mod transform;

pub type Tendril = SmartString<LazyCompact>;

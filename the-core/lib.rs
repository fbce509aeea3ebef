//! Text primitives shared by the selection crates.

pub mod chars;
pub mod line_ending;

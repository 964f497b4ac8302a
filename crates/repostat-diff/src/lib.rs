//! Line diff engine for repostat.
//!
//! Counts inserted and deleted lines between two versions of a file. The
//! counts come from an opcode diff (equal/replace/delete/insert spans), so a
//! replaced line is reported once on each side.
//!
//! # Key Types
//!
//! - [`LineDelta`] -- Insertion/deletion counts
//! - [`line_delta`] -- Diff two texts
//! - [`count_lines`] -- Line count with the trailing-newline convention

pub mod line_delta;

pub use line_delta::{count_lines, line_delta, split_lines, LineDelta};

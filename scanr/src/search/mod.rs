//! The line-match-and-context engine and its concurrent scheduler.
//!
//! A scan flows bottom-up through these modules: [`pattern`] compiles the
//! raw patterns once (fail-fast), [`worker`] hands each queued file to one
//! worker, which streams its lines through a [`matcher::LineMatcher`] and a
//! private [`sequencer::ContextSequencer`], and writes each completed block
//! through the shared sink. [`engine::scan`] ties the pieces together.

pub mod engine;
pub mod matcher;
pub mod pattern;
pub mod printer;
pub mod reader;
pub mod sequencer;
pub mod worker;

pub use engine::scan;
pub use matcher::{LineMatcher, MatchMode, MatchSpan};
pub use pattern::{PatternOptions, PatternSet};
pub use sequencer::{ContextSequencer, LineRecord, OutputEvent};
pub use worker::{FileQueue, ScanSummary, ScanTotals};

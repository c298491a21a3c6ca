use std::collections::VecDeque;

use super::matcher::MatchSpan;
use crate::config::ScanConfig;

/// One line of input, as seen by the sequencer.
/// `matched` is output-eligibility: the caller has already applied the
/// inversion rule and discarded spans for inverted lines.
#[derive(Debug)]
pub struct LineRecord<'a> {
    pub line_number: u64,
    pub text: &'a str,
    pub matched: bool,
    pub spans: Vec<MatchSpan>,
}

/// A formatted-output event. Events arrive grouped into blocks so a worker
/// can write each block under one sink lock, never interleaved with another
/// file's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    /// `--` discontinuity marker between context blocks
    Separator,
    /// A context line, prefixed with `-`
    Context { line_number: u64, text: String },
    /// A matched line, prefixed with `:`
    Match {
        line_number: u64,
        text: String,
        spans: Vec<MatchSpan>,
    },
    /// One extracted match region (only-matching mode)
    Portion { line_number: u64, text: String },
    /// The stream's filename (filenames-only mode, emitted at most once)
    FileName,
    /// Per-file match count (count mode, emitted at end of stream)
    Count(u64),
}

/// What the sequencer emits for this stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmitMode {
    Full,
    CountOnly,
    FilenamesOnly,
    /// Count eligible lines for the exit status but emit nothing
    Quiet,
}

/// Per-stream state machine that interleaves matched lines, leading/trailing
/// context and block separators without ever emitting a line twice.
///
/// Invariant: emitted line numbers are strictly increasing; a separator
/// appears exactly once at each gap > 1 in that sequence and never before
/// the first emitted line.
#[derive(Debug)]
pub struct ContextSequencer {
    mode: EmitMode,
    only_matching: bool,
    before: usize,
    after: usize,
    /// Sliding window of the most recent not-yet-emitted lines
    buffer: VecDeque<(u64, String)>,
    /// Lines of trailing context still owed after the last match
    trailing: usize,
    last_emitted: Option<u64>,
    filename_emitted: bool,
    match_count: u64,
    /// The currently open context block
    block: Vec<OutputEvent>,
}

impl ContextSequencer {
    pub fn new(config: &ScanConfig) -> Self {
        let mode = if config.quiet {
            EmitMode::Quiet
        } else if config.count_only {
            EmitMode::CountOnly
        } else if config.filenames_only {
            EmitMode::FilenamesOnly
        } else {
            EmitMode::Full
        };
        Self {
            mode,
            only_matching: config.only_matching,
            before: config.before_context,
            after: config.after_context,
            buffer: VecDeque::with_capacity(config.before_context + 1),
            trailing: 0,
            last_emitted: None,
            filename_emitted: false,
            match_count: 0,
            block: Vec::new(),
        }
    }

    /// Number of output-eligible lines seen so far
    pub fn match_count(&self) -> u64 {
        self.match_count
    }

    /// Consumes one line; returns a completed block when one closes.
    pub fn push(&mut self, record: LineRecord<'_>) -> Option<Vec<OutputEvent>> {
        let completed = match self.mode {
            EmitMode::CountOnly | EmitMode::Quiet => {
                if record.matched {
                    self.match_count += 1;
                }
                None
            }
            EmitMode::FilenamesOnly => {
                // The stream is drained to completion so per-file and
                // aggregate counts stay exact; the flag keeps the filename
                // from printing twice.
                if record.matched {
                    self.match_count += 1;
                    if !self.filename_emitted {
                        self.filename_emitted = true;
                        return Some(vec![OutputEvent::FileName]);
                    }
                }
                None
            }
            EmitMode::Full => self.push_full(&record),
        };

        // The current line always enters the before-context window, eligible
        // or not; the `> last_emitted` guard at drain time prevents re-emission.
        if self.before > 0 {
            self.buffer
                .push_back((record.line_number, record.text.to_string()));
            if self.buffer.len() > self.before {
                self.buffer.pop_front();
            }
        }

        completed
    }

    /// End of stream: flush the open block, or the count record.
    pub fn finish(&mut self) -> Option<Vec<OutputEvent>> {
        match self.mode {
            EmitMode::CountOnly => Some(vec![OutputEvent::Count(self.match_count)]),
            EmitMode::Full if !self.block.is_empty() => Some(std::mem::take(&mut self.block)),
            _ => None,
        }
    }

    fn push_full(&mut self, record: &LineRecord<'_>) -> Option<Vec<OutputEvent>> {
        if record.matched {
            self.match_count += 1;

            // The first line this block will emit: the oldest buffered
            // context line not yet emitted, or the match itself.
            let first_to_emit = self
                .buffer
                .iter()
                .map(|(ln, _)| *ln)
                .find(|&ln| self.last_emitted.map_or(true, |last| ln > last))
                .unwrap_or(record.line_number);

            // A separator is owed only at a genuine discontinuity: context
            // display is on, something was emitted before, and the buffered
            // context does not bridge the gap back to it.
            if (self.before > 0 || self.after > 0)
                && self.block.is_empty()
                && self
                    .last_emitted
                    .is_some_and(|last| first_to_emit > last + 1)
            {
                self.block.push(OutputEvent::Separator);
            }

            // Drain leading context
            while let Some((ln, text)) = self.buffer.pop_front() {
                if self.last_emitted.map_or(true, |last| ln > last) {
                    self.block.push(OutputEvent::Context {
                        line_number: ln,
                        text,
                    });
                    self.last_emitted = Some(ln);
                }
            }

            // Emit the match itself, guarding against prior emission
            if self
                .last_emitted
                .map_or(true, |last| record.line_number > last)
            {
                if self.only_matching {
                    for span in &record.spans {
                        self.block.push(OutputEvent::Portion {
                            line_number: record.line_number,
                            text: record.text[span.start..span.end].to_string(),
                        });
                    }
                } else {
                    self.block.push(OutputEvent::Match {
                        line_number: record.line_number,
                        text: record.text.to_string(),
                        spans: record.spans.clone(),
                    });
                }
                self.last_emitted = Some(record.line_number);
            }

            self.trailing = self.after;
            if self.trailing == 0 && self.before == 0 && self.after == 0 {
                // No context display at all: every match is its own block
                return Some(std::mem::take(&mut self.block));
            }
            None
        } else {
            if self.trailing > 0 {
                if self
                    .last_emitted
                    .map_or(true, |last| record.line_number > last)
                {
                    self.block.push(OutputEvent::Context {
                        line_number: record.line_number,
                        text: record.text.to_string(),
                    });
                    self.last_emitted = Some(record.line_number);
                }
                self.trailing -= 1;
            }
            if self.trailing == 0 && !self.block.is_empty() {
                return Some(std::mem::take(&mut self.block));
            }
            None
        }
    }
}

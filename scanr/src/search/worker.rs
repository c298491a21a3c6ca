use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use tracing::warn;

use super::matcher::{LineMatcher, MatchMode};
use super::pattern::PatternSet;
use super::printer::Printer;
use super::reader;
use super::sequencer::{ContextSequencer, LineRecord, OutputEvent};
use crate::config::ScanConfig;
use crate::errors::ScanResult;

/// All resolved file paths, pre-populated and closed before workers start.
/// Claiming is an atomic cursor bump, so pop never blocks and each path is
/// owned by exactly one worker.
#[derive(Debug)]
pub struct FileQueue {
    files: Vec<PathBuf>,
    cursor: AtomicUsize,
}

impl FileQueue {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Claims the next unprocessed path, or None when the queue is drained
    pub fn pop(&self) -> Option<&PathBuf> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.files.get(index)
    }
}

/// Final values of a completed scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total_matches: u64,
    pub files_processed: u64,
    pub files_with_matches: u64,
}

/// Process-wide counters, incremented lock-free by every worker and read
/// only after all workers have joined.
#[derive(Debug, Default)]
pub struct ScanTotals {
    total_matches: AtomicU64,
    files_processed: AtomicU64,
    files_with_matches: AtomicU64,
}

impl ScanTotals {
    pub fn record_file(&self, matches: u64) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        if matches > 0 {
            self.total_matches.fetch_add(matches, Ordering::Relaxed);
            self.files_with_matches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            total_matches: self.total_matches.load(Ordering::Relaxed),
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_with_matches: self.files_with_matches.load(Ordering::Relaxed),
        }
    }
}

/// Runs a fixed pool of `min(thread_count, files)` workers over the queue.
/// Each worker streams one file at a time through its own matcher/sequencer
/// pair; the shared sink is locked once per emitted block.
pub(crate) fn run_pool<W: Write + Send>(
    config: &ScanConfig,
    set: &PatternSet,
    queue: &FileQueue,
    sink: &Mutex<W>,
    totals: &ScanTotals,
) {
    let workers = config.thread_count.get().min(queue.len()).max(1);

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                while let Some(path) = queue.pop() {
                    if let Err(e) = scan_file(path, config, set, sink, totals) {
                        // Non-fatal: report and move on to the next file
                        warn!("skipping {}: {}", path.display(), e);
                    }
                }
            });
        }
    });
}

/// Whether span positions are needed beyond the match decision
fn needs_all_spans(config: &ScanConfig) -> bool {
    if config.invert || config.quiet || config.count_only || config.filenames_only {
        return false;
    }
    config.only_matching || config.color
}

fn scan_file<W: Write + Send>(
    path: &Path,
    config: &ScanConfig,
    set: &PatternSet,
    sink: &Mutex<W>,
    totals: &ScanTotals,
) -> ScanResult<()> {
    let contents = reader::read_file(path)?;

    let mode = if needs_all_spans(config) {
        MatchMode::LocateAll
    } else {
        MatchMode::FirstMatch
    };
    let matcher = LineMatcher::new(set, mode);
    let mut sequencer = ContextSequencer::new(config);
    let printer = Printer::new(path, config);

    for (index, line) in contents.lines().enumerate() {
        let line_number = index as u64 + 1;
        let result = matcher.evaluate(line);
        let eligible = result.matched != config.invert;
        // Inverted lines never carry highlightable spans
        let spans = if config.invert { Vec::new() } else { result.spans };

        let record = LineRecord {
            line_number,
            text: line,
            matched: eligible,
            spans,
        };
        if let Some(block) = sequencer.push(record) {
            write_block(&printer, &block, sink)?;
        }
    }
    if let Some(block) = sequencer.finish() {
        write_block(&printer, &block, sink)?;
    }

    totals.record_file(sequencer.match_count());
    Ok(())
}

/// One formatted block is written under one lock acquisition, so two files'
/// context blocks can never interleave.
fn write_block<W: Write + Send>(
    printer: &Printer,
    block: &[OutputEvent],
    sink: &Mutex<W>,
) -> ScanResult<()> {
    let mut rendered = String::new();
    printer.render(block, &mut rendered);
    let mut out = sink.lock().unwrap_or_else(PoisonError::into_inner);
    out.write_all(rendered.as_bytes())?;
    Ok(())
}

use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};

const SIMPLE_PATTERN_THRESHOLD: usize = 64;

// Compiled regexes are cached process-wide, keyed by source + flags,
// so repeated scans with the same patterns skip recompilation.
static PATTERN_CACHE: Lazy<DashMap<String, Arc<Regex>>> = Lazy::new(DashMap::new);

/// How a single pattern is evaluated against a line
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Fixed-string search, bypasses the regex engine entirely
    Literal(String),
    Regex(Arc<Regex>),
}

/// Flags controlling pattern compilation
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternOptions {
    pub ignore_case: bool,
    pub whole_word: bool,
    pub whole_line: bool,
    pub literal: bool,
}

impl PatternOptions {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            ignore_case: config.ignore_case,
            whole_word: config.whole_word,
            whole_line: config.whole_line,
            literal: config.literal,
        }
    }
}

/// One raw pattern compiled into a matchable predicate
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub raw: String,
    pub predicate: Predicate,
    /// Set when a literal predicate must apply word-boundary filtering itself
    pub whole_word: bool,
}

/// Owns the compiled predicates for every raw pattern of a scan.
/// Compilation happens once, before any file is opened; a bad pattern
/// aborts the whole run here rather than inside a worker.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    pub fn build(raw_patterns: &[String], opts: PatternOptions) -> ScanResult<Self> {
        let mut patterns = Vec::with_capacity(raw_patterns.len());
        for raw in raw_patterns {
            patterns.push(Self::compile_one(raw, opts)?);
        }
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    fn compile_one(raw: &str, opts: PatternOptions) -> ScanResult<CompiledPattern> {
        // Fixed strings skip the regex engine when no compilation flag forces
        // one. Case-insensitivity stays a regex flag (not a text transform)
        // so match spans keep pointing into the original bytes.
        let fixed = opts.literal || is_simple_pattern(raw);
        if fixed && !opts.ignore_case && !opts.whole_line {
            return Ok(CompiledPattern {
                raw: raw.to_string(),
                predicate: Predicate::Literal(raw.to_string()),
                whole_word: opts.whole_word,
            });
        }

        let mut source = if opts.literal {
            regex::escape(raw)
        } else {
            raw.to_string()
        };
        // Wrap with boundary assertions unless the raw pattern already
        // carries its own anchors; escaped literals never do.
        if opts.whole_word && (opts.literal || !already_bounded(raw)) {
            source = format!(r"\b(?:{source})\b");
        }
        if opts.whole_line && !(source.starts_with('^') && source.ends_with('$')) {
            source = format!("^(?:{source})$");
        }

        let cache_key = format!("{}\u{0}{}", opts.ignore_case, source);
        let regex = if let Some(entry) = PATTERN_CACHE.get(&cache_key) {
            Arc::clone(&entry)
        } else {
            let compiled = RegexBuilder::new(&source)
                .case_insensitive(opts.ignore_case)
                .build()
                .map_err(|e| ScanError::invalid_pattern(raw, e.to_string()))?;
            let compiled = Arc::new(compiled);
            PATTERN_CACHE.insert(cache_key, Arc::clone(&compiled));
            compiled
        };

        Ok(CompiledPattern {
            raw: raw.to_string(),
            predicate: Predicate::Regex(regex),
            whole_word: false,
        })
    }
}

/// A pattern with no regex metacharacters can use plain substring search
fn is_simple_pattern(pattern: &str) -> bool {
    pattern.len() < SIMPLE_PATTERN_THRESHOLD
        && !pattern.contains(|c: char| c.is_ascii_punctuation() && c != '_' && c != '-')
}

/// True when the pattern already begins and ends with an anchor or a
/// word-boundary marker, so wrapping it again would double-apply.
fn already_bounded(pattern: &str) -> bool {
    let starts = pattern.starts_with('^') || pattern.starts_with(r"\b");
    let ends = pattern.ends_with('$') || pattern.ends_with(r"\b");
    starts && ends
}

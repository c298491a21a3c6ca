use super::pattern::{PatternSet, Predicate};

/// One located pattern occurrence: byte offsets into the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// How thoroughly a line is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Stop at the first pattern that matches; spans carry at most one entry
    FirstMatch,
    /// Find every non-overlapping match of every pattern; spans are sorted
    /// ascending and overlapping regions are merged before emission
    LocateAll,
}

/// Result of evaluating one line.
/// `matched` is literal match truth; inversion is applied by the caller.
#[derive(Debug, Clone)]
pub struct LineMatch {
    pub matched: bool,
    pub spans: Vec<MatchSpan>,
}

/// Evaluates lines against a compiled pattern set
#[derive(Debug, Clone)]
pub struct LineMatcher<'a> {
    set: &'a PatternSet,
    mode: MatchMode,
}

impl<'a> LineMatcher<'a> {
    pub fn new(set: &'a PatternSet, mode: MatchMode) -> Self {
        Self { set, mode }
    }

    pub fn evaluate(&self, line: &str) -> LineMatch {
        match self.mode {
            MatchMode::FirstMatch => self.evaluate_first(line),
            MatchMode::LocateAll => self.evaluate_all(line),
        }
    }

    fn evaluate_first(&self, line: &str) -> LineMatch {
        for pattern in self.set.patterns() {
            let span = match &pattern.predicate {
                Predicate::Literal(text) => line
                    .match_indices(text.as_str())
                    .map(|(start, m)| MatchSpan::new(start, start + m.len()))
                    .find(|s| !pattern.whole_word || word_bounded(line, s.start, s.end)),
                Predicate::Regex(regex) => {
                    regex.find(line).map(|m| MatchSpan::new(m.start(), m.end()))
                }
            };
            if let Some(span) = span {
                return LineMatch {
                    matched: true,
                    spans: vec![span],
                };
            }
        }
        LineMatch {
            matched: false,
            spans: Vec::new(),
        }
    }

    fn evaluate_all(&self, line: &str) -> LineMatch {
        let mut spans = Vec::new();
        for pattern in self.set.patterns() {
            match &pattern.predicate {
                Predicate::Literal(text) => {
                    spans.extend(
                        line.match_indices(text.as_str())
                            .map(|(start, m)| MatchSpan::new(start, start + m.len()))
                            .filter(|s| !pattern.whole_word || word_bounded(line, s.start, s.end)),
                    );
                }
                Predicate::Regex(regex) => {
                    spans.extend(
                        regex
                            .find_iter(line)
                            .map(|m| MatchSpan::new(m.start(), m.end())),
                    );
                }
            }
        }
        spans.sort_unstable_by_key(|s| (s.start, s.end));
        let spans = merge_overlapping(spans);
        LineMatch {
            matched: !spans.is_empty(),
            spans,
        }
    }
}

/// Merges overlapping spans (and drops duplicates) so the same text is never
/// printed twice in only-matching output. Adjacent but non-overlapping spans
/// stay separate.
fn merge_overlapping(spans: Vec<MatchSpan>) -> Vec<MatchSpan> {
    let mut merged: Vec<MatchSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start < last.end => {
                last.end = last.end.max(span.end);
            }
            Some(last) if *last == span => {}
            _ => merged.push(span),
        }
    }
    merged
}

/// Reproduces regex `\b` semantics for the literal fast path: a boundary
/// holds at a position iff exactly one of the characters on either side is a
/// word character (alphanumeric or underscore), with string edges counting
/// as non-word.
fn word_bounded(text: &str, start: usize, end: usize) -> bool {
    boundary_at(text, start) && boundary_at(text, end)
}

fn boundary_at(text: &str, idx: usize) -> bool {
    let before = text[..idx].chars().next_back().map_or(false, is_word_char);
    let after = text[idx..].chars().next().map_or(false, is_word_char);
    before != after
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::pattern::{PatternOptions, PatternSet};

    fn build(patterns: &[&str], opts: PatternOptions) -> PatternSet {
        let raw: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        PatternSet::build(&raw, opts).unwrap()
    }

    #[test]
    fn test_locate_all_finds_every_occurrence_in_order() {
        let set = build(&["test"], PatternOptions::default());
        let matcher = LineMatcher::new(&set, MatchMode::LocateAll);
        let line = "this is a test string with test pattern";
        let result = matcher.evaluate(line);
        assert!(result.matched);
        assert_eq!(result.spans.len(), 2);
        for span in &result.spans {
            assert_eq!(&line[span.start..span.end], "test");
        }
        assert!(result.spans[0].start < result.spans[1].start);
    }

    #[test]
    fn test_first_match_records_single_span() {
        let set = build(&["test"], PatternOptions::default());
        let matcher = LineMatcher::new(&set, MatchMode::FirstMatch);
        let result = matcher.evaluate("test and test again");
        assert!(result.matched);
        assert_eq!(result.spans.len(), 1);
        assert_eq!(result.spans[0], MatchSpan::new(0, 4));
    }

    #[test]
    fn test_multiple_patterns_merge_sorted() {
        let set = build(&["word", "test"], PatternOptions::default());
        let matcher = LineMatcher::new(&set, MatchMode::LocateAll);
        let result = matcher.evaluate("test this word and test another word");
        assert_eq!(result.spans.len(), 4);
        let mut prev = 0;
        for span in &result.spans {
            assert!(span.start >= prev);
            prev = span.start;
        }
    }

    #[test]
    fn test_overlapping_spans_are_merged() {
        let set = build(&["abc", "bcd"], PatternOptions::default());
        let matcher = LineMatcher::new(&set, MatchMode::LocateAll);
        let result = matcher.evaluate("xabcdy");
        assert_eq!(result.spans, vec![MatchSpan::new(1, 5)]);
    }

    #[test]
    fn test_duplicate_spans_collapse() {
        let set = build(&["cat", "cat"], PatternOptions::default());
        let matcher = LineMatcher::new(&set, MatchMode::LocateAll);
        let result = matcher.evaluate("a cat here");
        assert_eq!(result.spans.len(), 1);
    }

    #[test]
    fn test_adjacent_spans_stay_separate() {
        let set = build(&["ab", "cd"], PatternOptions::default());
        let matcher = LineMatcher::new(&set, MatchMode::LocateAll);
        let result = matcher.evaluate("abcd");
        assert_eq!(
            result.spans,
            vec![MatchSpan::new(0, 2), MatchSpan::new(2, 4)]
        );
    }

    #[test]
    fn test_literal_whole_word_boundary_rule() {
        let opts = PatternOptions {
            whole_word: true,
            literal: true,
            ..Default::default()
        };
        let set = build(&["cat"], opts);
        let matcher = LineMatcher::new(&set, MatchMode::FirstMatch);

        assert!(matcher.evaluate("the cat sat").matched);
        assert!(matcher.evaluate("cat").matched); // string edges are boundaries
        assert!(matcher.evaluate("a cat,").matched); // punctuation transition
        assert!(!matcher.evaluate("concatenate").matched);
        assert!(!matcher.evaluate("cat_walk").matched); // underscore joins words
        assert!(!matcher.evaluate("cats").matched);
    }

    #[test]
    fn test_literal_whole_word_matches_regex_boundary() {
        // The literal fast path and the regex \b wrapping must agree
        let literal_opts = PatternOptions {
            whole_word: true,
            literal: true,
            ..Default::default()
        };
        let regex_opts = PatternOptions {
            whole_word: true,
            ignore_case: true, // forces the regex path
            ..Default::default()
        };
        let lit = build(&["cat"], literal_opts);
        let re = build(&["cat"], regex_opts);
        for line in ["the cat sat", "concatenate", "cat", "cat5", "-cat-"] {
            let a = LineMatcher::new(&lit, MatchMode::FirstMatch)
                .evaluate(line)
                .matched;
            let b = LineMatcher::new(&re, MatchMode::FirstMatch)
                .evaluate(line)
                .matched;
            assert_eq!(a, b, "boundary disagreement on {line:?}");
        }
    }

    #[test]
    fn test_literal_dot_is_not_a_wildcard() {
        let opts = PatternOptions {
            literal: true,
            ..Default::default()
        };
        let set = build(&["a.b"], opts);
        let matcher = LineMatcher::new(&set, MatchMode::FirstMatch);
        assert!(matcher.evaluate("xa.by").matched);
        assert!(!matcher.evaluate("axbby").matched);
    }

    #[test]
    fn test_no_match_reports_empty_spans() {
        let set = build(&["missing"], PatternOptions::default());
        let matcher = LineMatcher::new(&set, MatchMode::LocateAll);
        let result = matcher.evaluate("nothing here");
        assert!(!result.matched);
        assert!(result.spans.is_empty());
    }
}

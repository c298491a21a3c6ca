use colored::Colorize;
use std::path::Path;

use super::matcher::MatchSpan;
use super::sequencer::OutputEvent;
use crate::config::ScanConfig;

/// Formats a stream's output events into text lines.
///
/// Match lines use `:` between prefix fields, context lines use `-`, and a
/// bare `--` marks a block discontinuity. Highlighting is applied at format
/// time from the match spans, so color never disturbs byte offsets.
#[derive(Debug)]
pub struct Printer {
    path: String,
    line_numbers: bool,
    color: bool,
}

impl Printer {
    pub fn new(path: &Path, config: &ScanConfig) -> Self {
        Self {
            path: path.display().to_string(),
            line_numbers: config.line_numbers,
            color: config.color,
        }
    }

    /// Appends the rendered form of `events` to `out`
    pub fn render(&self, events: &[OutputEvent], out: &mut String) {
        for event in events {
            match event {
                OutputEvent::Separator => out.push_str("--\n"),
                OutputEvent::Context { line_number, text } => {
                    self.render_prefixed(out, '-', *line_number, text);
                }
                OutputEvent::Match {
                    line_number,
                    text,
                    spans,
                } => {
                    if self.color && !spans.is_empty() {
                        let highlighted = highlight(text, spans);
                        self.render_prefixed(out, ':', *line_number, &highlighted);
                    } else {
                        self.render_prefixed(out, ':', *line_number, text);
                    }
                }
                OutputEvent::Portion { line_number, text } => {
                    if self.color {
                        self.render_prefixed(out, ':', *line_number, &format!("{}", text.red().bold()));
                    } else {
                        self.render_prefixed(out, ':', *line_number, text);
                    }
                }
                OutputEvent::FileName => {
                    out.push_str(&self.colored_path());
                    out.push('\n');
                }
                OutputEvent::Count(count) => {
                    out.push_str(&self.colored_path());
                    out.push(':');
                    out.push_str(&count.to_string());
                    out.push('\n');
                }
            }
        }
    }

    fn render_prefixed(&self, out: &mut String, sep: char, line_number: u64, text: &str) {
        out.push_str(&self.colored_path());
        out.push(sep);
        if self.line_numbers {
            if self.color {
                out.push_str(&format!("{}", line_number.to_string().green()));
            } else {
                out.push_str(&line_number.to_string());
            }
            out.push(sep);
        }
        out.push_str(text);
        out.push('\n');
    }

    fn colored_path(&self) -> String {
        if self.color {
            format!("{}", self.path.blue())
        } else {
            self.path.clone()
        }
    }
}

/// Wraps each span of `text` in red bold. Spans are sorted and
/// non-overlapping by the time they reach the printer.
fn highlight(text: &str, spans: &[MatchSpan]) -> String {
    let mut result = String::with_capacity(text.len() + spans.len() * 16);
    let mut cursor = 0;
    for span in spans {
        if span.start < cursor || span.end > text.len() {
            continue;
        }
        result.push_str(&text[cursor..span.start]);
        result.push_str(&format!("{}", text[span.start..span.end].red().bold()));
        cursor = span.end;
    }
    result.push_str(&text[cursor..]);
    result
}

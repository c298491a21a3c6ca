use anyhow::{bail, Context};
use clap::Parser;
use scanr::{scan, ScanConfig};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Search for PATTERN in each FILE.
#[derive(Parser)]
#[command(
    name = "scanr",
    author,
    version,
    about = "Search for PATTERN in each FILE or directory",
    long_about = None,
    after_help = "Example: scanr -i 'hello world' notes.txt src/"
)]
struct Cli {
    /// Pattern to search for (treated as the first path when -e is used)
    pattern: Option<String>,

    /// Files or directories to search
    paths: Vec<PathBuf>,

    /// Pattern to search for (can be specified multiple times)
    #[arg(short = 'e', long = "regexp", value_name = "PATTERN")]
    patterns: Vec<String>,

    /// Ignore case distinctions
    #[arg(short = 'i', long = "ignore-case")]
    ignore_case: bool,

    /// Select non-matching lines
    #[arg(short = 'v', long = "invert-match")]
    invert_match: bool,

    /// Search directories recursively
    #[arg(short = 'r', long = "recursive")]
    recursive: bool,

    /// Print line number with output
    #[arg(short = 'n', long = "line-number")]
    line_number: bool,

    /// Print only names of matching files
    #[arg(short = 'l', long = "files-with-matches")]
    files_with_matches: bool,

    /// Print only a count of matching lines per file
    #[arg(short = 'c', long = "count")]
    count: bool,

    /// Suppress all normal output
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Disable color output
    #[arg(long = "no-color")]
    no_color: bool,

    /// Force PATTERN to match only whole words
    #[arg(short = 'w', long = "word-regexp")]
    word_regexp: bool,

    /// Force PATTERN to match only whole lines
    #[arg(short = 'x', long = "line-regexp")]
    line_regexp: bool,

    /// Treat PATTERN as a fixed string, not a regular expression
    #[arg(short = 'F', long = "fixed-strings")]
    fixed_strings: bool,

    /// Print only the matched parts of matching lines
    #[arg(short = 'o', long = "only-matching")]
    only_matching: bool,

    /// Number of context lines before each match
    #[arg(short = 'B', long = "before-context", default_value = "0", value_name = "NUM")]
    before_context: usize,

    /// Number of context lines after each match
    #[arg(short = 'A', long = "after-context", default_value = "0", value_name = "NUM")]
    after_context: usize,

    /// Number of worker threads (default: CPU count)
    #[arg(short = 'j', long = "threads", value_name = "NUM")]
    threads: Option<NonZeroUsize>,

    /// Glob patterns for files to skip when expanding directories
    #[arg(long = "ignore", value_name = "GLOB")]
    ignore: Vec<String>,

    /// File extensions to include when expanding directories (e.g. rs,go,js)
    #[arg(long = "extensions", value_name = "EXTS")]
    extensions: Option<String>,

    /// Path to a YAML config file
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("scanr: {e:#}");
            2
        }
    };
    std::process::exit(code);
}

fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();

    // With -e, every positional argument is a path
    let (patterns, paths) = if cli.patterns.is_empty() {
        match &cli.pattern {
            Some(pattern) => (vec![pattern.clone()], cli.paths.clone()),
            None => bail!("no pattern provided\nTry 'scanr --help' for more information."),
        }
    } else {
        let mut paths = Vec::new();
        if let Some(first) = &cli.pattern {
            paths.push(PathBuf::from(first));
        }
        paths.extend(cli.paths.iter().cloned());
        (cli.patterns.clone(), paths)
    };

    if paths.is_empty() {
        bail!("no input files specified\nTry 'scanr --help' for more information.");
    }

    let file_extensions = cli.extensions.as_ref().map(|e| {
        e.split(',')
            .map(|s| s.trim().to_string())
            .collect::<Vec<_>>()
    });

    let cli_config = ScanConfig {
        patterns,
        paths,
        ignore_case: cli.ignore_case,
        invert: cli.invert_match,
        recursive: cli.recursive,
        line_numbers: cli.line_number,
        filenames_only: cli.files_with_matches,
        count_only: cli.count,
        quiet: cli.quiet,
        color: !cli.no_color,
        whole_word: cli.word_regexp,
        whole_line: cli.line_regexp,
        literal: cli.fixed_strings,
        only_matching: cli.only_matching,
        before_context: cli.before_context,
        after_context: cli.after_context,
        thread_count: cli
            .threads
            .unwrap_or_else(|| ScanConfig::default().thread_count),
        ignore_patterns: cli.ignore,
        file_extensions,
        ..ScanConfig::default()
    };

    // Config files fill in whatever the command line left at defaults
    let file_config = if let Some(path) = &cli.config {
        ScanConfig::load_from(Some(path))
            .with_context(|| format!("failed to load config from {}", path.display()))?
    } else {
        ScanConfig::load().unwrap_or_default()
    };
    let config = file_config.merge_with_cli(cli_config);

    init_tracing(&config.log_level);

    let summary = scan(&config, &mut std::io::stdout())?;

    if !(config.quiet || config.count_only || config.filenames_only) {
        println!(
            "\nTotal matches found: {} in {} files",
            summary.total_matches, summary.files_processed
        );
    }

    Ok(if summary.total_matches > 0 { 0 } else { 1 })
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Diagnostics go to stderr so they never interleave with results
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

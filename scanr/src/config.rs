use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Configuration for a scan.
///
/// Can be loaded from YAML config files, in order of precedence:
/// 1. Custom config file specified via `--config`
/// 2. Local `.scanr.yaml` in the current directory
/// 3. Global `$CONFIG_DIR/scanr/config.yaml`
///
/// CLI arguments take precedence over file values; the merging behavior is
/// defined in [`ScanConfig::merge_with_cli`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Patterns to search for (regex unless `literal` is set)
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Files and directories to search
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Ignore case distinctions in patterns
    #[serde(default)]
    pub ignore_case: bool,

    /// Select non-matching lines
    #[serde(default)]
    pub invert: bool,

    /// Search directories recursively
    #[serde(default)]
    pub recursive: bool,

    /// Prefix each output line with its line number
    #[serde(default)]
    pub line_numbers: bool,

    /// Print only the names of files containing matches
    #[serde(default)]
    pub filenames_only: bool,

    /// Print only a count of matching lines per file
    #[serde(default)]
    pub count_only: bool,

    /// Suppress all normal output; only the exit status reports matches
    #[serde(default)]
    pub quiet: bool,

    /// Highlight matches, paths and line numbers
    #[serde(default = "default_color")]
    pub color: bool,

    /// Match whole words only
    #[serde(default)]
    pub whole_word: bool,

    /// Match whole lines only
    #[serde(default)]
    pub whole_line: bool,

    /// Treat patterns as fixed strings, not regular expressions
    #[serde(default)]
    pub literal: bool,

    /// Print only the matched parts of matching lines
    #[serde(default)]
    pub only_matching: bool,

    /// Number of context lines to print before each match
    #[serde(default)]
    pub before_context: usize,

    /// Number of context lines to print after each match
    #[serde(default)]
    pub after_context: usize,

    /// Number of worker threads
    /// Defaults to the number of CPU cores if not specified
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Glob patterns for files to skip during directory expansion
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Optional list of file extensions to include (e.g., ["rs", "toml"])
    /// If None, all file extensions are included
    #[serde(default)]
    pub file_extensions: Option<Vec<String>>,
}

fn default_color() -> bool {
    true
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            paths: Vec::new(),
            ignore_case: false,
            invert: false,
            recursive: false,
            line_numbers: false,
            filenames_only: false,
            count_only: false,
            quiet: false,
            color: default_color(),
            whole_word: false,
            whole_line: false,
            literal: false,
            only_matching: false,
            before_context: 0,
            after_context: 0,
            thread_count: default_thread_count(),
            log_level: default_log_level(),
            ignore_patterns: Vec::new(),
            file_extensions: None,
        }
    }
}

impl ScanConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // Default config locations, later entries take precedence
        let config_files = [
            dirs::config_dir().map(|p| p.join("scanr/config.yaml")),
            Some(PathBuf::from(".scanr.yaml")),
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values.
    /// CLI values take precedence over config file values.
    pub fn merge_with_cli(mut self, cli: ScanConfig) -> Self {
        if !cli.patterns.is_empty() {
            self.patterns = cli.patterns;
        }
        if !cli.paths.is_empty() {
            self.paths = cli.paths;
        }
        // Boolean flags only enable behavior; a flag set in the config file
        // cannot be unset from the command line (except color, see below).
        self.ignore_case |= cli.ignore_case;
        self.invert |= cli.invert;
        self.recursive |= cli.recursive;
        self.line_numbers |= cli.line_numbers;
        self.filenames_only |= cli.filenames_only;
        self.count_only |= cli.count_only;
        self.quiet |= cli.quiet;
        self.whole_word |= cli.whole_word;
        self.whole_line |= cli.whole_line;
        self.literal |= cli.literal;
        self.only_matching |= cli.only_matching;
        // --no-color must win over a config file that enables color
        self.color &= cli.color;
        if cli.before_context > 0 {
            self.before_context = cli.before_context;
        }
        if cli.after_context > 0 {
            self.after_context = cli.after_context;
        }
        // Always use the CLI thread count if it differs from the default
        if cli.thread_count != default_thread_count() {
            self.thread_count = cli.thread_count;
        }
        if cli.log_level != default_log_level() {
            self.log_level = cli.log_level;
        }
        if !cli.ignore_patterns.is_empty() {
            self.ignore_patterns = cli.ignore_patterns;
        }
        if cli.file_extensions.is_some() {
            self.file_extensions = cli.file_extensions;
        }
        self
    }
}

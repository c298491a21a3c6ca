use ignore::WalkBuilder;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::pattern::{PatternOptions, PatternSet};
use super::worker::{run_pool, FileQueue, ScanSummary, ScanTotals};
use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};
use crate::filters::should_include_file;

/// Performs a concurrent scan of every path in the configuration, writing
/// formatted results to `output`.
///
/// Pattern compilation happens first and is the only fatal failure; every
/// per-file problem afterwards is logged and skipped. Output ordering within
/// one file follows the input; across files it is undefined.
pub fn scan<W: Write + Send>(config: &ScanConfig, output: &mut W) -> ScanResult<ScanSummary> {
    info!("Starting scan with patterns: {:?}", config.patterns);

    if config.patterns.is_empty() {
        debug!("No search patterns provided, returning empty summary");
        return Ok(ScanSummary::default());
    }

    // Fail fast: a bad pattern aborts before any worker starts
    let set = PatternSet::build(&config.patterns, PatternOptions::from_config(config))?;

    let files = collect_files(config);
    debug!("Found {} files to process", files.len());
    if files.is_empty() {
        return Ok(ScanSummary::default());
    }

    let queue = FileQueue::new(files);
    let totals = ScanTotals::default();
    let sink = Mutex::new(output);

    run_pool(config, &set, &queue, &sink, &totals);

    let summary = totals.summary();
    info!(
        "Scan complete. Found {} matches in {} files",
        summary.total_matches, summary.files_processed
    );
    Ok(summary)
}

/// Resolves the configured paths into the flat list of regular files to
/// scan. Explicitly named files are always included; directories expand
/// through the walker (and its filters) only when `recursive` is set.
fn collect_files(config: &ScanConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in &config.paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            if !config.recursive {
                warn!("{}", ScanError::not_recursive(path.clone()));
                continue;
            }
            let mut walker = WalkBuilder::new(path);
            walker
                .hidden(true)
                .ignore(true)
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true);

            for entry in walker.build() {
                match entry {
                    Ok(entry) => {
                        if entry.file_type().is_some_and(|ft| ft.is_file())
                            && should_include_file(
                                entry.path(),
                                &config.file_extensions,
                                &config.ignore_patterns,
                            )
                        {
                            files.push(entry.into_path());
                        }
                    }
                    Err(e) => {
                        // Non-fatal: the rest of the subtree still gets walked
                        warn!("{}", ScanError::traversal(e.to_string()));
                    }
                }
            }
        } else {
            warn!("Path does not exist: {}", path.display());
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;
    use tempfile::tempdir;

    fn test_config(patterns: Vec<&str>, paths: Vec<PathBuf>) -> ScanConfig {
        ScanConfig {
            patterns: patterns.into_iter().map(String::from).collect(),
            paths,
            color: false,
            line_numbers: true,
            thread_count: NonZeroUsize::new(2).unwrap(),
            ..ScanConfig::default()
        }
    }

    #[test]
    fn test_scan_single_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.txt");
        std::fs::write(&file_path, "test line\nnothing\ntest line 2\n").unwrap();

        let config = test_config(vec!["test"], vec![file_path.clone()]);
        let mut output = Vec::new();
        let summary = scan(&config, &mut output).unwrap();

        assert_eq!(summary.total_matches, 2);
        assert_eq!(summary.files_processed, 1);
        assert_eq!(summary.files_with_matches, 1);

        let text = String::from_utf8(output).unwrap();
        let display = file_path.display().to_string();
        assert!(text.contains(&format!("{display}:1:test line")));
        assert!(text.contains(&format!("{display}:3:test line 2")));
        assert!(!text.contains("nothing"));
    }

    #[test]
    fn test_invalid_pattern_aborts_before_scanning() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.txt");
        std::fs::write(&file_path, "content\n").unwrap();

        let config = test_config(vec!["a("], vec![file_path]);
        let mut output = Vec::new();
        let err = scan(&config, &mut output).unwrap_err();
        assert!(matches!(err, ScanError::InvalidPattern { .. }));
        assert!(output.is_empty(), "no output before the fatal error");
    }

    #[test]
    fn test_directory_without_recursive_is_skipped() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("test.txt"), "match\n").unwrap();

        let config = test_config(vec!["match"], vec![dir.path().to_path_buf()]);
        let mut output = Vec::new();
        let summary = scan(&config, &mut output).unwrap();
        assert_eq!(summary.files_processed, 0);
        assert_eq!(summary.total_matches, 0);
    }

    #[test]
    fn test_recursive_directory_scan() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("nested");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(dir.path().join("a.txt"), "needle one\n").unwrap();
        std::fs::write(sub.join("b.txt"), "needle two\nneedle three\n").unwrap();

        let config = ScanConfig {
            recursive: true,
            ..test_config(vec!["needle"], vec![dir.path().to_path_buf()])
        };
        let mut output = Vec::new();
        let summary = scan(&config, &mut output).unwrap();
        assert_eq!(summary.total_matches, 3);
        assert_eq!(summary.files_processed, 2);
        assert_eq!(summary.files_with_matches, 2);
    }

    #[test]
    fn test_missing_path_is_non_fatal() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("real.txt");
        std::fs::write(&file_path, "match\n").unwrap();

        let config = test_config(
            vec!["match"],
            vec![dir.path().join("ghost.txt"), file_path],
        );
        let mut output = Vec::new();
        let summary = scan(&config, &mut output).unwrap();
        assert_eq!(summary.total_matches, 1);
        assert_eq!(summary.files_processed, 1);
    }

    #[test]
    fn test_empty_patterns_return_empty_summary() {
        let config = test_config(vec![], vec![PathBuf::from(".")]);
        let mut output = Vec::new();
        let summary = scan(&config, &mut output).unwrap();
        assert_eq!(summary, ScanSummary::default());
    }

    #[test]
    fn test_concurrent_totals_match_sequential() {
        let dir = tempdir().unwrap();
        for i in 0..12 {
            let mut content = String::new();
            for j in 0..50 {
                if (i + j) % 3 == 0 {
                    content.push_str(&format!("hit number {j} in file {i}\n"));
                } else {
                    content.push_str(&format!("plain line {j}\n"));
                }
            }
            std::fs::write(dir.path().join(format!("f{i}.txt")), content).unwrap();
        }

        let paths: Vec<PathBuf> = (0..12)
            .map(|i| dir.path().join(format!("f{i}.txt")))
            .collect();

        let sequential = ScanConfig {
            thread_count: NonZeroUsize::new(1).unwrap(),
            ..test_config(vec!["hit"], paths.clone())
        };
        let concurrent = ScanConfig {
            thread_count: NonZeroUsize::new(8).unwrap(),
            ..test_config(vec!["hit"], paths)
        };

        let mut out_a = Vec::new();
        let mut out_b = Vec::new();
        let summary_a = scan(&sequential, &mut out_a).unwrap();
        let summary_b = scan(&concurrent, &mut out_b).unwrap();

        assert_eq!(summary_a, summary_b);
        // Same lines overall, order across files aside
        let mut lines_a: Vec<&str> = std::str::from_utf8(&out_a).unwrap().lines().collect();
        let mut lines_b: Vec<&str> = std::str::from_utf8(&out_b).unwrap().lines().collect();
        lines_a.sort_unstable();
        lines_b.sort_unstable();
        assert_eq!(lines_a, lines_b);
    }
}

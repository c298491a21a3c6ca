use glob::Pattern;
use std::path::Path;

/// Checks if a file should be included based on its extension
pub fn has_valid_extension(path: &Path, extensions: &Option<Vec<String>>) -> bool {
    match extensions {
        None => true,
        Some(exts) => {
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                return exts.iter().any(|e| e.eq_ignore_ascii_case(ext));
            }
            false
        }
    }
}

/// Checks if a file should be skipped based on ignore globs
pub fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    let path_str = path.to_string_lossy();

    ignore_patterns.iter().any(|pattern| {
        if let Ok(p) = Pattern::new(pattern) {
            // Normalize separators so globs written with `/` work everywhere
            let normalized_path = path_str.replace('\\', "/");
            p.matches(&normalized_path)
        } else {
            false
        }
    })
}

/// Checks if a file is likely to be binary, by extension
pub fn is_likely_binary(path: &Path) -> bool {
    const BINARY_EXTENSIONS: &[&str] = &[
        "exe", "dll", "so", "dylib", "bin", "obj", "o", "a", "class", "jar", "png", "jpg", "jpeg",
        "gif", "bmp", "ico", "pdf", "zip", "tar", "gz", "xz", "zst", "7z", "rar",
    ];

    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        return BINARY_EXTENSIONS
            .iter()
            .any(|&bin_ext| bin_ext.eq_ignore_ascii_case(ext));
    }
    false
}

/// Determines whether a walker-discovered file should be scanned.
/// Explicitly named files bypass this entirely.
pub fn should_include_file(
    path: &Path,
    extensions: &Option<Vec<String>>,
    ignore_patterns: &[String],
) -> bool {
    !is_likely_binary(path)
        && has_valid_extension(path, extensions)
        && !should_ignore(path, ignore_patterns)
}

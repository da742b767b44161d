//! Directory listing with shell-style file name patterns (`HD*`, `*.log`, `log_??.txt`).
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;

use crate::fusion_errors::FusionError;

/// Compile a shell-style pattern (`*` and `?` wildcards) into an anchored regex.
pub(crate) fn pattern_to_regex(pattern: &str) -> Result<Regex, FusionError> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Ok(Regex::new(&expr)?)
}

/// List the regular files of `dir` whose name matches `pattern`, sorted by path.
///
/// Arguments
/// -----------------
/// * `dir`: directory to scan (not recursive)
/// * `pattern`: shell-style file name pattern
///
/// Return
/// ----------
/// * the matching paths in lexicographic order
pub fn list_files(dir: &Utf8Path, pattern: &str) -> Result<Vec<Utf8PathBuf>, FusionError> {
    let re = pattern_to_regex(pattern)?;
    let mut files = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        if entry.file_type()?.is_file() && re.is_match(entry.file_name()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

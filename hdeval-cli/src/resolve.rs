//! File-system path expansion for wildcard input patterns.

use hdeval::eval::WildcardPattern;
use hdeval::{HdEvalResult, PathResolver};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expands patterns by walking the directory below their literal prefix.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsResolver;

/// Splits `pattern` into the directory before its first wildcard and the
/// remainder.
fn split_root(pattern: &str) -> (&str, &str) {
    let first_wildcard = pattern.find(['*', '?']).unwrap_or(pattern.len());
    match pattern[..first_wildcard].rfind(['/', '\\']) {
        Some(0) => ("/", &pattern[1..]),
        Some(sep) => (&pattern[..sep], &pattern[sep + 1..]),
        None => ("", pattern),
    }
}

impl PathResolver for FsResolver {
    fn expand(&self, pattern: &str) -> HdEvalResult<Vec<PathBuf>> {
        let compiled = WildcardPattern::new(pattern);
        if !compiled.has_wildcards() {
            let path = PathBuf::from(pattern);
            return Ok(if path.is_file() { vec![path] } else { Vec::new() });
        }

        let (root, rest) = split_root(pattern);
        let depth = rest.split(['/', '\\']).count();
        let walk_root = if root.is_empty() { Path::new(".") } else { Path::new(root) };

        // Linked directories and files count like their targets.
        let mut files: Vec<PathBuf> = WalkDir::new(walk_root)
            .follow_links(true)
            .min_depth(depth)
            .max_depth(depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let path = e.into_path();
                if root.is_empty() {
                    path.strip_prefix(".").map(Path::to_path_buf).unwrap_or(path)
                } else {
                    path
                }
            })
            .filter(|path| compiled.matches(&path.to_string_lossy()))
            .collect();
        files.sort();
        Ok(files)
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Collects every file under `root` whose extension matches `extension`,
/// sorted by path for deterministic pass order.
pub fn files_with_extension(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Shared driver for the textual passes: applies `transform` to every
/// matching file and writes back only when the content changed. Returns the
/// paths that were rewritten.
pub fn rewrite_files<F>(root: &Path, extension: &str, transform: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut changed = Vec::new();
    for path in files_with_extension(root, extension)? {
        let content = read_file(&path)?;
        if let Some(updated) = transform(&content) {
            write_file(&path, &updated)?;
            changed.push(path);
        }
    }
    Ok(changed)
}

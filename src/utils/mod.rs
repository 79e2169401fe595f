use anyhow::{Context, Result};
use std::path::Path;

pub trait PathExt {
    fn ext_lower(&self) -> String;
}

impl PathExt for Path {
    fn ext_lower(&self) -> String {
        self.extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .context(format!("failed to create directory tree {:?}", path))
}

/// True when `path` is a regular file with at least one byte in it
pub fn is_non_empty_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// Write `bytes` under a hidden `.part` name next to `target`, then rename it
/// into place. On failure the partial file is removed and `target` is untouched.
pub fn write_atomically(target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let partial = target.with_file_name(format!(".{}.part", file_name));

    let result =
        std::fs::write(&partial, bytes).and_then(|()| std::fs::rename(&partial, target));
    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    result
}

/// Names of the regular files in `dir` whose extension matches `ext`
/// (case-insensitive), sorted lexicographically.
pub fn list_files_with_extension(dir: &Path, ext: &str) -> Result<Vec<String>> {
    let entries =
        std::fs::read_dir(dir).context(format!("failed to read directory {:?}", dir))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.context(format!("failed to read entry in {:?}", dir))?;
        let path = entry.path();
        if !path.is_file() || path.ext_lower() != ext {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(name.to_string());
        } else {
            warn!("Skipping non UTF-8 file name: {:?}", path);
        }
    }

    names.sort();
    Ok(names)
}

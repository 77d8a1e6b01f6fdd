use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Parent directory of `path`, treating a bare filename as the current dir.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Write content atomically via tempfile + rename, creating parent
/// directories as needed.
///
/// Guarantees the file is either fully written or untouched: a failure
/// mid-export can never leave a partial transcript on disk.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let parent = parent_dir(path);
    std::fs::create_dir_all(&parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    tmp.write_all(content.as_bytes())
        .context("Failed to write to temp file")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("Failed to persist {}", path.display()))?;
    Ok(())
}

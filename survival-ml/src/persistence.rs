//! Write-then-rename helpers for artifact files.
//!
//! Every file the registry produces goes through [`atomic_write`]: the bytes land
//! in a `.tmp` sibling first and are renamed over the target, so a reader never
//! observes a half-written blob or metadata document.

use std::io;
use std::path::Path;

/// Atomically write `data` as pretty-printed JSON.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(data).map_err(io::Error::other)?;
    atomic_write(path, &json)
}

/// Atomically write raw bytes, creating the parent directory if needed.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    if let Err(e) = std::fs::write(&tmp, data).and_then(|()| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

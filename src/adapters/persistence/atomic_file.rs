//! Atomic file replacement shared by the JSON store and CSV export.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Write-replace pattern:
/// 1. Write to `<name>.tmp` next to the target
/// 2. sync_all() so the bytes are on disk
/// 3. Rename over the target
///
/// Readers see either the old file or the new one, never a partial write.
/// Parent directories are created as needed.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let temp_path = temp_path_for(path);
    let mut f = fs::File::create(&temp_path).await?;
    f.write_all(bytes).await?;
    f.sync_all().await?;
    drop(f);

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

use crate::error::PreviewError;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Moves every regular file in `from` into `to`, replacing files with the
/// same name.
pub async fn move_dir_contents(from: &Path, to: &Path) -> Result<Vec<PathBuf>, PreviewError> {
    fs::create_dir_all(to)
        .await
        .map_err(|e| PreviewError::io(format!("creating {}", to.display()), e))?;

    let mut moved = Vec::new();
    for entry in files_in(from) {
        let Some(name) = entry.file_name() else {
            continue;
        };
        let target = to.join(name);
        if fs::rename(&entry, &target).await.is_err() {
            // rename fails across filesystems (tmp on tmpfs)
            fs::copy(&entry, &target)
                .await
                .map_err(|e| PreviewError::io(format!("copying {}", entry.display()), e))?;
            fs::remove_file(&entry)
                .await
                .map_err(|e| PreviewError::io(format!("removing {}", entry.display()), e))?;
        }
        moved.push(target);
    }
    Ok(moved)
}

/// Deletes files directly inside `dir` whose name starts with `prefix` and
/// has extension `ext`. Returns the deleted paths.
pub async fn remove_matching(dir: &Path, prefix: &str, ext: &str) -> Result<Vec<PathBuf>, PreviewError> {
    let mut removed = Vec::new();
    for path in files_in(dir) {
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(prefix))
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches {
            fs::remove_file(&path)
                .await
                .map_err(|e| PreviewError::io(format!("removing {}", path.display()), e))?;
            removed.push(path);
        }
    }
    Ok(removed)
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

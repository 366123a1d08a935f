use std::collections::HashSet;
use std::path::{Path, PathBuf};

use amp_tree::FileEntry;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::config::PackConfig;
use crate::error::{PackError, PackResult};

/// Name of the single top-level directory inside every materialized package.
pub const PACKAGE_DIR: &str = "package";

/// A walked file set written to disk under `<tmp>/package/`.
///
/// Owns its temp directory exclusively. The directory is removed by
/// [`release`](Self::release) or, failing that, when the value is dropped.
#[derive(Debug)]
pub struct MaterializedPackage {
    temp: Option<TempDir>,
    directory_path: PathBuf,
    files: Vec<String>,
}

impl MaterializedPackage {
    /// The `package/` directory holding the files.
    pub fn directory_path(&self) -> &Path {
        &self.directory_path
    }

    /// Relative paths written, in walk order.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn is_released(&self) -> bool {
        self.temp.is_none()
    }

    /// Delete the temp directory. Later calls do nothing.
    pub async fn release(&mut self) -> PackResult<()> {
        release_temp(self.temp.take()).await
    }

    pub(crate) fn into_parts(self) -> (Option<TempDir>, PathBuf, Vec<String>) {
        (self.temp, self.directory_path, self.files)
    }
}

pub(crate) async fn release_temp(temp: Option<TempDir>) -> PackResult<()> {
    let Some(temp) = temp else {
        return Ok(());
    };
    let path = temp.path().to_path_buf();
    tokio::task::spawn_blocking(move || temp.close())
        .await
        .map_err(|e| PackError::Write {
            path: path.clone(),
            source: std::io::Error::other(e),
        })?
        .map_err(PackError::write(&path))?;
    debug!(path = %path.display(), "released temp directory");
    Ok(())
}

/// Write `files` into a fresh temp directory.
///
/// Entries land at `package/<relative_path>` with their recorded mode, or
/// `config.default_mode` when none is recorded. On any failure the partly
/// written directory is removed before the error is returned.
pub async fn materialize(files: &[FileEntry], config: &PackConfig) -> PackResult<MaterializedPackage> {
    let temp = config.tempdir().map_err(PackError::write(
        config.temp_root.clone().unwrap_or_else(std::env::temp_dir),
    ))?;
    let directory_path = temp.path().join(PACKAGE_DIR);
    let mut package = MaterializedPackage {
        temp: Some(temp),
        directory_path,
        files: Vec::with_capacity(files.len()),
    };

    if let Err(err) = write_all(&mut package, files, config.default_mode).await {
        if let Err(cleanup) = package.release().await {
            warn!(error = %cleanup, "failed to clean up partial package");
        }
        return Err(err);
    }

    info!(
        path = %package.directory_path.display(),
        files = package.files.len(),
        "materialized package"
    );
    Ok(package)
}

async fn write_all(package: &mut MaterializedPackage, files: &[FileEntry], default_mode: u32) -> PackResult<()> {
    tokio::fs::create_dir_all(&package.directory_path)
        .await
        .map_err(PackError::write(&package.directory_path))?;
    // First entry wins when a folder lists the same name twice.
    let mut seen = HashSet::with_capacity(files.len());
    for file in files {
        if !seen.insert(file.relative_path.as_str()) {
            warn!(path = %file.relative_path, "skipping duplicate entry");
            continue;
        }
        write_entry(&package.directory_path, file, default_mode).await?;
        package.files.push(file.relative_path.clone());
    }
    Ok(())
}

async fn write_entry(root: &Path, file: &FileEntry, default_mode: u32) -> PackResult<()> {
    let target = root.join(safe_relative(&file.relative_path)?);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(PackError::write(parent))?;
    }
    tokio::fs::write(&target, &file.content)
        .await
        .map_err(PackError::write(&target))?;
    set_mode(&target, file.mode.unwrap_or(default_mode)).await
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> PackResult<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode & 0o777))
        .await
        .map_err(PackError::write(path))
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> PackResult<()> {
    Ok(())
}

/// Map a `/`-joined walk path onto a relative filesystem path.
///
/// Entry names come from documents anyone may edit, so anything that could
/// step out of the package root is refused.
fn safe_relative(path: &str) -> PackResult<PathBuf> {
    let mut out = PathBuf::new();
    for segment in path.split('/') {
        match segment {
            "" | "." | ".." => return Err(PackError::UnsafePath(path.to_string())),
            s if s.contains(['\\', '\0']) => return Err(PackError::UnsafePath(path.to_string())),
            s => out.push(s),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use walkdir::WalkDir;

    use super::*;

    fn entry(path: &str, content: &str, mode: Option<u32>) -> FileEntry {
        FileEntry {
            relative_path: path.to_string(),
            content: Bytes::from(content.to_string()),
            mode,
        }
    }

    fn config_in(root: &Path) -> PackConfig {
        PackConfig {
            temp_root: Some(root.to_path_buf()),
            ..PackConfig::default()
        }
    }

    fn written_files(dir: &Path) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();
        files
    }

    #[tokio::test]
    async fn writes_files_under_package_dir() {
        let parent = tempfile::tempdir().unwrap();
        let files = vec![
            entry("package.json", r#"{"name":"p","version":"1.0.0"}"#, None),
            entry("src/lib/util.js", "export {}", None),
            entry("README.md", "# p", None),
        ];

        let package = materialize(&files, &config_in(parent.path())).await.unwrap();
        assert!(package.directory_path().ends_with(PACKAGE_DIR));
        assert_eq!(package.files(), ["package.json", "src/lib/util.js", "README.md"]);
        assert_eq!(
            written_files(package.directory_path()),
            vec!["README.md", "package.json", "src/lib/util.js"]
        );
        let util = std::fs::read_to_string(package.directory_path().join("src/lib/util.js")).unwrap();
        assert_eq!(util, "export {}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn applies_recorded_and_default_modes() {
        use std::os::unix::fs::PermissionsExt;

        let parent = tempfile::tempdir().unwrap();
        let files = vec![entry("bin/run.sh", "#!/bin/sh", Some(0o755)), entry("index.js", "", None)];
        let package = materialize(&files, &config_in(parent.path())).await.unwrap();

        let mode = |p: &str| {
            std::fs::metadata(package.directory_path().join(p))
                .unwrap()
                .permissions()
                .mode()
                & 0o777
        };
        assert_eq!(mode("bin/run.sh"), 0o755);
        assert_eq!(mode("index.js"), 0o644);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn special_mode_bits_are_dropped() {
        use std::os::unix::fs::PermissionsExt;

        let parent = tempfile::tempdir().unwrap();
        let files = vec![entry("bin/su", "#!/bin/sh", Some(0o6755)), entry("tmp", "", Some(0o1777))];
        let package = materialize(&files, &config_in(parent.path())).await.unwrap();

        let mode = |p: &str| {
            std::fs::metadata(package.directory_path().join(p))
                .unwrap()
                .permissions()
                .mode()
                & 0o7777
        };
        assert_eq!(mode("bin/su"), 0o755);
        assert_eq!(mode("tmp"), 0o777);
    }

    #[tokio::test]
    async fn duplicate_paths_keep_the_first_entry() {
        let parent = tempfile::tempdir().unwrap();
        let files = vec![
            entry("package.json", "{}", None),
            entry("a.txt", "FIRST", None),
            entry("a.txt", "SECOND", None),
        ];

        let package = materialize(&files, &config_in(parent.path())).await.unwrap();
        assert_eq!(package.files(), ["package.json", "a.txt"]);
        let body = std::fs::read_to_string(package.directory_path().join("a.txt")).unwrap();
        assert_eq!(body, "FIRST");
    }

    #[tokio::test]
    async fn unsafe_path_is_rejected_and_cleaned_up() {
        let parent = tempfile::tempdir().unwrap();
        let files = vec![entry("ok.txt", "fine", None), entry("../escape.txt", "nope", None)];

        let err = materialize(&files, &config_in(parent.path())).await.unwrap_err();
        assert!(matches!(err, PackError::UnsafePath(p) if p == "../escape.txt"));
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn file_and_folder_clash_is_a_write_error() {
        let parent = tempfile::tempdir().unwrap();
        let files = vec![entry("lib", "a file", None), entry("lib/index.js", "x", None)];

        let err = materialize(&files, &config_in(parent.path())).await.unwrap_err();
        assert!(matches!(err, PackError::Write { .. }));
        assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let parent = tempfile::tempdir().unwrap();
        let mut package = materialize(&[entry("a.txt", "a", None)], &config_in(parent.path()))
            .await
            .unwrap();
        let dir = package.directory_path().to_path_buf();

        package.release().await.unwrap();
        assert!(package.is_released());
        assert!(!dir.exists());
        package.release().await.unwrap();
    }

    #[tokio::test]
    async fn drop_removes_directory() {
        let parent = tempfile::tempdir().unwrap();
        let package = materialize(&[entry("a.txt", "a", None)], &config_in(parent.path()))
            .await
            .unwrap();
        let dir = package.directory_path().to_path_buf();
        drop(package);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn empty_file_list_still_creates_package_dir() {
        let parent = tempfile::tempdir().unwrap();
        let package = materialize(&[], &config_in(parent.path())).await.unwrap();
        assert!(package.directory_path().is_dir());
        assert!(package.files().is_empty());
    }

    #[test]
    fn safe_relative_rules() {
        assert_eq!(safe_relative("a/b/c.txt").unwrap(), PathBuf::from("a").join("b").join("c.txt"));
        for bad in ["", "/abs", "a//b", "./a", "a/..", "..", "a\\b"] {
            assert!(safe_relative(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}

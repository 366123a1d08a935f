use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;
use tracing::{info, warn};

use crate::error::{PackError, PackResult};
use crate::materialize::{release_temp, MaterializedPackage, PACKAGE_DIR};

/// File name of the archive, written beside the `package/` directory.
pub const ARCHIVE_NAME: &str = "package.tgz";

/// A gzip tarball of a materialized package.
///
/// Owns the whole temp directory: the archive and the `package/` directory
/// it was built from. Releasing the handle removes both.
#[derive(Debug)]
pub struct ArchiveHandle {
    temp: Option<TempDir>,
    archive_path: PathBuf,
    package_dir: PathBuf,
}

impl ArchiveHandle {
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// The materialized directory the archive was built from.
    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    pub fn is_released(&self) -> bool {
        self.temp.is_none()
    }

    /// Delete the archive and its temp directory. Later calls do nothing.
    pub async fn release(&mut self) -> PackResult<()> {
        release_temp(self.temp.take()).await
    }
}

/// Pack a materialized package into `package.tgz`.
///
/// Every file is stored under `package/`, in the order it was written, so
/// entry order follows the walk. On failure the temp directory is removed.
pub async fn archive(package: MaterializedPackage) -> PackResult<ArchiveHandle> {
    let (temp, package_dir, files) = package.into_parts();
    let Some(temp) = temp else {
        return Err(PackError::archive(package_dir, "package already released"));
    };
    let archive_path = temp.path().join(ARCHIVE_NAME);

    let task = {
        let archive_path = archive_path.clone();
        let package_dir = package_dir.clone();
        tokio::task::spawn_blocking(move || {
            let result = write_tarball(&archive_path, &package_dir, &files).map(|()| files.len());
            (temp, result)
        })
    };

    let (temp, entries) = match task.await {
        Ok((temp, Ok(entries))) => (temp, entries),
        Ok((temp, Err(err))) => {
            if let Err(cleanup) = release_temp(Some(temp)).await {
                warn!(error = %cleanup, "failed to clean up after archive error");
            }
            return Err(err);
        }
        Err(join) => return Err(PackError::archive(&archive_path, join)),
    };

    info!(path = %archive_path.display(), entries, "archived package");
    Ok(ArchiveHandle {
        temp: Some(temp),
        archive_path,
        package_dir,
    })
}

fn write_tarball(archive_path: &Path, package_dir: &Path, files: &[String]) -> PackResult<()> {
    let out = File::create(archive_path).map_err(PackError::write(archive_path))?;
    let mut tar = tar::Builder::new(GzEncoder::new(out, Compression::default()));

    for relative in files {
        let source = package_dir.join(relative);
        let name = format!("{PACKAGE_DIR}/{relative}");
        tar.append_path_with_name(&source, &name)
            .map_err(|e| PackError::archive(&source, e))?;
    }

    let gz = tar.into_inner().map_err(|e| PackError::archive(archive_path, e))?;
    let out = gz.finish().map_err(|e| PackError::archive(archive_path, e))?;
    out.sync_all().map_err(PackError::write(archive_path))?;
    Ok(())
}

/// List the entry paths of a gzip tarball, in archive order.
pub fn read_entries(archive_path: &Path) -> PackResult<Vec<String>> {
    let file = File::open(archive_path).map_err(PackError::write(archive_path))?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let entries = archive
        .entries()
        .map_err(|e| PackError::archive(archive_path, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PackError::archive(archive_path, e))?;
        let path = entry.path().map_err(|e| PackError::archive(archive_path, e))?;
        names.push(path.to_string_lossy().replace('\\', "/"));
    }
    Ok(names)
}

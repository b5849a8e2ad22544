//! Downloading engine binaries packaged as zip archives

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use zip::ZipArchive;

use crate::error::{Error, Result};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// One downloadable build of an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineDownload {
    /// URL of the zip archive
    pub zip: String,
    /// Path of the executable inside the archive
    pub binary_filename: String,
}

/// Fetches and unpacks `download` into `folder`, returning the path of the
/// executable.
pub async fn download_to_folder(download: &EngineDownload, folder: &Path) -> Result<PathBuf> {
    info!("Downloading {} to {}", download.zip, folder.display());

    let client = reqwest::Client::builder().timeout(DOWNLOAD_TIMEOUT).build()?;
    let bytes = client
        .get(&download.zip)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let folder = folder.to_path_buf();
    let binary_filename = download.binary_filename.clone();
    tokio::task::spawn_blocking(move || extract_archive(&bytes, &folder, &binary_filename))
        .await
        .map_err(|e| Error::EngineDirectory(format!("extraction did not finish: {}", e)))?
}

/// Unpacks a zip archive and makes `binary_filename` executable
pub fn extract_archive(bytes: &[u8], folder: &Path, binary_filename: &str) -> Result<PathBuf> {
    let relative_binary = Path::new(binary_filename);
    if !relative_binary
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(Error::EngineDirectory(format!(
            "binary path {} must stay inside the archive",
            binary_filename
        )));
    }

    fs::create_dir_all(folder)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            warn!("Skipping archive entry outside the folder: {}", entry.name());
            continue;
        };
        let out = folder.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&out)?;
        io::copy(&mut entry, &mut file)?;
    }

    let binary = folder.join(relative_binary);
    if !binary.is_file() {
        return Err(Error::EngineDirectory(format!(
            "{} not found in archive",
            binary_filename
        )));
    }

    make_executable(&binary)?;
    info!("Engine binary ready at {}", binary.display());
    Ok(binary)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

//! Writes the composed bitmap to the one shared PNG in the cache

use image::{ImageFormat, RgbaImage};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::PersistError;

/// Folder under the cache root that holds shared files
pub const SHARED_DIR: &str = "images";

/// File name of the shared PNG, reused on every share
pub const SHARED_FILE: &str = "shared_image.png";

/// Shareable handle to the persisted PNG
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    /// Absolute location on disk
    pub path: PathBuf,
    /// Location relative to the cache root
    pub relative: PathBuf,
    /// Authority the reference is scoped to
    pub authority: String,
}

impl FileReference {
    /// `content://<authority>/images/shared_image.png`
    pub fn uri(&self) -> String {
        let relative: Vec<String> = self
            .relative
            .iter()
            .map(|part| part.to_string_lossy().into_owned())
            .collect();
        format!("content://{}/{}", self.authority, relative.join("/"))
    }
}

/// Where the shared PNG lives for a given cache root
pub fn shared_image_path(cache_root: &Path) -> PathBuf {
    cache_root.join(SHARED_DIR).join(SHARED_FILE)
}

/// Write `buffer` as PNG to the shared path.
/// Runs on a blocking worker.
pub async fn persist(
    buffer: RgbaImage,
    cache_root: PathBuf,
    authority: String,
) -> Result<FileReference, PersistError> {
    tokio::task::spawn_blocking(move || persist_blocking(&buffer, &cache_root, &authority))
        .await
        .map_err(|e| PersistError::Worker(e.to_string()))?
}

/// Blocking version of `persist`.
///
/// Not atomic: a crash mid-write leaves a truncated file, which the next
/// share overwrites.
pub fn persist_blocking(
    buffer: &RgbaImage,
    cache_root: &Path,
    authority: &str,
) -> Result<FileReference, PersistError> {
    let folder = cache_root.join(SHARED_DIR);
    fs::create_dir_all(&folder).map_err(|e| PersistError::CreateDir {
        path: folder.clone(),
        message: e.to_string(),
    })?;

    let path = shared_image_path(cache_root);
    let write_error = |e: std::io::Error| PersistError::Write {
        path: path.clone(),
        message: e.to_string(),
    };

    let file = File::create(&path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    buffer
        .write_to(&mut writer, ImageFormat::Png)
        .map_err(|e| PersistError::Encode(e.to_string()))?;
    writer.flush().map_err(write_error)?;

    info!("💾 Saved shared image: {}", path.display());

    Ok(FileReference {
        path,
        relative: Path::new(SHARED_DIR).join(SHARED_FILE),
        authority: authority.to_string(),
    })
}

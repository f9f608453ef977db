// src/file/images.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, Context, anyhow};

/// Result images kept next to the history file
#[derive(Debug, Clone)]
pub struct ImageArchive {
    dir: PathBuf,
}

impl ImageArchive {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join("images"),
        }
    }

    pub fn save(&self, analysis_id: &str, extension: &str, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create image directory {}", self.dir.display()))?;

        let path = self.dir.join(format!("{}.{}", analysis_id, extension));
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write image {}", path.display()))?;
        Ok(path)
    }

    pub fn read(&self, image_url: &str) -> Result<Vec<u8>> {
        fs::read(image_url).with_context(|| format!("Failed to read image {}", image_url))
    }

    /// Copies a stored image to a user-chosen destination
    pub fn export(&self, image_url: &str, dest: &Path) -> Result<()> {
        fs::copy(image_url, dest)
            .with_context(|| format!("Failed to save image to {}", dest.display()))?;
        Ok(())
    }

    /// Deletes a stored image; paths outside the archive are left alone
    pub fn remove(&self, image_url: &str) -> Result<()> {
        let path = Path::new(image_url);
        if !path.starts_with(&self.dir) {
            return Err(anyhow!("Not an archived image: {}", image_url));
        }
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete image {}", image_url)),
        }
    }
}

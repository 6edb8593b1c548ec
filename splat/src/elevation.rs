//! Auxiliary terrain elevation (`.sdf`) data directory.

use crate::error::SplatError;
use log::{debug, info};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone)]
pub struct ElevationData {
    dir: PathBuf,
}

impl ElevationData {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replaces the whole data set with `files`.
    ///
    /// Each file is stored under the base name of its (possibly
    /// client-supplied) name. All names are checked before anything is
    /// removed. Returns the number of files stored.
    pub fn replace<I, N, B>(&self, files: I) -> Result<usize, SplatError>
    where
        I: IntoIterator<Item = (N, B)>,
        N: AsRef<str>,
        B: AsRef<[u8]>,
    {
        let mut staged = BTreeMap::new();
        for (name, bytes) in files {
            staged.insert(base_name(name.as_ref())?, bytes);
        }

        self.clear()?;
        for (name, bytes) in &staged {
            let path = self.dir.join(name);
            fs::write(&path, bytes.as_ref())?;
            debug!("stored {}", path.display());
        }
        info!("stored {} elevation files in {}", staged.len(), self.dir.display());
        Ok(staged.len())
    }

    /// Returns the paths of all stored files, sorted.
    pub fn files(&self) -> Result<Vec<PathBuf>, SplatError> {
        let mut files = Vec::new();
        match fs::read_dir(&self.dir) {
            Ok(entries) => {
                for entry in entries {
                    let path = entry?.path();
                    if path.is_file() {
                        files.push(path);
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        files.sort();
        Ok(files)
    }

    /// Returns the number of tiles the tool will recognize.
    pub fn tile_count(&self) -> Result<usize, SplatError> {
        Ok(self
            .files()?
            .iter()
            .filter(|path| is_tile(path))
            .count())
    }

    fn clear(&self) -> Result<(), SplatError> {
        if self.dir.exists() {
            for entry in fs::read_dir(&self.dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    fs::remove_dir_all(&path)?;
                } else {
                    fs::remove_file(&path)?;
                }
            }
        } else {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

/// `.sdf` tiles, plain or bzip2 compressed.
fn is_tile(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.ends_with(".sdf") || name.ends_with(".sdf.bz2"))
}

/// Strips any directory components, accepting both separators since
/// names may come from a browser on another platform.
fn base_name(name: &str) -> Result<String, SplatError> {
    let base = name.rsplit(&['/', '\\'][..]).next().unwrap_or_default().trim();
    if base.is_empty() || base == "." || base == ".." {
        return Err(SplatError::UploadName(name.to_owned()));
    }
    Ok(base.to_owned())
}

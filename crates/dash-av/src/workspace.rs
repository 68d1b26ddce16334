//! Staging directory for DASH output.

use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Staging area for one DASH package.
///
/// The engine writes the manifest and segments into a hidden directory
/// created next to the final manifest (same filesystem, so moves are
/// renames). [`finalize`](Workspace::finalize) moves everything into place;
/// dropping the workspace without finalizing removes all partial output.
///
/// # Example
///
/// ```no_run
/// use dash_av::Workspace;
///
/// let workspace = Workspace::new("/srv/media/stream.mpd")?;
/// // run ffmpeg writing to workspace.manifest()
/// workspace.finalize()?;
/// # Ok::<(), dash_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    destination_dir: PathBuf,
    manifest_name: OsString,
}

impl Workspace {
    /// Create a staging workspace for the given manifest path, creating the
    /// destination directory if needed.
    pub fn new<P: AsRef<Path>>(manifest: P) -> Result<Self> {
        let manifest = manifest.as_ref();

        let manifest_name = manifest
            .file_name()
            .ok_or_else(|| Error::InvalidInput("Invalid output manifest path".to_string()))?
            .to_os_string();

        let destination_dir = match manifest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        std::fs::create_dir_all(&destination_dir).map_err(|e| {
            Error::Workspace(format!(
                "Failed to create output directory {}: {}",
                destination_dir.display(),
                e
            ))
        })?;

        let temp_dir = tempfile::Builder::new()
            .prefix(".dash-staging-")
            .tempdir_in(&destination_dir)
            .map_err(|e| Error::Workspace(e.to_string()))?;

        Ok(Self {
            temp_dir,
            destination_dir,
            manifest_name,
        })
    }

    /// Manifest path inside the staging directory.
    pub fn manifest(&self) -> PathBuf {
        self.temp_dir.path().join(&self.manifest_name)
    }

    /// Get the staging directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory the package is moved into.
    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// Move all staged files into the destination directory.
    ///
    /// Segments are moved before the manifest, so a manifest in the
    /// destination always refers to segments that are already there. If a
    /// move fails, files moved so far are removed again.
    pub fn finalize(self) -> Result<PathBuf> {
        let staged_manifest = self.manifest();
        if !staged_manifest.exists() {
            return Err(Error::Workspace(format!(
                "Engine did not produce a manifest: {:?}",
                staged_manifest
            )));
        }

        let mut segments = Vec::new();
        for entry in std::fs::read_dir(self.temp_dir.path())? {
            let entry = entry?;
            if entry.file_type()?.is_file() && entry.file_name() != self.manifest_name {
                segments.push(entry.file_name());
            }
        }
        segments.sort();
        segments.push(self.manifest_name.clone());

        let mut moved: Vec<PathBuf> = Vec::with_capacity(segments.len());
        for name in &segments {
            let from = self.temp_dir.path().join(name);
            let to = self.destination_dir.join(name);
            if let Err(e) = std::fs::rename(&from, &to) {
                for path in &moved {
                    let _ = std::fs::remove_file(path);
                }
                return Err(Error::Workspace(format!(
                    "Failed to move {:?} into {}: {}",
                    name,
                    self.destination_dir.display(),
                    e
                )));
            }
            moved.push(to);
        }

        tracing::debug!(
            "Moved {} staged files into {}",
            moved.len(),
            self.destination_dir.display()
        );

        Ok(self.destination_dir.join(&self.manifest_name))
    }

    /// Clean up without finalizing (discard output).
    pub fn cleanup(self) {
        drop(self.temp_dir);
    }
}

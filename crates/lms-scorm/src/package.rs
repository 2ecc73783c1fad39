//! The SCORM import pipeline.
//!
//! `archive → staging directory → manifest → launch file → extraction
//! directory`. Each import owns one directory under
//! `files/scorm/<course>/<title>` of the public root. The archive is unpacked
//! into a sibling staging directory and only swapped into place once its
//! launch file resolves, so a failed import leaves the previous package as it
//! was.

use std::fs;
use std::path::{Path, PathBuf};

use lms_core::{CourseId, ScormLocation};
use uuid::Uuid;

use crate::archive::extract_archive;
use crate::assets::AssetRoot;
use crate::error::{ScormError, ScormResult};
use crate::manifest::{find_manifest, resolve_launch_file};

/// What an extracted directory contains, without requiring it to be launchable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageContents {
    pub root: PathBuf,
    pub manifest_file: Option<PathBuf>,
    pub launch_file: Option<PathBuf>,
}

/// A successfully imported package, with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScormPackage {
    pub extract_dir: PathBuf,
    pub manifest_file: PathBuf,
    pub launch_file: PathBuf,
    pub files_extracted: usize,
}

/// Extracts uploaded SCORM archives into the public asset tree.
#[derive(Debug, Clone)]
pub struct ScormImporter {
    assets: AssetRoot,
}

impl ScormImporter {
    pub fn new(assets: AssetRoot) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &AssetRoot {
        &self.assets
    }

    /// Directory a package for (course, title) is extracted into.
    pub fn extraction_dir(&self, course: CourseId, title: &str) -> PathBuf {
        self.assets.scorm_dir(&course.to_string(), title)
    }

    /// Extract `archive` for (course, title) and resolve its launch file.
    ///
    /// On success any previous extraction for the same (course, title) is
    /// replaced. On failure it is left untouched and nothing new remains on
    /// disk.
    pub fn import(&self, course: CourseId, title: &str, archive: &Path) -> ScormResult<ScormPackage> {
        let extract_dir = self.extraction_dir(course, title);
        let staging = staging_dir(&extract_dir);

        let staged = extract_archive(archive, &staging).and_then(|files| {
            let (manifest, launch) = locate_launch(&staging)?;
            Ok((files, manifest, launch))
        });
        let (files_extracted, manifest_file, launch_file) = match staged {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    course = %course,
                    title = %title,
                    error = %e,
                    "SCORM import failed, discarding staged files"
                );
                discard(&staging);
                return Err(e);
            }
        };

        if let Err(e) = swap_into_place(&staging, &extract_dir) {
            discard(&staging);
            return Err(e);
        }
        let manifest_file = rebase(&manifest_file, &staging, &extract_dir);
        let launch_file = rebase(&launch_file, &staging, &extract_dir);

        tracing::info!(
            course = %course,
            title = %title,
            files = files_extracted,
            launch_file = %launch_file.display(),
            "SCORM package imported"
        );

        Ok(ScormPackage {
            extract_dir,
            manifest_file,
            launch_file,
            files_extracted,
        })
    }

    /// Import the archive behind an upload URL and return root-relative paths.
    pub fn import_upload(
        &self,
        course: CourseId,
        title: &str,
        upload_url: &str,
    ) -> ScormResult<ScormLocation> {
        let archive = self.assets.resolve_upload(upload_url)?;
        let package = self.import(course, title, &archive)?;
        self.location(&package, upload_url)
    }

    /// Root-relative paths of an imported package.
    pub fn location(&self, package: &ScormPackage, upload_url: &str) -> ScormResult<ScormLocation> {
        Ok(ScormLocation {
            scorm_package: upload_url.to_string(),
            scorm_package_path: self.assets.to_relative(&package.extract_dir)?,
            manifest_file: self.assets.to_relative(&package.manifest_file)?,
            launch_file: self.assets.to_relative(&package.launch_file)?,
        })
    }

    /// Remove an extracted package given its root-relative path.
    ///
    /// Returns `false` when there was nothing to remove.
    pub fn remove_package(&self, package_path: &str) -> ScormResult<bool> {
        let dir = self.assets.resolve_public(package_path)?;
        let scorm_root = self.assets.public_dir().join(crate::assets::SCORM_DIR);
        if !dir.starts_with(&scorm_root) || dir == scorm_root {
            return Err(ScormError::InvalidPath(format!(
                "{} is not a SCORM package directory",
                package_path
            )));
        }

        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                tracing::info!(path = %package_path, "SCORM package removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %package_path, "SCORM package already absent");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Describe an extracted directory: manifest and launch file if present.
///
/// Unlike [`ScormImporter::import`] this does not fail when the manifest or
/// the launch resource is missing.
pub fn inspect_dir(root: &Path) -> ScormResult<PackageContents> {
    let manifest_file = find_manifest(root)?;
    let launch_file = match &manifest_file {
        Some(manifest) => match resolve_launch_file(manifest) {
            Ok(launch) => Some(launch),
            Err(ScormError::NoLaunchableResource(_)) => None,
            Err(e) => return Err(e),
        },
        None => None,
    };

    Ok(PackageContents {
        root: root.to_path_buf(),
        manifest_file,
        launch_file,
    })
}

fn locate_launch(root: &Path) -> ScormResult<(PathBuf, PathBuf)> {
    let manifest = find_manifest(root)?.ok_or(ScormError::MissingManifest)?;
    let launch = resolve_launch_file(&manifest)?;
    Ok((manifest, launch))
}

/// Hidden sibling of `dest` that a single import unpacks into.
fn staging_dir(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.staging-{}", name, Uuid::new_v4().simple()))
}

/// Replace `dest` with the fully resolved `staging` tree.
fn swap_into_place(staging: &Path, dest: &Path) -> ScormResult<()> {
    match fs::remove_dir_all(dest) {
        Ok(()) => tracing::debug!(dest = %dest.display(), "Replacing previous extraction"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::rename(staging, dest)?;
    Ok(())
}

fn discard(staging: &Path) {
    match fs::remove_dir_all(staging) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(error = %e, "Failed to remove staged extraction"),
    }
}

fn rebase(path: &Path, from: &Path, to: &Path) -> PathBuf {
    path.strip_prefix(from)
        .map(|rest| to.join(rest))
        .unwrap_or_else(|_| path.to_path_buf())
}

//! SCORM package import for the LMS backend.
//!
//! An uploaded zip is extracted under the public asset root, its
//! `imsmanifest.xml` located, and the launch file resolved from the first
//! `sco` resource. Everything here works on the filesystem only; recording
//! the resulting paths on a chapter is the store's job.

pub mod archive;
pub mod assets;
pub mod error;
pub mod manifest;
pub mod package;

pub use archive::extract_archive;
pub use assets::{AssetRoot, FileInfo, PRIVATE_FILES_PREFIX, PUBLIC_FILES_PREFIX, SCORM_DIR, path_segment};
pub use error::{ScormError, ScormResult};
pub use manifest::{
    MANIFEST_FILE_NAME, ManifestResource, find_manifest, launch_href, parse_resources,
    resolve_launch_file,
};
pub use package::{PackageContents, ScormImporter, ScormPackage, inspect_dir};

//! Error types for SCORM ingestion.

use thiserror::Error;

/// Result type alias for importer operations.
pub type ScormResult<T> = Result<T, ScormError>;

/// Errors that can occur while importing or removing a SCORM package.
///
/// Messages name paths relative to the package, never absolute server paths,
/// so they can be shown to the uploader as they are.
#[derive(Debug, Error)]
pub enum ScormError {
    /// The upload is not a readable zip archive, or an entry would land
    /// outside the extraction directory.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// No `imsmanifest.xml` anywhere in the extracted tree.
    #[error("package contains no imsmanifest.xml")]
    MissingManifest,

    /// The manifest declares no `sco` resource with an `href`, or the launch
    /// file it names is not in the package.
    #[error("no launchable sco resource: {0}")]
    NoLaunchableResource(String),

    /// The manifest is not well-formed XML.
    #[error("invalid imsmanifest.xml: {0}")]
    InvalidManifest(String),

    /// A path or URL does not resolve inside the asset root.
    #[error("invalid asset path: {0}")]
    InvalidPath(String),

    /// Directory traversal failed.
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// Filesystem error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScormError {
    /// Stable tag naming the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArchive(_) => "InvalidArchive",
            Self::MissingManifest => "MissingManifest",
            Self::NoLaunchableResource(_) => "NoLaunchableResource",
            Self::InvalidManifest(_) => "InvalidManifest",
            Self::InvalidPath(_) => "InvalidPath",
            Self::Walk(_) | Self::Io(_) => "Io",
        }
    }

    /// Whether the failure was caused by the uploaded content rather than the
    /// server's filesystem.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Walk(_) | Self::Io(_))
    }
}

impl From<zip::result::ZipError> for ScormError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Self::Io(e),
            other => Self::InvalidArchive(other.to_string()),
        }
    }
}

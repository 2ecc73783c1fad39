//! Asset roots and path translation.
//!
//! Uploaded files and extracted packages live under two directories: a public
//! root served as static content and a private root for files that need an
//! authorised download. Clients only ever see root-relative URLs such as
//! `/files/scorm/<course>/<title>/index.html`; this module converts between
//! those URLs and absolute paths and refuses anything that would resolve
//! outside a root.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ScormError, ScormResult};

/// URL prefix of publicly served uploads.
pub const PUBLIC_FILES_PREFIX: &str = "/files/";

/// URL prefix of private uploads.
pub const PRIVATE_FILES_PREFIX: &str = "/private/files/";

/// Directory (under the public root) holding extracted SCORM packages.
pub const SCORM_DIR: &str = "files/scorm";

/// Name and size of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Name the file was uploaded under, without the stored-name prefix.
    pub file_name: String,
    pub file_size: u64,
    pub file_url: String,
}

/// The public and private asset directories.
#[derive(Debug, Clone)]
pub struct AssetRoot {
    public: PathBuf,
    private: PathBuf,
}

impl AssetRoot {
    pub fn new(public: impl Into<PathBuf>, private: impl Into<PathBuf>) -> Self {
        Self {
            public: public.into(),
            private: private.into(),
        }
    }

    pub fn public_dir(&self) -> &Path {
        &self.public
    }

    pub fn private_dir(&self) -> &Path {
        &self.private
    }

    /// Extraction directory for a package, unique per (course, title).
    pub fn scorm_dir(&self, course: &str, title: &str) -> PathBuf {
        self.public
            .join(SCORM_DIR)
            .join(path_segment(course))
            .join(path_segment(title))
    }

    /// Root-relative URL of a path under the public root.
    pub fn to_relative(&self, path: &Path) -> ScormResult<String> {
        let rest = path.strip_prefix(&self.public).map_err(|_| {
            tracing::debug!(path = %path.display(), "Path outside the public root");
            ScormError::InvalidPath("path is outside the public root".to_string())
        })?;

        let mut url = String::new();
        for component in rest.components() {
            match component {
                Component::Normal(part) => {
                    url.push('/');
                    url.push_str(&part.to_string_lossy());
                }
                Component::CurDir => {}
                _ => {
                    return Err(ScormError::InvalidPath(format!(
                        "{} is not a plain path",
                        rest.display()
                    )));
                }
            }
        }
        if url.is_empty() {
            url.push('/');
        }
        Ok(url)
    }

    /// Absolute path of a root-relative public URL.
    pub fn resolve_public(&self, relative: &str) -> ScormResult<PathBuf> {
        Ok(self.public.join(checked_relative(relative)?))
    }

    /// Absolute path of an uploaded file given its URL.
    ///
    /// `/private/files/...` resolves under the private root, `/files/...`
    /// under the public root.
    pub fn resolve_upload(&self, file_url: &str) -> ScormResult<PathBuf> {
        if let Some(rest) = file_url.strip_prefix(PRIVATE_FILES_PREFIX) {
            return Ok(self.private.join("files").join(checked_relative(rest)?));
        }
        if let Some(rest) = file_url.strip_prefix(PUBLIC_FILES_PREFIX) {
            return Ok(self.public.join("files").join(checked_relative(rest)?));
        }
        Err(ScormError::InvalidPath(format!(
            "{} is not an uploaded file URL",
            file_url
        )))
    }

    /// Store uploaded bytes and return the file URL.
    ///
    /// The stored name is prefixed with a random id so that uploads never
    /// overwrite each other.
    pub fn store_upload(&self, file_name: &str, bytes: &[u8], private: bool) -> ScormResult<String> {
        let (root, prefix) = if private {
            (&self.private, PRIVATE_FILES_PREFIX)
        } else {
            (&self.public, PUBLIC_FILES_PREFIX)
        };
        let dir = root.join("files");
        fs::create_dir_all(&dir)?;

        let stored = format!("{}-{}", Uuid::new_v4().simple(), path_segment(file_name));
        fs::write(dir.join(&stored), bytes)?;

        tracing::debug!(file = %stored, size = bytes.len(), private, "Stored upload");
        Ok(format!("{}{}", prefix, stored))
    }

    /// Describe an uploaded file. Returns `None` when no regular file exists
    /// at the URL.
    pub fn file_info(&self, file_url: &str) -> ScormResult<Option<FileInfo>> {
        let path = self.resolve_upload(file_url)?;
        let metadata = match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Some(FileInfo {
            file_name: upload_name(&stored).to_string(),
            file_size: metadata.len(),
            file_url: file_url.to_string(),
        }))
    }
}

/// Strip the random `<32 hex>-` prefix `store_upload` puts on stored names.
fn upload_name(stored: &str) -> &str {
    match stored.split_once('-') {
        Some((id, name))
            if id.len() == 32 && id.bytes().all(|b| b.is_ascii_hexdigit()) && !name.is_empty() =>
        {
            name
        }
        _ => stored,
    }
}

/// Reduce arbitrary text to one safe path segment.
///
/// Separators and control characters become `_`; names that would be empty
/// or refer to `.`/`..` become `untitled`.
pub fn path_segment(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == ':' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "untitled".to_string()
    } else {
        cleaned
    }
}

fn checked_relative(relative: &str) -> ScormResult<PathBuf> {
    let trimmed = relative.trim_start_matches('/');
    let path = Path::new(trimmed);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => {
                return Err(ScormError::InvalidPath(format!(
                    "{} escapes the asset root",
                    relative
                )));
            }
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(ScormError::InvalidPath(format!("{} is empty", relative)));
    }
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> AssetRoot {
        AssetRoot::new("/srv/site/public", "/srv/site/private")
    }

    #[test]
    fn scorm_dir_is_namespaced_by_course_and_title() {
        let dir = root().scorm_dir("course-1", "Intro to Rust");
        assert_eq!(
            dir,
            PathBuf::from("/srv/site/public/files/scorm/course-1/Intro to Rust")
        );
    }

    #[test]
    fn titles_cannot_escape_their_directory() {
        assert_eq!(path_segment("../../etc"), ".._.._etc");
        assert_eq!(path_segment(".."), "untitled");
        assert_eq!(path_segment("  "), "untitled");
        assert_eq!(path_segment("a/b\\c"), "a_b_c");
    }

    #[test]
    fn relative_urls_start_with_slash() {
        let r = root();
        let path = r.scorm_dir("c", "t").join("res").join("index.html");
        assert_eq!(
            r.to_relative(&path).unwrap(),
            "/files/scorm/c/t/res/index.html"
        );
        assert!(r.to_relative(Path::new("/tmp/elsewhere")).is_err());
    }

    #[test]
    fn resolve_public_rejects_parent_dirs() {
        let r = root();
        assert_eq!(
            r.resolve_public("/files/scorm/c/t").unwrap(),
            PathBuf::from("/srv/site/public/files/scorm/c/t")
        );
        assert!(r.resolve_public("/files/../../secret").is_err());
        assert!(r.resolve_public("/").is_err());
    }

    #[test]
    fn resolve_upload_distinguishes_private_files() {
        let r = root();
        assert_eq!(
            r.resolve_upload("/files/pkg.zip").unwrap(),
            PathBuf::from("/srv/site/public/files/pkg.zip")
        );
        assert_eq!(
            r.resolve_upload("/private/files/pkg.zip").unwrap(),
            PathBuf::from("/srv/site/private/files/pkg.zip")
        );
        assert!(r.resolve_upload("https://example.com/pkg.zip").is_err());
        assert!(r.resolve_upload("/files/../private/files/pkg.zip").is_err());
    }

    #[test]
    fn file_info_reports_upload_name_and_size() {
        let tmp = tempfile::tempdir().unwrap();
        let r = AssetRoot::new(tmp.path().join("public"), tmp.path().join("private"));

        let url = r.store_upload("unit-1.zip", b"12345", true).unwrap();
        let info = r.file_info(&url).unwrap().unwrap();
        assert_eq!(info.file_name, "unit-1.zip");
        assert_eq!(info.file_size, 5);
        assert_eq!(info.file_url, url);

        assert_eq!(r.file_info("/files/missing.zip").unwrap(), None);
        assert!(r.file_info("/files/../secret").is_err());
    }

    #[test]
    fn upload_name_keeps_names_without_prefix() {
        assert_eq!(upload_name("notes-v2.pdf"), "notes-v2.pdf");
        assert_eq!(
            upload_name("0123456789abcdef0123456789abcdef-notes.pdf"),
            "notes.pdf"
        );
    }

    #[test]
    fn store_upload_writes_under_files() {
        let tmp = tempfile::tempdir().unwrap();
        let r = AssetRoot::new(tmp.path().join("public"), tmp.path().join("private"));

        let url = r.store_upload("pkg.zip", b"data", false).unwrap();
        assert!(url.starts_with("/files/"));
        assert!(url.ends_with("-pkg.zip"));
        assert_eq!(fs::read(r.resolve_upload(&url).unwrap()).unwrap(), b"data");

        let private_url = r.store_upload("secret.zip", b"x", true).unwrap();
        assert!(private_url.starts_with("/private/files/"));
        assert!(r.resolve_upload(&private_url).unwrap().exists());
    }
}

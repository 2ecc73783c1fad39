//! Manifest discovery and parsing.
//!
//! A SCORM package describes its content in `imsmanifest.xml`. The launch
//! file is the `href` of the first `<resource>` whose `adlcp:scormtype` is
//! `sco`. Older packages spell the attribute `adlcp:scormType`, so the
//! attribute name is compared without regard to case or prefix.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use walkdir::WalkDir;

use crate::error::{ScormError, ScormResult};

/// File name of a package manifest.
pub const MANIFEST_FILE_NAME: &str = "imsmanifest.xml";

/// SCORM type of a launchable resource.
pub const SCO_TYPE: &str = "sco";

/// Find the manifest under `root`.
///
/// The shallowest `imsmanifest.xml` wins; among manifests at the same depth
/// the lexicographically first path wins, so repeated imports of the same
/// archive always pick the same file.
pub fn find_manifest(root: &Path) -> ScormResult<Option<PathBuf>> {
    let mut best: Option<(usize, PathBuf)> = None;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE_NAME {
            continue;
        }
        let depth = entry.depth();
        if best.as_ref().is_none_or(|(d, _)| depth < *d) {
            best = Some((depth, entry.into_path()));
        }
    }

    Ok(best.map(|(_, path)| path))
}

/// One `<resource>` element of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestResource {
    pub identifier: Option<String>,
    pub scorm_type: Option<String>,
    pub href: Option<String>,
}

impl ManifestResource {
    /// Whether this resource is a sharable content object.
    pub fn is_sco(&self) -> bool {
        self.scorm_type
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(SCO_TYPE))
    }
}

/// Every `<resource>` element of a manifest, in document order.
pub fn parse_resources(xml: &str) -> Result<Vec<ManifestResource>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut resources = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(element) | Event::Empty(element) => {
                if element.local_name().as_ref() == b"resource" {
                    resources.push(read_resource(&element)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(resources)
}

fn read_resource(element: &BytesStart<'_>) -> Result<ManifestResource, quick_xml::Error> {
    let mut resource = ManifestResource::default();

    for attr in element.attributes() {
        let attr = attr?;
        let local = attr.key.local_name();
        let name = String::from_utf8_lossy(local.as_ref()).to_ascii_lowercase();
        let value = attr.unescape_value()?.into_owned();

        match name.as_str() {
            "identifier" => resource.identifier = Some(value),
            "scormtype" => resource.scorm_type = Some(value),
            "href" => resource.href = Some(value),
            _ => {}
        }
    }

    Ok(resource)
}

/// `href` of the first `sco` resource that has one.
pub fn launch_href(resources: &[ManifestResource]) -> Option<&str> {
    resources
        .iter()
        .filter(|r| r.is_sco())
        .filter_map(|r| r.href.as_deref())
        .map(str::trim)
        .find(|href| !href.is_empty())
}

/// Read `manifest` and resolve its launch file against the manifest's
/// directory.
///
/// The launch file must exist in the package. A query string or fragment on
/// the `href` is ignored when locating it.
pub fn resolve_launch_file(manifest: &Path) -> ScormResult<PathBuf> {
    let bytes = fs::read(manifest)?;
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes.as_slice());
    let xml =
        std::str::from_utf8(bytes).map_err(|e| ScormError::InvalidManifest(e.to_string()))?;

    let resources =
        parse_resources(xml).map_err(|e| ScormError::InvalidManifest(e.to_string()))?;

    let href = launch_href(&resources).ok_or_else(|| {
        ScormError::NoLaunchableResource("manifest declares no sco resource with an href".into())
    })?;

    let file = href.split(['?', '#']).next().unwrap_or(href);
    if Path::new(file).has_root() {
        return Err(ScormError::NoLaunchableResource(format!(
            "launch file {} is not relative to the manifest",
            href
        )));
    }

    let base = manifest.parent().unwrap_or_else(|| Path::new(""));
    let launch = base.join(file);
    if !launch.is_file() {
        return Err(ScormError::NoLaunchableResource(format!(
            "launch file {} is missing from the package",
            file
        )));
    }
    Ok(launch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="pkg" xmlns="http://www.imsproject.org/xsd/imscp_rootv1p1p2"
          xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2">
  <organizations default="org">
    <organization identifier="org"><title>Course</title></organization>
  </organizations>
  <resources>
    <resource identifier="assets" type="webcontent" adlcp:scormtype="asset" href="shared/style.css"/>
    <resource identifier="sco1" type="webcontent" adlcp:scormtype="sco" href="content/index.html">
      <file href="content/index.html"/>
    </resource>
    <resource identifier="sco2" type="webcontent" adlcp:scormtype="sco" href="content/other.html"/>
  </resources>
</manifest>"#;

    #[test]
    fn parses_all_resources_in_order() {
        let resources = parse_resources(MANIFEST).unwrap();
        let ids: Vec<_> = resources
            .iter()
            .map(|r| r.identifier.as_deref().unwrap())
            .collect();
        assert_eq!(ids, ["assets", "sco1", "sco2"]);
    }

    #[test]
    fn first_sco_is_the_launch_file() {
        let resources = parse_resources(MANIFEST).unwrap();
        assert_eq!(launch_href(&resources), Some("content/index.html"));
    }

    #[test]
    fn camel_case_scorm_type_is_recognised() {
        let xml = r#"<manifest><resources>
            <resource identifier="r" adlcp:scormType="sco" href="launch.htm"/>
        </resources></manifest>"#;
        let resources = parse_resources(xml).unwrap();
        assert_eq!(launch_href(&resources), Some("launch.htm"));
    }

    #[test]
    fn sco_without_href_is_skipped() {
        let xml = r#"<manifest><resources>
            <resource identifier="a" adlcp:scormtype="sco"/>
            <resource identifier="b" adlcp:scormtype="sco" href="b.html"/>
        </resources></manifest>"#;
        let resources = parse_resources(xml).unwrap();
        assert_eq!(launch_href(&resources), Some("b.html"));
    }

    #[test]
    fn asset_only_manifest_has_no_launch_file() {
        let xml = r#"<manifest><resources>
            <resource identifier="a" adlcp:scormtype="asset" href="a.html"/>
        </resources></manifest>"#;
        assert_eq!(launch_href(&parse_resources(xml).unwrap()), None);
    }

    #[test]
    fn shallowest_manifest_wins() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("a/deep")).unwrap();
        fs::create_dir_all(tmp.path().join("b")).unwrap();
        fs::write(tmp.path().join("a/deep").join(MANIFEST_FILE_NAME), "").unwrap();
        fs::write(tmp.path().join("b").join(MANIFEST_FILE_NAME), "").unwrap();

        let found = find_manifest(tmp.path()).unwrap().unwrap();
        assert_eq!(found, tmp.path().join("b").join(MANIFEST_FILE_NAME));
    }

    #[test]
    fn same_depth_ties_break_lexicographically() {
        let tmp = tempfile::tempdir().unwrap();
        for dir in ["zeta", "alpha"] {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
            fs::write(tmp.path().join(dir).join(MANIFEST_FILE_NAME), "").unwrap();
        }
        let found = find_manifest(tmp.path()).unwrap().unwrap();
        assert_eq!(found, tmp.path().join("alpha").join(MANIFEST_FILE_NAME));
    }

    #[test]
    fn missing_manifest_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("index.html"), "").unwrap();
        assert_eq!(find_manifest(tmp.path()).unwrap(), None);
    }

    #[test]
    fn launch_file_is_relative_to_manifest_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("pkg");
        fs::create_dir_all(&pkg).unwrap();
        let manifest = pkg.join(MANIFEST_FILE_NAME);
        fs::write(&manifest, MANIFEST).unwrap();
        fs::create_dir_all(pkg.join("content")).unwrap();
        fs::write(pkg.join("content/index.html"), "<html></html>").unwrap();

        let launch = resolve_launch_file(&manifest).unwrap();
        assert_eq!(launch, pkg.join("content/index.html"));
    }

    #[test]
    fn launch_file_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join(MANIFEST_FILE_NAME);
        fs::write(&manifest, MANIFEST).unwrap();

        let err = resolve_launch_file(&manifest).unwrap_err();
        assert_eq!(err.kind(), "NoLaunchableResource");
        assert!(err.to_string().contains("content/index.html"));
        assert!(!err.to_string().contains(&tmp.path().display().to_string()));
    }

    #[test]
    fn launch_query_string_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join(MANIFEST_FILE_NAME);
        fs::write(
            &manifest,
            r#"<manifest><resources><resource adlcp:scormtype="sco" href="start.html?lang=en#top"/></resources></manifest>"#,
        )
        .unwrap();
        fs::write(tmp.path().join("start.html"), "<html></html>").unwrap();

        let launch = resolve_launch_file(&manifest).unwrap();
        assert_eq!(launch, tmp.path().join("start.html"));
    }

    #[test]
    fn malformed_manifest_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = tmp.path().join(MANIFEST_FILE_NAME);
        fs::write(&manifest, "<manifest><resources></manifest>").unwrap();

        let err = resolve_launch_file(&manifest).unwrap_err();
        assert_eq!(err.kind(), "InvalidManifest");
    }
}

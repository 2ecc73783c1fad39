//! Zip extraction into the asset tree.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{ScormError, ScormResult};

/// Extract `archive` into `dest`, replacing whatever `dest` held before.
///
/// Every entry name is checked before anything is written: an archive with
/// an entry that would land outside `dest` is rejected as a whole and leaves
/// the previous contents of `dest` untouched. Returns the number of files
/// written.
pub fn extract_archive(archive: &Path, dest: &Path) -> ScormResult<usize> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(BufReader::new(file))
        .map_err(|e| ScormError::InvalidArchive(e.to_string()))?;

    let targets = entry_targets(&mut zip)?;

    if dest.exists() {
        tracing::debug!(dest = %dest.display(), "Clearing previous extraction");
        fs::remove_dir_all(dest)?;
    }
    fs::create_dir_all(dest)?;

    let mut written = 0;
    for (i, target) in targets.into_iter().enumerate() {
        let Some(relative) = target else {
            continue;
        };
        let out = dest.join(relative);
        let mut entry = zip.by_index(i)?;

        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&out)?;
        io::copy(&mut entry, &mut file)?;
        written += 1;
    }

    tracing::debug!(
        archive = %archive.display(),
        dest = %dest.display(),
        files = written,
        "Extracted archive"
    );
    Ok(written)
}

/// Validated relative path for every entry, `None` for entries to skip.
fn entry_targets<R: io::Read + io::Seek>(
    zip: &mut ZipArchive<R>,
) -> ScormResult<Vec<Option<PathBuf>>> {
    let mut targets = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let entry = zip.by_index(i)?;
        let name = entry.name().to_string();
        if name.trim_matches('/').is_empty() {
            targets.push(None);
            continue;
        }
        let relative = entry.enclosed_name().ok_or_else(|| {
            ScormError::InvalidArchive(format!(
                "entry {} escapes the extraction directory",
                name
            ))
        })?;
        targets.push(Some(relative));
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, files: &[(&str, &str)]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, body) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn extracts_nested_files() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("pkg.zip");
        write_zip(&archive, &[("a.txt", "A"), ("dir/b.txt", "B")]);

        let dest = tmp.path().join("out");
        let written = extract_archive(&archive, &dest).unwrap();

        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "A");
        assert_eq!(fs::read_to_string(dest.join("dir/b.txt")).unwrap(), "B");
    }

    #[test]
    fn re_extraction_clears_stale_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("out");

        let first = tmp.path().join("first.zip");
        write_zip(&first, &[("old.txt", "old")]);
        extract_archive(&first, &dest).unwrap();

        let second = tmp.path().join("second.zip");
        write_zip(&second, &[("new.txt", "new")]);
        extract_archive(&second, &dest).unwrap();

        assert!(!dest.join("old.txt").exists());
        assert!(dest.join("new.txt").exists());
    }

    #[test]
    fn non_zip_input_is_invalid_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("not-a.zip");
        fs::write(&archive, b"plain text, not a zip").unwrap();

        let err = extract_archive(&archive, &tmp.path().join("out")).unwrap_err();
        assert_eq!(err.kind(), "InvalidArchive");
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn escaping_entries_are_rejected_before_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("keep.txt"), "kept").unwrap();

        let archive = tmp.path().join("evil.zip");
        write_zip(&archive, &[("ok.txt", "ok"), ("../evil.txt", "evil")]);

        let err = extract_archive(&archive, &dest).unwrap_err();
        assert_eq!(err.kind(), "InvalidArchive");
        assert!(!tmp.path().join("evil.txt").exists());
        assert!(dest.join("keep.txt").exists());
    }
}

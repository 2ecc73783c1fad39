//! SCORM commands - Check packages locally before uploading them.
//!
//! These run without a server.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use lms_scorm::{PackageContents, extract_archive, inspect_dir};
use serde::{Deserialize, Serialize};

use super::{HumanReadable, output};

/// Arguments for the scorm command.
#[derive(Args)]
pub struct ScormArgs {
    #[command(subcommand)]
    pub command: ScormCommand,
}

#[derive(Subcommand)]
pub enum ScormCommand {
    /// Report the manifest and launch file of an extracted package
    Inspect {
        dir: PathBuf,
    },

    /// Extract an archive and report what the server would launch
    Unpack {
        archive: PathBuf,

        /// Directory to extract into; its previous contents are replaced
        #[arg(long)]
        into: PathBuf,
    },
}

/// What a package directory contains, with paths relative to its root.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PackageReport {
    pub root: PathBuf,
    pub manifest_file: Option<String>,
    pub launch_file: Option<String>,
    pub files_extracted: Option<usize>,
    /// Whether the server would accept this package.
    pub launchable: bool,
}

impl PackageReport {
    fn new(contents: PackageContents, files_extracted: Option<usize>) -> Self {
        let relative = |path: &Path| {
            path.strip_prefix(&contents.root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/")
        };
        Self {
            manifest_file: contents.manifest_file.as_deref().map(relative),
            launch_file: contents.launch_file.as_deref().map(relative),
            launchable: contents.launch_file.is_some(),
            root: contents.root.clone(),
            files_extracted,
        }
    }
}

impl HumanReadable for PackageReport {
    fn print_human(&self) {
        if self.launchable {
            println!("{}", "Launchable SCORM package".green().bold());
        } else {
            println!("{}", "Not a launchable SCORM package".red().bold());
        }
        println!("  {} {}", "Root:".cyan(), self.root.display());
        if let Some(count) = self.files_extracted {
            println!("  {} {}", "Files:".cyan(), count);
        }
        match &self.manifest_file {
            Some(manifest) => println!("  {} {}", "Manifest:".cyan(), manifest),
            None => println!("  {} {}", "Manifest:".cyan(), "missing imsmanifest.xml".yellow()),
        }
        match &self.launch_file {
            Some(launch) => println!("  {} {}", "Launch:".cyan(), launch),
            None if self.manifest_file.is_some() => {
                println!("  {} {}", "Launch:".cyan(), "no sco resource with an href".yellow())
            }
            None => {}
        }
    }
}

/// Build the report for a scorm command without printing it.
pub fn report(command: ScormCommand) -> Result<PackageReport> {
    match command {
        ScormCommand::Inspect { dir } => {
            let contents =
                inspect_dir(&dir).with_context(|| format!("inspecting {}", dir.display()))?;
            Ok(PackageReport::new(contents, None))
        }
        ScormCommand::Unpack { archive, into } => {
            let count = extract_archive(&archive, &into)
                .with_context(|| format!("extracting {}", archive.display()))?;
            let contents =
                inspect_dir(&into).with_context(|| format!("inspecting {}", into.display()))?;
            Ok(PackageReport::new(contents, Some(count)))
        }
    }
}

/// Execute a scorm command.
pub fn execute(human: bool, args: ScormArgs) -> Result<()> {
    let report = report(args.command)?;
    output(&report, human)
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    const MANIFEST: &str = r#"<?xml version="1.0"?>
<manifest identifier="m" xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2">
  <resources>
    <resource identifier="r1" type="webcontent" adlcp:scormType="sco" href="content/index.html"/>
  </resources>
</manifest>"#;

    fn write_zip(path: &Path, files: &[(&str, &str)]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, body) in files {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn unpack_reports_launch_file() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("pack.zip");
        write_zip(
            &archive,
            &[
                ("course/imsmanifest.xml", MANIFEST),
                ("course/content/index.html", "<html></html>"),
            ],
        );

        let into = tmp.path().join("out");
        let report = report(ScormCommand::Unpack {
            archive,
            into: into.clone(),
        })
        .unwrap();

        assert!(report.launchable);
        assert_eq!(report.files_extracted, Some(2));
        assert_eq!(report.manifest_file.as_deref(), Some("course/imsmanifest.xml"));
        assert_eq!(report.launch_file.as_deref(), Some("course/content/index.html"));
        assert_eq!(report.root, into);
    }

    #[test]
    fn inspect_without_manifest_is_not_launchable() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("index.html"), "<html></html>").unwrap();

        let report = report(ScormCommand::Inspect {
            dir: tmp.path().to_path_buf(),
        })
        .unwrap();

        assert!(!report.launchable);
        assert!(report.manifest_file.is_none());
        assert!(report.files_extracted.is_none());
    }

    #[test]
    fn unpack_rejects_non_zip() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("not.zip");
        fs::write(&archive, "plain text").unwrap();

        let result = report(ScormCommand::Unpack {
            archive,
            into: tmp.path().join("out"),
        });
        assert!(result.is_err());
    }
}

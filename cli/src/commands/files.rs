//! UPLOAD and FILE-INFO commands - Upload a file, typically a SCORM
//! archive, and look up an uploaded file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use lms_scorm::FileInfo;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use super::{HumanReadable, endpoint, make_request, output};

/// Arguments for the upload command.
#[derive(Args)]
pub struct UploadArgs {
    /// File to upload
    pub path: PathBuf,

    /// Store under the private files root
    #[arg(long)]
    pub private: bool,
}

/// Arguments for the file-info command.
#[derive(Args)]
pub struct FileInfoArgs {
    /// File URL returned by upload (`/files/...` or `/private/files/...`)
    pub file_url: String,
}

/// Response from uploading a file.
#[derive(Debug, Deserialize, Serialize)]
pub struct UploadResponse {
    pub file_url: String,
    pub file_name: String,
    pub is_private: bool,
}

impl HumanReadable for UploadResponse {
    fn print_human(&self) {
        println!("{}", "File uploaded".green().bold());
        println!("  {} {}", "Name:".cyan(), self.file_name);
        println!("  {} {}", "URL:".cyan(), self.file_url);
    }
}

impl HumanReadable for FileInfo {
    fn print_human(&self) {
        println!("{}", self.file_name.bold());
        println!("  {} {} bytes", "Size:".cyan(), self.file_size);
        println!("  {} {}", "URL:".cyan(), self.file_url);
    }
}

/// Execute the file-info command.
pub async fn info(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: FileInfoArgs,
) -> Result<()> {
    let info: FileInfo = make_request(
        client
            .get(endpoint(base_url, "/api/files/info"))
            .query(&[("file_url", args.file_url.as_str())]),
    )
    .await?;
    output(&info, human)
}

/// Execute the upload command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: UploadArgs,
) -> Result<()> {
    let bytes = tokio::fs::read(&args.path)
        .await
        .with_context(|| format!("reading {}", args.path.display()))?;
    let file_name = args
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let mut form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
    if args.private {
        form = form.text("is_private", "1");
    }

    let response: UploadResponse =
        make_request(client.post(endpoint(base_url, "/api/files")).multipart(form)).await?;
    output(&response, human)
}

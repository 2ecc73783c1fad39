//! DELETE-DOCS command - Bulk delete documents of one kind.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use lms_core::DocumentKind;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, confirm, endpoint, make_request, output};

/// Arguments for the delete-docs command.
#[derive(Args)]
pub struct DeleteDocsArgs {
    /// Document kind, e.g. "Course Lesson" or "LMS Certificate"
    #[arg(long)]
    pub doctype: DocumentKind,

    /// Document ids
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Skip confirmation prompt (for non-interactive use)
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Serialize)]
struct DeleteDocumentsRequest {
    doctype: DocumentKind,
    documents: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteDocumentsResponse {
    pub deleted: usize,
}

impl HumanReadable for DeleteDocumentsResponse {
    fn print_human(&self) {
        println!("{} {}", "Deleted:".green().bold(), self.deleted);
    }
}

/// Execute the delete-docs command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: DeleteDocsArgs,
) -> Result<()> {
    if human && !args.yes {
        let prompt = format!(
            "{} Delete {} {} document(s)?",
            "Warning:".yellow().bold(),
            args.ids.len(),
            args.doctype
        );
        if !confirm(&prompt)? {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    let body = DeleteDocumentsRequest {
        doctype: args.doctype,
        documents: args.ids,
    };
    let response: DeleteDocumentsResponse =
        make_request(client.post(endpoint(base_url, "/api/documents/delete")).json(&body)).await?;
    output(&response, human)
}

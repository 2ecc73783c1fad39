//! CHAPTER commands - Save and delete chapters, including SCORM chapters.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use lms_core::{Chapter, ChapterId, CourseId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{HumanReadable, endpoint, make_request, output};

/// Arguments for the chapter command.
#[derive(Args)]
pub struct ChapterArgs {
    #[command(subcommand)]
    pub command: ChapterCommand,
}

#[derive(Subcommand)]
pub enum ChapterCommand {
    /// Create a chapter, or update it when --id is given
    Save {
        #[arg(long)]
        course: CourseId,

        #[arg(long)]
        title: String,

        /// Existing chapter to update
        #[arg(long)]
        id: Option<ChapterId>,

        /// File URL of an uploaded SCORM archive (see `lms upload`)
        #[arg(long)]
        package: Option<String>,
    },

    /// Delete a chapter and its lessons
    Delete {
        chapter: ChapterId,
    },
}

#[derive(Serialize)]
struct ChapterRequest {
    id: Option<ChapterId>,
    course: CourseId,
    title: String,
    scorm_package: Option<String>,
}

/// Response from the delete routes.
#[derive(Debug, Deserialize, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
    pub message: String,
}

impl HumanReadable for Chapter {
    fn print_human(&self) {
        println!("{}", "Chapter saved".green().bold());
        println!("  {} {}", "ID:".cyan(), self.id);
        println!("  {} {}", "Title:".cyan(), self.title);
        println!("  {} {}", "Course:".cyan(), self.course);
        if let Some(scorm) = &self.scorm {
            println!("  {} {}", "Package:".cyan(), scorm.scorm_package);
            println!("  {} {}", "Extracted:".cyan(), scorm.scorm_package_path);
            println!("  {} {}", "Manifest:".cyan(), scorm.manifest_file);
            println!("  {} {}", "Launch:".cyan(), scorm.launch_file);
        }
    }
}

impl HumanReadable for DeletedResponse {
    fn print_human(&self) {
        println!("{} {}", self.message.green().bold(), self.id);
    }
}

/// Execute a chapter command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ChapterArgs,
) -> Result<()> {
    match args.command {
        ChapterCommand::Save {
            course,
            title,
            id,
            package,
        } => {
            let body = ChapterRequest {
                id,
                course,
                title,
                scorm_package: package,
            };
            let chapter: Chapter =
                make_request(client.post(endpoint(base_url, "/api/chapters")).json(&body)).await?;
            output(&chapter, human)
        }
        ChapterCommand::Delete { chapter } => {
            let url = endpoint(base_url, &format!("/api/chapters/{}", chapter));
            let response: DeletedResponse = make_request(client.delete(url)).await?;
            output(&response, human)
        }
    }
}

//! LESSON commands - Create, move and delete lessons; save progress.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use lms_core::{ChapterId, ChapterOrdering, CourseId, Lesson, LessonId, LessonMove};
use serde::{Deserialize, Serialize};

use super::chapters::DeletedResponse;
use super::{HumanReadable, endpoint, format_timestamp, make_request, output};

/// Arguments for the lesson command.
#[derive(Args)]
pub struct LessonArgs {
    #[command(subcommand)]
    pub command: LessonCommand,
}

#[derive(Subcommand)]
pub enum LessonCommand {
    /// Append a lesson to a chapter
    Create {
        #[arg(long)]
        chapter: ChapterId,

        #[arg(long)]
        title: String,

        /// Lesson body (markdown)
        #[arg(long)]
        body: Option<String>,
    },

    /// Move a lesson to a 0-based position, possibly in another chapter
    Move {
        lesson: LessonId,

        /// Chapter the lesson is in now
        #[arg(long)]
        from: ChapterId,

        /// Chapter to move into (defaults to --from)
        #[arg(long)]
        to: Option<ChapterId>,

        /// Position in the target chapter
        #[arg(long, default_value_t = 0)]
        index: usize,
    },

    /// Delete a lesson from a chapter
    Delete {
        #[arg(long)]
        chapter: ChapterId,

        lesson: LessonId,
    },

    /// Remember the lesson you are on in a course
    Current {
        #[arg(long)]
        course: CourseId,

        lesson: LessonId,
    },
}

#[derive(Serialize)]
struct CreateLessonRequest {
    chapter: ChapterId,
    title: String,
    body: Option<String>,
}

#[derive(Serialize)]
struct CurrentLessonRequest {
    course: CourseId,
    lesson: LessonId,
}

/// Response from a reorder.
#[derive(Debug, Deserialize, Serialize)]
pub struct ReorderResponse {
    pub chapters: Vec<ChapterOrdering>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CurrentLessonResponse {
    pub saved: bool,
}

impl HumanReadable for Lesson {
    fn print_human(&self) {
        println!("{}", "Lesson created".green().bold());
        println!("  {} {}", "ID:".cyan(), self.id);
        println!("  {} {}", "Title:".cyan(), self.title);
        println!("  {} {}", "Chapter:".cyan(), self.chapter);
        println!("  {} {}", "Created:".cyan(), format_timestamp(&self.created));
    }
}

impl HumanReadable for ReorderResponse {
    fn print_human(&self) {
        println!("{}", "Lesson moved".green().bold());
        for ordering in &self.chapters {
            println!();
            println!("  {} {}", "Chapter:".cyan(), ordering.chapter());
            for (i, lesson) in ordering.lessons().iter().enumerate() {
                println!("    {:>3}. {}", i + 1, lesson);
            }
        }
    }
}

impl HumanReadable for CurrentLessonResponse {
    fn print_human(&self) {
        if self.saved {
            println!("{}", "Progress saved".green());
        } else {
            println!("{}", "Not enrolled in this course; nothing saved".yellow());
        }
    }
}

/// Execute a lesson command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: LessonArgs,
) -> Result<()> {
    match args.command {
        LessonCommand::Create {
            chapter,
            title,
            body,
        } => {
            let request = CreateLessonRequest {
                chapter,
                title,
                body,
            };
            let lesson: Lesson =
                make_request(client.post(endpoint(base_url, "/api/lessons")).json(&request))
                    .await?;
            output(&lesson, human)
        }
        LessonCommand::Move {
            lesson,
            from,
            to,
            index,
        } => {
            let mv = LessonMove {
                lesson,
                source: from,
                target: to.unwrap_or(from),
                index,
            };
            let response: ReorderResponse =
                make_request(client.post(endpoint(base_url, "/api/lessons/reorder")).json(&mv))
                    .await?;
            output(&response, human)
        }
        LessonCommand::Delete { chapter, lesson } => {
            let url = endpoint(
                base_url,
                &format!("/api/chapters/{}/lessons/{}", chapter, lesson),
            );
            let response: DeletedResponse = make_request(client.delete(url)).await?;
            output(&response, human)
        }
        LessonCommand::Current { course, lesson } => {
            let request = CurrentLessonRequest { course, lesson };
            let response: CurrentLessonResponse = make_request(
                client
                    .post(endpoint(base_url, "/api/enrollments/current-lesson"))
                    .json(&request),
            )
            .await?;
            output(&response, human)
        }
    }
}

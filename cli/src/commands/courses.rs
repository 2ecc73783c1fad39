//! COURSE commands - Create, show, review and delete courses; refresh
//! course statistics.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use lms_core::{Course, CourseId, CourseOutline};
use serde::{Deserialize, Serialize};

use super::{HumanReadable, confirm, endpoint, format_timestamp, make_request, output, truncate};

/// Arguments for the course command.
#[derive(Args)]
pub struct CourseArgs {
    #[command(subcommand)]
    pub command: CourseCommand,
}

#[derive(Subcommand)]
pub enum CourseCommand {
    /// Create a course
    Create {
        /// Course title
        title: String,

        /// One-paragraph introduction
        #[arg(long)]
        intro: Option<String>,

        /// Publish immediately
        #[arg(long)]
        published: bool,
    },

    /// Show a course outline with chapters and lessons in order
    Show {
        course: CourseId,
    },

    /// Review a course you are enrolled in
    Review {
        course: CourseId,

        /// Stars from 0 to 5
        #[arg(long)]
        rating: f64,

        /// Review text
        #[arg(long)]
        review: Option<String>,
    },

    /// Recount lessons, enrollments and ratings of every course (Moderator)
    Stats,

    /// Delete a course with its chapters, lessons and packages
    Delete {
        course: CourseId,

        /// Skip confirmation prompt (for non-interactive use)
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Serialize)]
struct CreateCourseRequest {
    title: String,
    short_introduction: Option<String>,
    published: bool,
}

#[derive(Serialize)]
struct ReviewRequest {
    rating: f64,
    review: Option<String>,
}

/// Response from saving a review.
#[derive(Debug, Deserialize, Serialize)]
pub struct ReviewResponse {
    pub id: uuid::Uuid,
    pub course: CourseId,
}

/// Response from refreshing course statistics.
#[derive(Debug, Deserialize, Serialize)]
pub struct StatisticsResponse {
    pub updated: u64,
}

/// Response from deleting a course.
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteCourseResponse {
    pub id: CourseId,
    pub message: String,
}

impl HumanReadable for Course {
    fn print_human(&self) {
        println!("{}", self.title.bold());
        println!("  {} {}", "ID:".cyan(), self.id);
        if let Some(intro) = &self.short_introduction {
            println!("  {} {}", "Intro:".cyan(), truncate(intro, 72));
        }
        println!("  {} {}", "Published:".cyan(), self.published);
        println!(
            "  {} {} lessons, {} enrollments, rating {:.1}/5",
            "Stats:".cyan(),
            self.lessons,
            self.enrollments,
            self.rating * lms_core::MAX_RATING
        );
        println!("  {} {}", "Created:".cyan(), format_timestamp(&self.created));
    }
}

impl HumanReadable for CourseOutline {
    fn print_human(&self) {
        self.course.print_human();
        println!();

        if self.chapters.is_empty() {
            println!("  {}", "(No chapters)".dimmed());
            return;
        }

        for (i, outline) in self.chapters.iter().enumerate() {
            let marker = if outline.chapter.is_scorm_package() {
                " [SCORM]".yellow()
            } else {
                "".normal()
            };
            println!("  {}. {}{}", i + 1, outline.chapter.title.bold(), marker);
            println!("     {} {}", "ID:".cyan(), outline.chapter.id);
            if let Some(scorm) = &outline.chapter.scorm {
                println!("     {} {}", "Launch:".cyan(), scorm.launch_file);
            }
            for (j, lesson) in outline.lessons.iter().enumerate() {
                println!("     {}.{} {} {}", i + 1, j + 1, lesson.title, lesson.id.to_string().dimmed());
            }
        }
    }
}

impl HumanReadable for DeleteCourseResponse {
    fn print_human(&self) {
        println!("{}", "Course deleted successfully!".green().bold());
        println!("  {} {}", "ID:".cyan(), self.id);
    }
}

impl HumanReadable for ReviewResponse {
    fn print_human(&self) {
        println!("{}", "Review saved".green().bold());
        println!("  {} {}", "Course:".cyan(), self.course);
    }
}

impl HumanReadable for StatisticsResponse {
    fn print_human(&self) {
        println!("{} {} courses", "Statistics updated:".green().bold(), self.updated);
    }
}

/// Execute a course command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: CourseArgs,
) -> Result<()> {
    match args.command {
        CourseCommand::Create {
            title,
            intro,
            published,
        } => {
            let body = CreateCourseRequest {
                title,
                short_introduction: intro,
                published,
            };
            let course: Course =
                make_request(client.post(endpoint(base_url, "/api/courses")).json(&body)).await?;
            output(&course, human)
        }
        CourseCommand::Show { course } => {
            let url = endpoint(base_url, &format!("/api/courses/{}", course));
            let outline: CourseOutline = make_request(client.get(url)).await?;
            output(&outline, human)
        }
        CourseCommand::Review {
            course,
            rating,
            review,
        } => {
            let url = endpoint(base_url, &format!("/api/courses/{}/reviews", course));
            let body = ReviewRequest { rating, review };
            let response: ReviewResponse = make_request(client.post(url).json(&body)).await?;
            output(&response, human)
        }
        CourseCommand::Stats => {
            let url = endpoint(base_url, "/api/courses/statistics");
            let response: StatisticsResponse = make_request(client.post(url)).await?;
            output(&response, human)
        }
        CourseCommand::Delete { course, yes } => {
            if human && !yes {
                let prompt = format!("{} Delete course {}?", "Warning:".yellow().bold(), course);
                if !confirm(&prompt)? {
                    eprintln!("Aborted.");
                    return Ok(());
                }
            }
            let url = endpoint(base_url, &format!("/api/courses/{}", course));
            let response: DeleteCourseResponse = make_request(client.delete(url)).await?;
            output(&response, human)
        }
    }
}

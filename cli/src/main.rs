//! Command-line interface for the LMS backend.
//!
//! Commands:
//! - whoami: Show the identity the server sees
//! - upload: Upload a file (SCORM archives before attaching them to a chapter)
//! - file-info: Name and size of an uploaded file
//! - user: Member directory and profile management
//! - course: Create, show, review and delete courses; refresh statistics
//! - chapter: Save and delete chapters
//! - lesson: Create, move and delete lessons; save progress
//! - cohort: Join subgroups, decide join requests, add mentors
//! - certificate: Evaluations, certificates and the certified list
//! - delete-docs: Bulk delete documents (Moderator)
//! - scorm: Check a package locally, without a server
//!
//! Configuration via environment:
//! - LMS_URL: Base URL of the server (default: http://localhost:3000)
//! - LMS_TOKEN: JWT Bearer token for authentication

mod commands;

use clap::{Parser, Subcommand};

use commands::{
    certificates::CertificateArgs, chapters::ChapterArgs, cohorts::CohortArgs,
    courses::CourseArgs, documents::DeleteDocsArgs, files::FileInfoArgs, files::UploadArgs,
    lessons::LessonArgs, me::WhoamiArgs, scorm::ScormArgs, users::UserArgs,
};

/// LMS CLI
///
/// Prints JSON by default; pass --human for formatted output.
#[derive(Parser)]
#[command(name = "lms")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// LMS server URL
    #[arg(long, env = "LMS_URL", default_value = "http://localhost:3000", global = true)]
    url: String,

    /// JWT Bearer token for authentication
    #[arg(long, env = "LMS_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the identity the server sees
    Whoami(WhoamiArgs),

    /// Upload a file and print its URL
    Upload(UploadArgs),

    /// Show the name and size of an uploaded file
    FileInfo(FileInfoArgs),

    /// Member directory and user profiles
    User(UserArgs),

    /// Manage courses
    Course(CourseArgs),

    /// Manage chapters
    Chapter(ChapterArgs),

    /// Manage lessons
    Lesson(LessonArgs),

    /// Cohort join requests and mentors
    Cohort(CohortArgs),

    /// Evaluations and certificates
    Certificate(CertificateArgs),

    /// Delete documents of one kind
    DeleteDocs(DeleteDocsArgs),

    /// Check SCORM packages locally
    Scorm(ScormArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // No requests are sent until a command runs, so `scorm` works offline.
    let client = commands::build_client(cli.token.as_deref())?;
    let (url, human) = (cli.url.as_str(), cli.human);

    match cli.command {
        Commands::Whoami(args) => commands::me::execute(&client, url, human, args).await,
        Commands::Upload(args) => commands::files::execute(&client, url, human, args).await,
        Commands::FileInfo(args) => commands::files::info(&client, url, human, args).await,
        Commands::User(args) => commands::users::execute(&client, url, human, args).await,
        Commands::Course(args) => commands::courses::execute(&client, url, human, args).await,
        Commands::Chapter(args) => commands::chapters::execute(&client, url, human, args).await,
        Commands::Lesson(args) => commands::lessons::execute(&client, url, human, args).await,
        Commands::Cohort(args) => commands::cohorts::execute(&client, url, human, args).await,
        Commands::Certificate(args) => {
            commands::certificates::execute(&client, url, human, args).await
        }
        Commands::DeleteDocs(args) => {
            commands::documents::execute(&client, url, human, args).await
        }
        Commands::Scorm(args) => commands::scorm::execute(human, args),
    }
}

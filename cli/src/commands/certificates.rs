//! CERTIFICATE commands - Evaluations, certificates and the certified list.

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand};
use colored::Colorize;
use lms_core::{
    Certificate, CertificateId, CertifiedParticipant, CourseId, EvaluationId, EvaluationStatus,
};
use serde::{Deserialize, Serialize};

use super::{HumanReadable, endpoint, make_request, output};

/// Arguments for the certificate command.
#[derive(Args)]
pub struct CertificateArgs {
    #[command(subcommand)]
    pub command: CertificateCommand,
}

#[derive(Subcommand)]
pub enum CertificateCommand {
    /// Record an evaluation
    Evaluate {
        #[arg(long)]
        member: String,

        #[arg(long)]
        course: CourseId,

        /// Evaluation date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Start time (HH:MM:SS)
        #[arg(long)]
        start: NaiveTime,

        /// End time (HH:MM:SS)
        #[arg(long)]
        end: NaiveTime,

        /// Pending, "In Progress", Pass or Fail
        #[arg(long, default_value = "Pending")]
        status: EvaluationStatus,

        /// Stars from 0 to 5
        #[arg(long)]
        rating: f64,

        #[arg(long)]
        summary: Option<String>,

        #[arg(long)]
        batch: Option<String>,
    },

    /// Issue or update a certificate
    Issue {
        #[arg(long)]
        member: String,

        #[arg(long)]
        course: CourseId,

        /// Issue date (YYYY-MM-DD)
        #[arg(long)]
        issue_date: NaiveDate,

        #[arg(long)]
        expiry_date: Option<NaiveDate>,

        #[arg(long)]
        template: Option<String>,

        #[arg(long)]
        batch: Option<String>,

        /// Keep the certificate off the public certified list
        #[arg(long)]
        unpublished: bool,
    },

    /// List a member's certificates
    List {
        member: String,
    },

    /// List everyone holding a published certificate
    Certified,
}

#[derive(Serialize)]
struct EvaluationRequest {
    member: String,
    course: CourseId,
    batch_name: Option<String>,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    status: EvaluationStatus,
    rating: f64,
    summary: Option<String>,
}

#[derive(Serialize)]
struct CertificateRequest {
    member: String,
    course: CourseId,
    batch_name: Option<String>,
    issue_date: NaiveDate,
    expiry_date: Option<NaiveDate>,
    template: Option<String>,
    published: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SavedEvaluation {
    pub id: EvaluationId,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SavedCertificate {
    pub id: CertificateId,
}

impl HumanReadable for SavedEvaluation {
    fn print_human(&self) {
        println!("{} {}", "Evaluation saved".green().bold(), self.id);
    }
}

impl HumanReadable for SavedCertificate {
    fn print_human(&self) {
        println!("{} {}", "Certificate saved".green().bold(), self.id);
    }
}

impl HumanReadable for Certificate {
    fn print_human(&self) {
        let title = self.course_title.as_deref().unwrap_or("(untitled course)");
        let status = if self.published {
            "published".green()
        } else {
            "draft".dimmed()
        };
        println!("  {} [{}]", title.bold(), status);
        println!("    {} {}", "ID:".cyan(), self.id);
        println!("    {} {}", "Issued:".cyan(), self.issue_date);
        if let Some(expiry) = self.expiry_date {
            println!("    {} {}", "Expires:".cyan(), expiry);
        }
    }
}

impl HumanReadable for CertifiedParticipant {
    fn print_human(&self) {
        let name = self.full_name.as_deref().unwrap_or(&self.name);
        println!("  {} {}", name.bold(), self.name.dimmed());
        println!("    {} {}", "Courses:".cyan(), self.courses.join(", "));
    }
}

/// Execute a certificate command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: CertificateArgs,
) -> Result<()> {
    match args.command {
        CertificateCommand::Evaluate {
            member,
            course,
            date,
            start,
            end,
            status,
            rating,
            summary,
            batch,
        } => {
            let body = EvaluationRequest {
                member,
                course,
                batch_name: batch,
                date,
                start_time: start,
                end_time: end,
                status,
                rating,
                summary,
            };
            let saved: SavedEvaluation =
                make_request(client.post(endpoint(base_url, "/api/evaluations")).json(&body))
                    .await?;
            output(&saved, human)
        }
        CertificateCommand::Issue {
            member,
            course,
            issue_date,
            expiry_date,
            template,
            batch,
            unpublished,
        } => {
            let body = CertificateRequest {
                member,
                course,
                batch_name: batch,
                issue_date,
                expiry_date,
                template,
                published: !unpublished,
            };
            let saved: SavedCertificate =
                make_request(client.post(endpoint(base_url, "/api/certificates")).json(&body))
                    .await?;
            output(&saved, human)
        }
        CertificateCommand::List { member } => {
            let url = endpoint(base_url, &format!("/api/members/{}/certificates", member));
            let certificates: Vec<Certificate> = make_request(client.get(url)).await?;
            if human && certificates.is_empty() {
                println!("  {}", "(No certificates)".dimmed());
                return Ok(());
            }
            output(&certificates, human)
        }
        CertificateCommand::Certified => {
            let url = endpoint(base_url, "/api/certified-participants");
            let participants: Vec<CertifiedParticipant> = make_request(client.get(url)).await?;
            if human {
                println!("{}", "Certified Participants".green().bold());
                println!("{}", "=".repeat(80));
            }
            output(&participants, human)
        }
    }
}

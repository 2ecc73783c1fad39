//! COHORT commands - Join subgroups, decide join requests, add mentors.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;
use lms_core::{CourseId, JoinRequest, JoinRequestId, SubgroupId};
use serde::{Deserialize, Serialize};

use super::{HumanReadable, endpoint, format_timestamp, make_request, output};

/// Arguments for the cohort command.
#[derive(Args)]
pub struct CohortArgs {
    #[command(subcommand)]
    pub command: CohortCommand,
}

#[derive(Subcommand)]
pub enum CohortCommand {
    /// Ask to join a subgroup through its invite link
    Join {
        #[arg(long)]
        course: CourseId,

        /// Cohort slug
        #[arg(long)]
        cohort: String,

        /// Subgroup slug
        #[arg(long)]
        subgroup: String,

        #[arg(long)]
        invite_code: String,
    },

    /// Approve, reject or undo the rejection of a join request
    Decide {
        #[arg(value_enum)]
        decision: Decision,

        request: JoinRequestId,
    },

    /// Add a mentor to a subgroup
    AddMentor {
        subgroup: SubgroupId,

        /// Mentor's email
        email: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Decision {
    Approve,
    Reject,
    UndoReject,
}

impl Decision {
    fn path_segment(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::UndoReject => "undo-reject",
        }
    }
}

#[derive(Serialize)]
struct JoinCohortRequest {
    course: CourseId,
    cohort: String,
    subgroup: String,
    invite_code: String,
}

#[derive(Serialize)]
struct AddMentorRequest {
    email: String,
}

/// Response from joining: `status` is "record created" or "record found".
#[derive(Debug, Deserialize, Serialize)]
pub struct JoinResponse {
    pub ok: bool,
    pub status: String,
    pub request: JoinRequest,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DecisionResponse {
    pub ok: bool,
    pub request: JoinRequest,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AddMentorResponse {
    pub ok: bool,
    pub added: bool,
}

fn print_request(request: &JoinRequest) {
    println!("  {} {}", "Request:".cyan(), request.id);
    println!("  {} {}", "Member:".cyan(), request.email);
    println!("  {} {}", "Subgroup:".cyan(), request.subgroup);
    println!("  {} {}", "Status:".cyan(), request.status);
    println!("  {} {}", "Created:".cyan(), format_timestamp(&request.created));
}

impl HumanReadable for JoinResponse {
    fn print_human(&self) {
        if self.status == "record found" {
            println!("{}", "You already asked to join this subgroup".yellow().bold());
        } else {
            println!("{}", "Join request sent".green().bold());
        }
        print_request(&self.request);
    }
}

impl HumanReadable for DecisionResponse {
    fn print_human(&self) {
        println!("{}", "Join request updated".green().bold());
        print_request(&self.request);
    }
}

impl HumanReadable for AddMentorResponse {
    fn print_human(&self) {
        if self.added {
            println!("{}", "Mentor added".green().bold());
        } else {
            println!("{}", "Already a mentor of this subgroup".yellow());
        }
    }
}

/// Execute a cohort command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: CohortArgs,
) -> Result<()> {
    match args.command {
        CohortCommand::Join {
            course,
            cohort,
            subgroup,
            invite_code,
        } => {
            let body = JoinCohortRequest {
                course,
                cohort,
                subgroup,
                invite_code,
            };
            let response: JoinResponse =
                make_request(client.post(endpoint(base_url, "/api/cohorts/join")).json(&body))
                    .await?;
            output(&response, human)
        }
        CohortCommand::Decide { decision, request } => {
            let url = endpoint(
                base_url,
                &format!("/api/join-requests/{}/{}", request, decision.path_segment()),
            );
            let response: DecisionResponse = make_request(client.post(url)).await?;
            output(&response, human)
        }
        CohortCommand::AddMentor { subgroup, email } => {
            let url = endpoint(base_url, &format!("/api/subgroups/{}/mentors", subgroup));
            let response: AddMentorResponse =
                make_request(client.post(url).json(&AddMentorRequest { email })).await?;
            output(&response, human)
        }
    }
}

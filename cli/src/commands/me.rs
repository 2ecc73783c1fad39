//! WHOAMI command - Show the identity the server sees.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use lms_core::Role;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, endpoint, make_request, output};

#[derive(Args)]
pub struct WhoamiArgs {}

#[derive(Debug, Deserialize, Serialize)]
pub struct MeResponse {
    pub user: String,
    pub roles: Vec<Role>,
    pub is_instructor: bool,
    pub is_moderator: bool,
    pub is_evaluator: bool,
}

impl HumanReadable for MeResponse {
    fn print_human(&self) {
        println!("{}", self.user.bold());
        if self.roles.is_empty() {
            println!("  {} {}", "Roles:".cyan(), "(none)".dimmed());
        } else {
            let roles: Vec<&str> = self.roles.iter().map(Role::as_str).collect();
            println!("  {} {}", "Roles:".cyan(), roles.join(", "));
        }
    }
}

pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    _args: WhoamiArgs,
) -> Result<()> {
    let response: MeResponse = make_request(client.get(endpoint(base_url, "/api/me"))).await?;
    output(&response, human)
}

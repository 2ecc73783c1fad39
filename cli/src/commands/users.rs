//! USER commands - Member directory and profile management.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use lms_core::{Member, Role, UserProfile, UserSummary};
use serde::{Deserialize, Serialize};

use super::{HumanReadable, endpoint, make_request, output};

/// Arguments for the user command.
#[derive(Args)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// List members, 20 per page
    Members {
        /// Match anywhere in the full name or email
        #[arg(long)]
        search: Option<String>,

        /// Offset of the first member to show
        #[arg(long, default_value_t = 0)]
        start: i64,
    },

    /// List every enabled user
    List,

    /// Create or update a user and replace their roles (System Manager or Moderator)
    Save {
        email: String,

        #[arg(long)]
        full_name: Option<String>,

        #[arg(long)]
        username: Option<String>,

        /// Profile image URL
        #[arg(long)]
        image: Option<String>,

        /// Site-wide role, repeatable (e.g. --role "Course Creator")
        #[arg(long = "role")]
        roles: Vec<Role>,

        /// Save the user as disabled
        #[arg(long)]
        disabled: bool,
    },
}

/// Response from saving a user.
#[derive(Debug, Deserialize, Serialize)]
pub struct SaveUserResponse {
    pub email: String,
    pub message: String,
}

/// Enabled users keyed by email.
#[derive(Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UserDirectory(pub BTreeMap<String, UserSummary>);

impl HumanReadable for Member {
    fn print_human(&self) {
        let name = self.full_name.as_deref().unwrap_or(&self.name);
        let role = self
            .role
            .map(|r| r.as_str().yellow())
            .unwrap_or_else(|| "(no role)".dimmed());
        println!("{} <{}> {}", name.bold(), self.name, role);
    }
}

impl HumanReadable for UserDirectory {
    fn print_human(&self) {
        if self.0.is_empty() {
            println!("{}", "(No users)".dimmed());
            return;
        }
        for user in self.0.values() {
            match &user.full_name {
                Some(full_name) => println!("{} <{}>", full_name.bold(), user.name),
                None => println!("{}", user.name.bold()),
            }
        }
    }
}

impl HumanReadable for SaveUserResponse {
    fn print_human(&self) {
        println!("{}", self.message.green().bold());
        println!("  {} {}", "Email:".cyan(), self.email);
    }
}

/// Execute a user command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: UserArgs,
) -> Result<()> {
    match args.command {
        UserCommand::Members { search, start } => {
            let mut query = vec![("start", start.to_string())];
            if let Some(search) = search {
                query.push(("search", search));
            }
            let members: Vec<Member> =
                make_request(client.get(endpoint(base_url, "/api/members")).query(&query)).await?;
            if human && members.is_empty() {
                println!("{}", "(No members)".dimmed());
                return Ok(());
            }
            output(&members, human)
        }
        UserCommand::List => {
            let users: UserDirectory =
                make_request(client.get(endpoint(base_url, "/api/users"))).await?;
            output(&users, human)
        }
        UserCommand::Save {
            email,
            full_name,
            username,
            image,
            roles,
            disabled,
        } => {
            let body = UserProfile {
                email,
                full_name,
                username,
                user_image: image,
                enabled: !disabled,
                roles,
            };
            let response: SaveUserResponse =
                make_request(client.post(endpoint(base_url, "/api/users")).json(&body)).await?;
            output(&response, human)
        }
    }
}

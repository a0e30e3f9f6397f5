//! Membership commands

use anyhow::{Context, Result};
use clap::Subcommand;

use warden_policy::Rbac;
use warden_store::InMemoryStorage;

use super::{resolve_required, Outcome};

/// Membership subcommands
#[derive(Subcommand)]
pub enum MemberCommand {
    /// Make a principal a direct member of a group
    Add {
        /// The member (identity or group)
        member: String,

        /// The group
        group: String,
    },

    /// Remove a direct membership
    Remove {
        /// The member
        member: String,

        /// The group
        group: String,
    },
}

/// Implementation of the member commands
pub fn execute(rbac: &Rbac<InMemoryStorage>, command: &MemberCommand) -> Result<Outcome> {
    match command {
        MemberCommand::Add { member, group } => {
            let member_id = resolve_required(rbac, member)?;
            let group_id = resolve_required(rbac, group)?;
            let added = rbac
                .add_membership(member_id, group_id)
                .with_context(|| format!("Failed to add {} to {}", member, group))?;

            if added {
                println!("added {} to {}", member, group);
                Ok(Outcome::Changed)
            } else {
                println!("{} is already a member of {}", member, group);
                Ok(Outcome::Unchanged)
            }
        }
        MemberCommand::Remove { member, group } => {
            let member_id = resolve_required(rbac, member)?;
            let group_id = resolve_required(rbac, group)?;

            if rbac.remove_membership(&member_id, &group_id)? {
                println!("removed {} from {}", member, group);
                Ok(Outcome::Changed)
            } else {
                println!("{} is not a direct member of {}", member, group);
                Ok(Outcome::Unchanged)
            }
        }
    }
}

//! Read-only query commands

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;

use warden_core::Reference;
use warden_policy::Rbac;
use warden_store::InMemoryStorage;

use super::{describe, resolve_required, Outcome};

/// Arguments for the check command
#[derive(Args)]
pub struct CheckArgs {
    /// The principal asking
    pub subject: String,

    /// The privilege token
    pub privilege: String,

    /// The object
    pub object: String,

    /// Evaluate at this instant (RFC 3339) instead of now
    #[clap(long)]
    pub at: Option<DateTime<Utc>>,

    /// Also print the grant that allowed access
    #[clap(long)]
    pub explain: bool,
}

/// Arguments for the tree command
#[derive(Args)]
pub struct TreeArgs {
    /// Start at this principal instead of every root group
    pub root: Option<String>,
}

/// Implementation of the check command
pub fn execute_check(rbac: &Rbac<InMemoryStorage>, args: &CheckArgs) -> Result<Outcome> {
    let when = args.at.unwrap_or_else(Utc::now);
    let found = rbac.find_grant(
        &Reference::parse(&args.subject),
        &args.privilege,
        &Reference::parse(&args.object),
        when,
    )?;

    match found {
        Some(found) => {
            println!("allowed");
            if args.explain {
                println!(
                    "via {} holding {} on {}",
                    describe(rbac, &found.via)?,
                    found.grant.privilege,
                    describe(rbac, &found.grant.object)?
                );
            }
            Ok(Outcome::Unchanged)
        }
        None => {
            println!("denied");
            Ok(Outcome::Denied)
        }
    }
}

/// Implementation of the closure command
pub fn execute_closure(rbac: &Rbac<InMemoryStorage>, subject: &str) -> Result<Outcome> {
    let subject = resolve_required(rbac, subject)?;
    for level in rbac.memberships(&subject)? {
        println!("{}\t{}\t{}", level.level, level.id, describe(rbac, &level.id)?);
    }
    Ok(Outcome::Unchanged)
}

/// Implementation of the members command
pub fn execute_members(rbac: &Rbac<InMemoryStorage>, group: &str) -> Result<Outcome> {
    let group = resolve_required(rbac, group)?;
    let mut members = Vec::new();
    for id in rbac.members(&group)? {
        members.push((describe(rbac, &id)?, id));
    }
    members.sort();

    for (name, id) in members {
        println!("{}\t{}", id, name);
    }
    Ok(Outcome::Unchanged)
}

/// Implementation of the tree command
pub fn execute_tree(rbac: &Rbac<InMemoryStorage>, args: &TreeArgs) -> Result<Outcome> {
    let root = match &args.root {
        Some(root) => Some(resolve_required(rbac, root)?),
        None => None,
    };
    for row in rbac.member_tree(root)? {
        println!("{}", row.render());
    }
    Ok(Outcome::Unchanged)
}

/// Implementation of the permissions command
pub fn execute_permissions(rbac: &Rbac<InMemoryStorage>, subject: &str) -> Result<Outcome> {
    let subject = resolve_required(rbac, subject)?;
    for grant in rbac.grants_for(&subject)? {
        println!(
            "{}\t{}\t{} .. {}",
            grant.privilege,
            describe(rbac, &grant.object)?,
            grant.starts.to_rfc3339(),
            grant.ends.to_rfc3339()
        );
    }
    Ok(Outcome::Unchanged)
}

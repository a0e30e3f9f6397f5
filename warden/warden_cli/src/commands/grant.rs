//! Grant commands

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use warden_core::{GrantRequest, Reference};
use warden_policy::Rbac;
use warden_store::InMemoryStorage;

use super::{resolve_required, Outcome};

/// Arguments for the grant command
#[derive(Args)]
pub struct GrantArgs {
    /// Who receives the grant
    #[clap(required_unless_present = "file")]
    pub subject: Option<String>,

    /// The privilege token, or `*` for every privilege
    #[clap(required_unless_present = "file")]
    pub privilege: Option<String>,

    /// What the grant applies to
    #[clap(required_unless_present = "file")]
    pub object: Option<String>,

    /// Start of the validity window (RFC 3339)
    #[clap(long)]
    pub starts: Option<DateTime<Utc>>,

    /// End of the validity window (RFC 3339)
    #[clap(long)]
    pub ends: Option<DateTime<Utc>>,

    /// Read a JSON array of grant requests instead
    #[clap(long, conflicts_with_all = ["subject", "privilege", "object"])]
    pub file: Option<PathBuf>,
}

/// Arguments for the revoke command
#[derive(Args)]
pub struct RevokeArgs {
    /// The grant holder
    pub subject: String,

    /// The privilege token
    pub privilege: String,

    /// The object
    pub object: String,
}

fn requests(args: &GrantArgs) -> Result<Vec<GrantRequest>> {
    if let Some(path) = &args.file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse grant requests in {}", path.display()));
    }

    let (Some(subject), Some(privilege), Some(object)) =
        (&args.subject, &args.privilege, &args.object)
    else {
        anyhow::bail!("subject, privilege and object are required");
    };

    let mut request = GrantRequest::new(
        Reference::parse(subject),
        privilege.as_str(),
        Reference::parse(object),
    );
    request.starts = args.starts;
    request.ends = args.ends;
    Ok(vec![request])
}

/// Implementation of the grant command
pub fn execute_grant(rbac: &Rbac<InMemoryStorage>, args: &GrantArgs) -> Result<Outcome> {
    let requests = requests(args)?;
    let stored = rbac
        .add_permissions(&requests)
        .context("Grant refused")?;

    println!("stored {} of {} grant(s)", stored, requests.len());
    Ok(if stored > 0 {
        Outcome::Changed
    } else {
        Outcome::Unchanged
    })
}

/// Implementation of the revoke command
pub fn execute_revoke(rbac: &Rbac<InMemoryStorage>, args: &RevokeArgs) -> Result<Outcome> {
    let subject = resolve_required(rbac, &args.subject)?;
    let object = resolve_required(rbac, &args.object)?;

    if rbac.revoke_permission(&subject, &args.privilege, &object)? {
        println!("revoked");
        Ok(Outcome::Changed)
    } else {
        println!("no such grant");
        Ok(Outcome::Unchanged)
    }
}

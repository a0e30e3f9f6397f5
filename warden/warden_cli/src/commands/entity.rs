//! Entity creation commands

use anyhow::Result;
use clap::Args;

use warden_core::{Credential, ObjectId};
use warden_policy::{NewGroup, NewIdentity, NewItem, Rbac};
use warden_store::InMemoryStorage;

use super::Outcome;

/// Arguments for the identity command
#[derive(Args)]
pub struct IdentityArgs {
    /// Identifier to use instead of a generated one
    #[clap(long)]
    pub id: Option<ObjectId>,

    /// Email address
    #[clap(long, alias = "email")]
    pub key: Option<String>,

    /// Given name
    #[clap(long)]
    pub firstname: Option<String>,

    /// Family name
    #[clap(long)]
    pub lastname: Option<String>,

    /// Full display name
    #[clap(long)]
    pub fullname: Option<String>,

    /// Already-encoded credential
    #[clap(long)]
    pub credential: Option<String>,
}

/// Arguments for the group command
#[derive(Args)]
pub struct GroupArgs {
    /// Identifier to use instead of a generated one
    #[clap(long)]
    pub id: Option<ObjectId>,

    /// Group name
    #[clap(long, alias = "name")]
    pub key: Option<String>,
}

/// Arguments for the item command
#[derive(Args)]
pub struct ItemArgs {
    /// Identifier to use instead of a generated one
    #[clap(long)]
    pub id: Option<ObjectId>,

    /// Item name
    #[clap(long, alias = "name")]
    pub key: Option<String>,
}

/// Implementation of the identity command
pub fn execute_identity(rbac: &Rbac<InMemoryStorage>, args: &IdentityArgs) -> Result<Outcome> {
    let id = rbac.create_identity(NewIdentity {
        id: args.id,
        email: args.key.clone(),
        firstname: args.firstname.clone(),
        lastname: args.lastname.clone(),
        fullname: args.fullname.clone(),
        credential: args.credential.as_deref().map(Credential::new),
    })?;
    println!("{}", id);
    Ok(Outcome::Changed)
}

/// Implementation of the group command
pub fn execute_group(rbac: &Rbac<InMemoryStorage>, args: &GroupArgs) -> Result<Outcome> {
    let id = rbac.create_group(NewGroup {
        id: args.id,
        name: args.key.clone(),
    })?;
    println!("{}", id);
    Ok(Outcome::Changed)
}

/// Implementation of the item command
pub fn execute_item(rbac: &Rbac<InMemoryStorage>, args: &ItemArgs) -> Result<Outcome> {
    let id = rbac.create_item(NewItem {
        id: args.id,
        name: args.key.clone(),
    })?;
    println!("{}", id);
    Ok(Outcome::Changed)
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use warden_core::WardenConfig;

mod commands;
mod session;

use commands::entity::{GroupArgs, IdentityArgs, ItemArgs};
use commands::grant::{GrantArgs, RevokeArgs};
use commands::membership::MemberCommand;
use commands::query::{CheckArgs, TreeArgs};
use commands::Outcome;
use session::Session;

/// Warden: role-based access control over a local state file
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// State file (JSON snapshot); created if missing
    #[clap(long, global = true, default_value = "warden.json")]
    state: PathBuf,

    /// Configuration file (TOML)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an identity
    Identity(IdentityArgs),

    /// Create a group
    Group(GroupArgs),

    /// Create an item
    Item(ItemArgs),

    /// Add or remove a direct membership
    #[clap(subcommand)]
    Member(MemberCommand),

    /// Grant a privilege on an object
    Grant(GrantArgs),

    /// Revoke a grant
    Revoke(RevokeArgs),

    /// Check whether a subject holds a privilege on an object
    Check(CheckArgs),

    /// List every group a principal reaches
    Closure {
        /// The principal
        subject: String,
    },

    /// List every principal that reaches a group
    Members {
        /// The group
        group: String,
    },

    /// Print the membership tree
    Tree(TreeArgs),

    /// List the grants held directly by a principal
    Permissions {
        /// The principal
        subject: String,
    },
}

fn init_logging(config: &WardenConfig) {
    // RUST_LOG, when set, overrides the configured level
    let _ = env_logger::Builder::new()
        .filter_level(config.logging.level.to_level_filter())
        .parse_default_env()
        .try_init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => WardenConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => WardenConfig::default(),
    };
    init_logging(&config);

    let session = Session::open(&cli.state, &config)?;
    let rbac = session.rbac();

    let outcome = match cli.command {
        Commands::Identity(args) => commands::entity::execute_identity(rbac, &args)?,
        Commands::Group(args) => commands::entity::execute_group(rbac, &args)?,
        Commands::Item(args) => commands::entity::execute_item(rbac, &args)?,
        Commands::Member(command) => commands::membership::execute(rbac, &command)?,
        Commands::Grant(args) => commands::grant::execute_grant(rbac, &args)?,
        Commands::Revoke(args) => commands::grant::execute_revoke(rbac, &args)?,
        Commands::Check(args) => commands::query::execute_check(rbac, &args)?,
        Commands::Closure { subject } => commands::query::execute_closure(rbac, &subject)?,
        Commands::Members { group } => commands::query::execute_members(rbac, &group)?,
        Commands::Tree(args) => commands::query::execute_tree(rbac, &args)?,
        Commands::Permissions { subject } => {
            commands::query::execute_permissions(rbac, &subject)?
        }
    };

    if outcome == Outcome::Changed {
        session.save()?;
    }
    Ok(outcome.exit_code())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{:#}", err);
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

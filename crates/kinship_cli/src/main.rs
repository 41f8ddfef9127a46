//! Command-line entry point for Kinship family trees.
//!
//! # Responsibility
//! - Parse configuration (database path, logging) from flags and environment.
//! - Map subcommands onto `kinship_core` services and render their results.

#![forbid(unsafe_code)]

mod output;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use kinship_core::db::open_db;
use kinship_core::{
    default_log_level, init_logging, AddMemberRequest, FamilyService, RelationshipType,
    SqliteFamilyRepository, SqliteMemberRepository, TreeService,
};
use log::info;
use output::OutputMode;
use rusqlite::Connection;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about = "kinship: family tree statistics and hierarchy", long_about = None)]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "KINSHIP_DB", default_value = "kinship.sqlite3", global = true)]
    db: PathBuf,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "KINSHIP_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "KINSHIP_LOG_DIR", global = true)]
    log_dir: Option<String>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage families.
    #[command(subcommand)]
    Family(FamilyCommand),
    /// Manage members.
    #[command(subcommand)]
    Member(MemberCommand),
    /// Show a family tree grouped by generation.
    Tree {
        /// Family id.
        family: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum FamilyCommand {
    /// Create a family with its founding member.
    Create { name: String },
    /// List families with member and generation counts.
    List,
    /// Show member and generation counts for one family.
    Stats { family: Uuid },
    /// Rename a family.
    Rename { family: Uuid, name: String },
    /// Delete a family and all of its members.
    Delete { family: Uuid },
}

#[derive(Subcommand, Debug)]
enum MemberCommand {
    /// Add a member to a family.
    Add(AddArgs),
    /// Change a member's fields or parent.
    Update(UpdateArgs),
    /// List members that can be chosen as parent.
    List { family: Uuid },
}

#[derive(Args, Debug)]
struct AddArgs {
    family: Uuid,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    /// Date of birth, YYYY-MM-DD.
    #[arg(long)]
    dob: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    picture: Option<String>,
    /// Existing member the new one relates to.
    #[arg(long, requires = "relation")]
    related: Option<Uuid>,
    /// Relation of the new member to `--related` (child sets the parent).
    #[arg(long, value_parser = parse_relation)]
    relation: Option<RelationshipType>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    member: Uuid,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    dob: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    picture: Option<String>,
    /// New parent id.
    #[arg(long, conflicts_with = "no_parent")]
    parent: Option<Uuid>,
    /// Make the member a root.
    #[arg(long)]
    no_parent: bool,
}

fn parse_relation(value: &str) -> Result<RelationshipType, String> {
    RelationshipType::parse(value).ok_or_else(|| {
        let known: Vec<&str> = RelationshipType::ALL.iter().map(|kind| kind.as_str()).collect();
        format!("unknown relation `{value}`; expected one of {}", known.join("|"))
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(|err| anyhow!(err))?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    info!("event=cli_start module=cli status=ok command={}", command_name(&cli.command));

    run(&cli, &conn)
}

fn run(cli: &Cli, conn: &Connection) -> anyhow::Result<()> {
    let mode = cli.output_mode();
    match &cli.command {
        Commands::Family(command) => {
            let service = FamilyService::new(
                SqliteFamilyRepository::try_new(conn)?,
                SqliteMemberRepository::try_new(conn)?,
            );
            match command {
                FamilyCommand::Create { name } => {
                    let (family, founder) = service.create_family(name.as_str())?;
                    output::render_created_family(mode, &family, &founder)
                }
                FamilyCommand::List => {
                    output::render_family_list(mode, &service.list_families_with_stats()?)
                }
                FamilyCommand::Stats { family } => {
                    output::render_family_stats(mode, &service.family_stats(*family)?)
                }
                FamilyCommand::Rename { family, name } => {
                    service.rename_family(*family, name.as_str())?;
                    output::render_message(mode, "renamed", *family)
                }
                FamilyCommand::Delete { family } => {
                    service.delete_family(*family)?;
                    output::render_message(mode, "deleted", *family)
                }
            }
        }
        Commands::Member(command) => {
            let service = tree_service(conn)?;
            match command {
                MemberCommand::Add(args) => {
                    let member = service.add_member(&AddMemberRequest {
                        family_id: args.family,
                        first_name: args.first_name.clone(),
                        last_name: args.last_name.clone(),
                        date_of_birth: args.dob.clone(),
                        biography: args.bio.clone(),
                        picture_url: args.picture.clone(),
                        related_member_id: args.related,
                        relation: args.relation,
                    })?;
                    output::render_member(mode, &member)
                }
                MemberCommand::Update(args) => {
                    let mut member = service.member(args.member)?;
                    apply_update(&mut member, args);
                    service.update_member(&member)?;
                    output::render_message(mode, "updated", member.id)
                }
                MemberCommand::List { family } => {
                    output::render_members(mode, &service.candidate_parents(*family)?)
                }
            }
        }
        Commands::Tree { family } => {
            let tree = tree_service(conn)?.family_tree(*family)?;
            output::render_tree(mode, &tree)
        }
    }
}

fn tree_service(
    conn: &Connection,
) -> anyhow::Result<TreeService<SqliteFamilyRepository<'_>, SqliteMemberRepository<'_>>> {
    Ok(TreeService::new(
        SqliteFamilyRepository::try_new(conn)?,
        SqliteMemberRepository::try_new(conn)?,
    ))
}

fn apply_update(member: &mut kinship_core::Member, args: &UpdateArgs) {
    if let Some(first_name) = &args.first_name {
        member.first_name = first_name.clone();
    }
    if let Some(last_name) = &args.last_name {
        member.last_name = last_name.clone();
    }
    if let Some(dob) = &args.dob {
        member.date_of_birth = Some(dob.clone());
    }
    if let Some(bio) = &args.bio {
        member.biography = Some(bio.clone());
    }
    if let Some(picture) = &args.picture {
        member.picture_url = Some(picture.clone());
    }
    if args.no_parent {
        member.parent_id = None;
    } else if let Some(parent) = args.parent {
        member.parent_id = Some(parent);
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Family(_) => "family",
        Commands::Member(_) => "member",
        Commands::Tree { .. } => "tree",
    }
}

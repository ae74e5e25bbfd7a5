//! Role lifecycle commands

use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand};
use roster_capability::scope::parse_assignment;
use roster_core::{Revision, RoleId};
use roster_definition::RoleDefinition;
use roster_workflow::{RoleDraft, WorkflowController};
use serde::Serialize;

use super::Context;

#[derive(Subcommand)]
pub enum RoleCommand {
    /// Create a role
    Create(CreateArgs),

    /// Write a new version of a role
    Update(UpdateArgs),

    /// Show a role
    Show {
        /// Role ID
        id: String,

        /// Show this version instead of the latest
        #[clap(long)]
        version: Option<Revision>,
    },

    /// List every role with its latest and active version
    List,

    /// List every version of a role
    Versions {
        /// Role ID
        id: String,
    },

    /// Make a version the active version of a role
    Publish {
        /// Role ID
        id: String,

        /// Version to activate, e.g. 3 or v3
        version: Revision,
    },

    /// Activate the latest version of a role
    Activate {
        /// Role ID
        id: String,
    },

    /// Deactivate a role so that none of its versions is active
    Deactivate {
        /// Role ID
        id: String,
    },

    /// Copy a role under a new ID
    Clone {
        /// Source role ID
        id: String,

        /// ID of the copy; defaults to "<id>-copy"
        #[clap(long)]
        new_id: Option<String>,

        /// Label of the copy; defaults to "<label> (Copy)"
        #[clap(long)]
        label: Option<String>,
    },

    /// Delete a role, its versions and its dashboard
    Delete {
        /// Role ID
        id: String,
    },
}

#[derive(Args)]
pub struct CreateArgs {
    /// Role ID
    #[clap(long)]
    pub id: String,

    /// Display label
    #[clap(long)]
    pub label: String,

    /// Description
    #[clap(long, default_value = "")]
    pub description: String,

    /// Capability to grant; prerequisites are added automatically
    #[clap(long = "capability", short = 'c')]
    pub capabilities: Vec<String>,

    /// Scope assignment as category=value
    #[clap(long = "scope", short = 's')]
    pub scopes: Vec<String>,

    /// Activate the new role right away
    #[clap(long)]
    pub publish: bool,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Role ID
    pub id: String,

    /// New display label
    #[clap(long)]
    pub label: Option<String>,

    /// New description
    #[clap(long)]
    pub description: Option<String>,

    /// Capability to grant; prerequisites are added automatically
    #[clap(long = "add")]
    pub add: Vec<String>,

    /// Capability to revoke; capabilities depending on it are revoked too
    #[clap(long = "remove")]
    pub remove: Vec<String>,

    /// Scope assignment as category=value
    #[clap(long = "scope", short = 's')]
    pub scopes: Vec<String>,

    /// Scope category to clear
    #[clap(long = "clear-scope")]
    pub clear_scopes: Vec<String>,

    /// Version the update is based on; defaults to the latest
    #[clap(long)]
    pub expected_version: Option<Revision>,
}

#[derive(Serialize)]
struct RoleSummary<'a> {
    id: &'a RoleId,
    label: &'a str,
    latest: Revision,
    active: Option<Revision>,
    capabilities: usize,
}

#[derive(Serialize)]
struct SaveReport<'a> {
    id: &'a str,
    version: Revision,
    added: Vec<String>,
    removed: Vec<String>,
    published: bool,
}

pub async fn execute(ctx: &Context, command: &RoleCommand) -> Result<()> {
    let controller = ctx.controller()?;
    match command {
        RoleCommand::Create(args) => create(ctx, &controller, args).await,
        RoleCommand::Update(args) => update(ctx, &controller, args).await,
        RoleCommand::Show { id, version } => {
            let id = RoleId::new(id.as_str());
            let role = match version {
                Some(version) => controller.get_role_version(&id, *version).await?,
                None => controller.get_role(&id).await?,
            };
            ctx.emit(&role, || print_role(&role))
        }
        RoleCommand::List => list(ctx, &controller).await,
        RoleCommand::Versions { id } => {
            let versions = controller.role_versions(&RoleId::new(id.as_str())).await?;
            ctx.emit(&versions, || {
                for role in &versions {
                    let marker = if role.active { " (active)" } else { "" };
                    println!(
                        "{}{}  {}  {} capabilities  {}",
                        role.version,
                        marker,
                        role.label,
                        role.capabilities.len(),
                        role.updated_at.to_rfc3339()
                    );
                }
            })
        }
        RoleCommand::Publish { id, version } => {
            let id = RoleId::new(id.as_str());
            let previous = controller.publish_role(&id, *version).await?;
            ctx.emit(&serde_json::json!({ "id": id, "active": version, "previous": previous }), || {
                match previous {
                    Some(previous) if previous != *version => {
                        println!("Published {} {} (was {})", id, version, previous)
                    }
                    _ => println!("Published {} {}", id, version),
                }
            })
        }
        RoleCommand::Activate { id } => set_active(ctx, &controller, id, true).await,
        RoleCommand::Deactivate { id } => set_active(ctx, &controller, id, false).await,
        RoleCommand::Clone { id, new_id, label } => {
            let copy = controller
                .clone_role(
                    &RoleId::new(id.as_str()),
                    new_id.as_deref().map(RoleId::new),
                    label.clone(),
                )
                .await?;
            ctx.emit(&copy, || {
                println!("Cloned {} to {} \"{}\"", id, copy.id, copy.label)
            })
        }
        RoleCommand::Delete { id } => {
            controller.delete_role(&RoleId::new(id.as_str())).await?;
            ctx.emit(&serde_json::json!({ "deleted": id }), || {
                println!("Deleted role {}", id)
            })
        }
    }
}

async fn create(ctx: &Context, controller: &WorkflowController, args: &CreateArgs) -> Result<()> {
    let mut draft = RoleDraft::new();
    draft.set_id(args.id.as_str())?;
    draft.set_label(args.label.as_str());
    draft.set_description(args.description.as_str());
    draft.select_capabilities(controller.capabilities(), &args.capabilities)?;
    for assignment in &args.scopes {
        let (category, value) = parse_assignment(assignment)?;
        draft.set_scope(controller.scopes(), &category, &value)?;
    }

    let added = implied(&args.capabilities, &draft);
    let definition = draft.to_definition();
    let id = definition.id.clone();

    let version = controller.save_role(definition, None).await?;
    if args.publish {
        controller.publish_role(&id, version).await?;
    }

    let report = SaveReport {
        id: id.as_str(),
        version,
        added,
        removed: Vec::new(),
        published: args.publish,
    };
    ctx.emit(&report, || print_save("Created", &report))
}

async fn update(ctx: &Context, controller: &WorkflowController, args: &UpdateArgs) -> Result<()> {
    let id = RoleId::new(args.id.as_str());
    let base = match args.expected_version {
        Some(version) => controller.get_role_version(&id, version).await?,
        None => controller.get_role(&id).await?,
    };

    let catalog = controller.capabilities();
    let mut draft = RoleDraft::from_definition(&base);
    if let Some(label) = &args.label {
        draft.set_label(label.as_str());
    }
    if let Some(description) = &args.description {
        draft.set_description(description.as_str());
    }

    let mut removed: Vec<String> = Vec::new();
    for key in &args.remove {
        if removed.contains(key) {
            continue;
        }
        if !draft.capabilities().contains(key) {
            bail!("Role {} does not grant {}", id, key);
        }
        let delta = draft.toggle_capability(catalog, key)?;
        removed.extend(delta.removed.iter().map(|k| k.to_string()));
    }
    draft.select_capabilities(catalog, &args.add)?;
    let added = implied(&args.add, &draft)
        .into_iter()
        .filter(|key| !base.capabilities.contains(key))
        .collect();

    for category in &args.clear_scopes {
        draft.clear_scope(controller.scopes(), category)?;
    }
    for assignment in &args.scopes {
        let (category, value) = parse_assignment(assignment)?;
        draft.set_scope(controller.scopes(), &category, &value)?;
    }

    let version = controller
        .save_role(draft.to_definition(), draft.base_version())
        .await
        .with_context(|| format!("Failed to update role {}", id))?;

    let report = SaveReport {
        id: id.as_str(),
        version,
        added,
        removed,
        published: false,
    };
    ctx.emit(&report, || print_save("Updated", &report))
}

async fn list(ctx: &Context, controller: &WorkflowController) -> Result<()> {
    let roles = controller.list_roles().await?;
    let mut active = Vec::with_capacity(roles.len());
    for role in &roles {
        active.push(controller.active_role(&role.id).await?.map(|r| r.version));
    }

    let summaries: Vec<RoleSummary> = roles
        .iter()
        .zip(&active)
        .map(|(role, active)| RoleSummary {
            id: &role.id,
            label: &role.label,
            latest: role.version,
            active: *active,
            capabilities: role.capabilities.len(),
        })
        .collect();

    ctx.emit(&summaries, || {
        if summaries.is_empty() {
            println!("No roles defined");
            return;
        }
        println!("{:<24} {:<28} {:<7} {:<7} CAPABILITIES", "ID", "LABEL", "LATEST", "ACTIVE");
        for summary in &summaries {
            let active = summary
                .active
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<24} {:<28} {:<7} {:<7} {}",
                summary.id,
                summary.label,
                summary.latest.to_string(),
                active,
                summary.capabilities
            );
        }
    })
}

async fn set_active(
    ctx: &Context,
    controller: &WorkflowController,
    id: &str,
    active: bool,
) -> Result<()> {
    let role = controller.set_active(&RoleId::new(id), active).await?;
    ctx.emit(&role, || {
        if role.active {
            println!("Activated {} {}", role.id, role.version)
        } else {
            println!("Deactivated role {}", role.id)
        }
    })
}

/// Capabilities in the draft that were pulled in as prerequisites rather
/// than requested.
fn implied(requested: &[String], draft: &RoleDraft) -> Vec<String> {
    draft
        .capabilities()
        .iter()
        .map(|key| key.to_string())
        .filter(|key| !requested.contains(key))
        .collect()
}

fn print_save(action: &str, report: &SaveReport) {
    println!("{} role {} {}", action, report.id, report.version);
    if !report.added.is_empty() {
        println!("  added prerequisites: {}", report.added.join(", "));
    }
    if !report.removed.is_empty() {
        println!("  removed: {}", report.removed.join(", "));
    }
    if report.published {
        println!("  published {}", report.version);
    }
}

fn print_role(role: &RoleDefinition) {
    let state = if role.active { "active" } else { "inactive" };
    println!("{} \"{}\" {} ({})", role.id, role.label, role.version, state);
    if !role.description.is_empty() {
        println!("  {}", role.description);
    }
    println!("  assigned users: {}", role.assigned_users);
    println!("  capabilities:");
    for key in &role.capabilities {
        println!("    {}", key);
    }
    println!("  scopes:");
    for (category, value) in role.scopes.iter() {
        println!("    {} = {}", category, value);
    }
}

//! Dashboard lifecycle commands

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use roster_core::{Revision, RoleId};
use roster_definition::{DashboardDefinition, MenuEntry};
use roster_workflow::{DashboardDraft, WorkflowController};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Context;

#[derive(Subcommand)]
pub enum DashboardCommand {
    /// Write a new dashboard version for a role
    Save(SaveArgs),

    /// Show the dashboard of a role
    Show {
        /// Role ID
        role_id: String,

        /// Show this version instead of the latest
        #[clap(long)]
        version: Option<Revision>,
    },

    /// Make a dashboard version active
    Publish {
        /// Role ID
        role_id: String,

        /// Dashboard version to activate
        version: Revision,

        /// Also activate this role version in the same step
        #[clap(long)]
        role_version: Option<Revision>,
    },
}

#[derive(Args)]
pub struct SaveArgs {
    /// Role ID
    pub role_id: String,

    /// JSON file with the full menu, replacing the current one
    #[clap(long)]
    pub menu: Option<PathBuf>,

    /// Menu entry key to append; taken from the menu catalog when one is configured
    #[clap(long = "entry", short = 'e')]
    pub entries: Vec<String>,

    /// Menu entry key to remove
    #[clap(long = "remove")]
    pub remove: Vec<String>,

    /// Move a top-level entry, given as FROM:TO indices
    #[clap(long = "move")]
    pub moves: Vec<String>,

    /// JSON file with the page layout
    #[clap(long)]
    pub layout: Option<PathBuf>,

    /// Version the save is based on; defaults to the latest
    #[clap(long)]
    pub expected_version: Option<Revision>,
}

pub async fn execute(ctx: &Context, command: &DashboardCommand) -> Result<()> {
    let controller = ctx.controller()?;
    match command {
        DashboardCommand::Save(args) => save(ctx, &controller, args).await,
        DashboardCommand::Show { role_id, version } => {
            let role_id = RoleId::new(role_id.as_str());
            let dashboard = match version {
                Some(version) => controller.get_dashboard_version(&role_id, *version).await?,
                None => controller.get_dashboard(&role_id).await?,
            };
            ctx.emit(&dashboard, || print_dashboard(&dashboard))
        }
        DashboardCommand::Publish {
            role_id,
            version,
            role_version,
        } => {
            let role_id = RoleId::new(role_id.as_str());
            match role_version {
                Some(role_version) => {
                    controller
                        .publish_definition(&role_id, *role_version, *version)
                        .await?
                }
                None => {
                    controller.publish_dashboard(&role_id, *version).await?;
                }
            }
            let report = serde_json::json!({
                "role_id": role_id,
                "dashboard_version": version,
                "role_version": role_version,
            });
            ctx.emit(&report, || match role_version {
                Some(role_version) => println!(
                    "Published {} {} with dashboard {}",
                    role_id, role_version, version
                ),
                None => println!("Published dashboard {} for {}", version, role_id),
            })
        }
    }
}

async fn save(ctx: &Context, controller: &WorkflowController, args: &SaveArgs) -> Result<()> {
    let role_id = RoleId::new(args.role_id.as_str());
    let base = match args.expected_version {
        Some(version) => Some(controller.get_dashboard_version(&role_id, version).await?),
        None => controller.find_dashboard(&role_id).await?,
    };
    let mut draft = match &base {
        Some(dashboard) => DashboardDraft::from_definition(dashboard),
        None => DashboardDraft::new(role_id.clone()),
    };

    if let Some(path) = &args.menu {
        draft.replace_menu(read_json(path)?);
    }

    for key in &args.remove {
        if draft.remove_entry(key).is_none() {
            anyhow::bail!("Menu has no entry {}", key);
        }
    }
    for key in &args.entries {
        let added = match controller.menus() {
            Some(menus) => draft.add_from_catalog(menus, key)?,
            None => draft.add_entry(MenuEntry::new(key.as_str(), key.as_str())),
        };
        if !added {
            tracing::warn!(entry = %key, "Menu entry already present");
        }
    }
    for pair in &args.moves {
        let (from, to) = parse_move(pair)?;
        draft.reorder(from, to)?;
    }
    if let Some(path) = &args.layout {
        draft.set_layout(read_json::<Value>(path)?);
    }

    let version = controller
        .save_dashboard(draft.to_definition(), draft.base_version())
        .await
        .with_context(|| format!("Failed to save dashboard for {}", role_id))?;

    let saved = controller.get_dashboard_version(&role_id, version).await?;
    ctx.emit(&saved, || {
        println!("Saved dashboard {} for {}", version, role_id);
        print_menu(&saved.menu, 1);
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_move(pair: &str) -> Result<(usize, usize)> {
    let (from, to) = pair
        .split_once(':')
        .with_context(|| format!("Expected FROM:TO, got {}", pair))?;
    Ok((
        from.trim()
            .parse::<usize>()
            .with_context(|| format!("Invalid index in {}", pair))?,
        to.trim()
            .parse::<usize>()
            .with_context(|| format!("Invalid index in {}", pair))?,
    ))
}

fn print_dashboard(dashboard: &DashboardDefinition) {
    let state = if dashboard.active { "active" } else { "inactive" };
    println!(
        "Dashboard for {} {} ({})",
        dashboard.role_id, dashboard.version, state
    );
    print_menu(&dashboard.menu, 1);
    if !dashboard.layout.is_null() {
        println!("  layout: {}", dashboard.layout);
    }
}

fn print_menu(entries: &[MenuEntry], depth: usize) {
    for entry in entries {
        match &entry.route {
            Some(route) => println!(
                "{:indent$}{} ({}) -> {}",
                "",
                entry.label,
                entry.key,
                route,
                indent = depth * 2
            ),
            None => println!(
                "{:indent$}{} ({})",
                "",
                entry.label,
                entry.key,
                indent = depth * 2
            ),
        }
        print_menu(&entry.children, depth + 1);
    }
}

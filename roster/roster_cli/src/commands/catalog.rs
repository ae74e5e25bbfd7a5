//! Catalog inspection commands

use anyhow::Result;
use clap::Subcommand;
use roster_capability::{Capability, ScopeCatalog};
use roster_definition::{MenuCatalog, MenuEntry};
use serde::Serialize;

use super::Context;

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// Show the capability, scope and menu catalogs
    Show {
        /// Only show capabilities in this area
        #[clap(long)]
        area: Option<String>,
    },

    /// Check that every configured catalog loads and is consistent
    Validate,
}

#[derive(Serialize)]
struct CatalogView<'a> {
    capabilities: Vec<&'a Capability>,
    scopes: &'a ScopeCatalog,
    menus: Option<&'a MenuCatalog>,
}

#[derive(Serialize)]
struct ValidationSummary {
    capabilities: usize,
    areas: usize,
    scope_categories: usize,
    menu_entries: Option<usize>,
}

pub fn execute(ctx: &Context, command: &CatalogCommand) -> Result<()> {
    match command {
        CatalogCommand::Show { area } => show(ctx, area.as_deref()),
        CatalogCommand::Validate => validate(ctx),
    }
}

fn show(ctx: &Context, area: Option<&str>) -> Result<()> {
    let capabilities = ctx.capabilities()?;
    let scopes = ctx.scopes()?;
    let menus = ctx.menus()?;

    let areas: Vec<&str> = match area {
        Some(area) => vec![area],
        None => capabilities.areas(),
    };
    let view = CatalogView {
        capabilities: areas
            .iter()
            .flat_map(|area| capabilities.in_area(*area))
            .collect(),
        scopes: &scopes,
        menus: menus.as_ref(),
    };

    ctx.emit(&view, || {
        println!("Capabilities ({}):", view.capabilities.len());
        for area in &areas {
            println!("  [{}]", area);
            for capability in capabilities.in_area(*area) {
                if capability.depends_on.is_empty() {
                    println!("    {:<28} {}", capability.key, capability.label);
                } else {
                    let requires: Vec<&str> =
                        capability.depends_on.iter().map(|k| k.as_str()).collect();
                    println!(
                        "    {:<28} {} (requires: {})",
                        capability.key,
                        capability.label,
                        requires.join(", ")
                    );
                }
            }
        }

        println!("Scopes:");
        for category in scopes.categories() {
            let allowed = scopes.allowed(category).unwrap_or_default();
            println!("  {}: {}", category, allowed.join(", "));
        }

        if let Some(menus) = &menus {
            println!("Menu entries:");
            print_menu(menus.entries(), 1);
        }
    })
}

fn print_menu(entries: &[MenuEntry], depth: usize) {
    for entry in entries {
        println!("{:indent$}{} ({})", "", entry.label, entry.key, indent = depth * 2);
        print_menu(&entry.children, depth + 1);
    }
}

fn validate(ctx: &Context) -> Result<()> {
    let capabilities = ctx.capabilities()?;
    let scopes = ctx.scopes()?;
    let menus = ctx.menus()?;

    let summary = ValidationSummary {
        capabilities: capabilities.len(),
        areas: capabilities.areas().len(),
        scope_categories: scopes.len(),
        menu_entries: menus.as_ref().map(MenuCatalog::len),
    };

    ctx.emit(&summary, || {
        println!(
            "Capability catalog: {} capabilities in {} areas",
            summary.capabilities, summary.areas
        );
        println!("Scope catalog: {} categories", summary.scope_categories);
        match summary.menu_entries {
            Some(count) => println!("Menu catalog: {} entries", count),
            None => println!("Menu catalog: not configured"),
        }
        println!("All catalogs are valid");
    })
}

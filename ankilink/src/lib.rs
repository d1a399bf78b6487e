// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use crate::cli::args::{Args, Command};
use anyhow::{Context, Result};
use application::{NoteCollector, NoteRenderer, SyncPlanner};
use domain::Settings;
use infrastructure::{RemoteSnapshot, TagIndex};
use ports::PlanPresenter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting ankilink with arguments");

    let settings_path = || match &args.settings {
        Some(path) => Ok(path.clone()),
        None => infrastructure::config::default_settings_path(),
    };

    match &args.command {
        Command::Plan {
            path,
            remote,
            tags,
            json,
        } => {
            let settings = Settings::load_or_default(settings_path()?)?;
            handle_plan_command(
                path,
                args.vault.as_deref(),
                remote.as_deref(),
                tags.as_deref(),
                *json,
                &settings,
            )
        }
        Command::Render { path, write } => {
            handle_render_command(path, args.vault.as_deref(), *write)
        }
        Command::Init => handle_init_command(&settings_path()?),
    }
}

/// Root of the vault containing `path`.
///
/// `explicit` wins; otherwise the nearest ancestor holding the vault marker,
/// falling back to `path` itself (or its folder for a file).
pub fn find_vault_root(path: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if let Some(vault) = explicit {
        let vault = vault
            .canonicalize()
            .with_context(|| format!("Vault does not exist: {}", vault.display()))?;
        if !path.starts_with(&vault) {
            return Err(anyhow::anyhow!(
                "{} is not inside the vault {}",
                path.display(),
                vault.display()
            ));
        }
        return Ok(vault);
    }

    let start = if path.is_dir() {
        path.as_path()
    } else {
        path.parent().unwrap_or(&path)
    };
    match start
        .ancestors()
        .find(|dir| dir.join(constants::VAULT_MARKER).is_dir())
    {
        Some(root) => {
            debug!(?root, "Found vault marker");
            Ok(root.to_path_buf())
        }
        None => {
            debug!(root = ?start, "No vault marker, using scanned folder as vault root");
            Ok(start.to_path_buf())
        }
    }
}

fn handle_plan_command(
    path: &Path,
    vault: Option<&Path>,
    remote: Option<&Path>,
    tags: Option<&Path>,
    json: bool,
    settings: &Settings,
) -> Result<()> {
    let root = find_vault_root(path, vault)?;
    let mut collector = match tags {
        Some(tags_path) => NoteCollector::with_tag_index(&root, TagIndex::load(tags_path)?),
        None => NoteCollector::new(&root),
    };
    let files = collector.collect_path(path.canonicalize()?)?;
    let notes: Vec<_> = files.into_iter().flat_map(|f| f.notes).collect();

    let store = match remote {
        Some(remote_path) => RemoteSnapshot::load(remote_path)?,
        None => {
            warn!("No remote snapshot given, notes with an id will be planned as recreations");
            RemoteSnapshot::default()
        }
    };
    let mut planner = SyncPlanner::new(store, settings, collector.tag_index());
    let mut plan = planner.plan(&notes)?;
    let mut errors = collector.errors().to_vec();
    errors.append(&mut plan.errors);
    plan.errors = errors;

    info!(notes = plan.notes.len(), errors = plan.errors.len(), "Planned sync");
    let presenter = PlanPresenter::new();
    if json {
        println!("{}", presenter.render_json(&plan)?);
    } else {
        print!("{}", presenter.render_text(&plan));
    }
    Ok(())
}

fn handle_render_command(path: &Path, vault: Option<&Path>, write: bool) -> Result<()> {
    let mut collector = NoteCollector::new(find_vault_root(path, vault)?);
    let files = collector.collect_path(path.canonicalize()?)?;

    let mut renderer = NoteRenderer::new();
    let planned = renderer.plan(&files);
    if write {
        renderer.write(&planned)?;
    }

    print!("{}", PlanPresenter::new().render_edits(&planned, write));
    for error in collector.errors().iter().chain(renderer.errors()) {
        eprintln!("error: {}", error);
    }
    Ok(())
}

fn handle_init_command(settings_path: &Path) -> Result<()> {
    if settings_path.exists() {
        return Err(anyhow::anyhow!(
            "Settings file already exists: {}",
            settings_path.display()
        ));
    }
    Settings::create_default(settings_path)
        .with_context(|| format!("Cannot create {}", settings_path.display()))?;
    println!("Created {}", settings_path.display());
    Ok(())
}

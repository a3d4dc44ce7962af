use crate::Command;
use crate::ConfigCommand;
use crate::RootsCommand;
use crate::ScreenshotCommand;
use crate::SortArg;
use crate::TagCommand;
use crate::Toggle;
use crate::render;
use crate::session::Session;
use anyhow::Context;
use devdeck_github::GithubClient;
use devdeck_github::parse_repo_url;
use devdeck_registry::MergeOutcome;
use devdeck_registry::Project;
use devdeck_registry::ProjectUpdate;
use devdeck_registry::Screenshot;
use devdeck_registry::factory;
use devdeck_registry::views;
use devdeck_registry::views::SortKey;
use devdeck_scanner::LocalFs;
use devdeck_scanner::clone::register_clone;
use devdeck_scanner::scan::add_local_project;
use devdeck_scanner::scan::rescan_projects;
use std::path::Path;
use std::path::PathBuf;
use uuid::Uuid;

pub async fn execute(cmd: Command, data_dir: &Path) -> anyhow::Result<()> {
    match cmd {
        Command::Migrate { json, sqlite } => {
            let n = devdeck_registry::migrate::migrate_json_to_sqlite(&json, &sqlite)?;
            println!("Migrated {n} projects");
            return Ok(());
        }
        Command::Export => {
            let store = factory::open_state_store(data_dir, None)?;
            let mut out = std::io::stdout();
            store.export(&mut out)?;
            return Ok(());
        }
        Command::Import => {
            let store = factory::open_state_store(data_dir, None)?;
            let mut input = std::io::stdin();
            let n = store.import(&mut input)?;
            println!("Imported {n} projects");
            return Ok(());
        }
        Command::Config { cmd } => {
            let mut session = Session::open(data_dir)?;
            return configure(&mut session, cmd);
        }
        _ => {}
    }

    let mut session = Session::open(data_dir)?;
    if session.state.auto_scan_on_startup && !matches!(cmd, Command::Scan) {
        let report = session.scan_roots();
        tracing::info!("{}", render::scan_summary("Auto-scanned", &report));
        for failure in &report.failures {
            tracing::warn!("auto-scan: {}: {}", failure.path.display(), failure.error);
        }
        session.save()?;
    }

    match cmd {
        Command::Add { url } => {
            let repo = parse_repo_url(&url)?;
            let project = GithubClient::from_env()
                .fetch_repo(&repo)
                .await
                .with_context(|| format!("failed to import {repo}"))?;
            let outcome = session.registry.add_or_update(Project::Remote(project));
            session.save()?;
            report_merge(&session, outcome);
        }
        Command::AddLocal { path } => {
            let path = absolute(&path)?;
            let outcome = add_local_project(&LocalFs, &mut session.registry, &path)?;
            session.save()?;
            report_merge(&session, outcome);
        }
        Command::CloneRepo { url, dest } => {
            let dest = absolute(&dest)?;
            let outcome = register_clone(&LocalFs, &mut session.registry, &url, &dest)?;
            session.save()?;
            report_merge(&session, outcome);
        }
        Command::List { sort, search, json } => {
            let snapshot = session.registry.snapshot();
            let mut projects = match search.as_deref() {
                Some(term) => views::search(&snapshot, term),
                None => views::dashboard_order(&snapshot),
            };
            if let Some(sort) = sort {
                views::sort_projects(&mut projects, sort.into());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&projects)?);
            } else if projects.is_empty() {
                println!("No projects");
            } else {
                for project in projects {
                    println!("{}", render::project_line(project));
                }
            }
        }
        Command::Show { id, readme } => {
            let id = session.registry.resolve(&id)?;
            let Some(project) = session.registry.get(id) else {
                anyhow::bail!("project {id} disappeared");
            };
            print!("{}", render::project_details(project));
            if readme {
                println!();
                match fetch_readme(project).await {
                    Some(text) => println!("{text}"),
                    None => println!("no README"),
                }
            }
        }
        Command::Favorite { id } => {
            let id = session.registry.resolve(&id)?;
            let favorite = session.registry.toggle_favorite(id)?;
            session.save()?;
            let name = project_name(&session, id);
            if favorite {
                println!("{name} is now a favorite");
            } else {
                println!("{name} is no longer a favorite");
            }
        }
        Command::Tag { cmd } => match cmd {
            TagCommand::Add { id, tag } => {
                let tag = tag.trim().to_string();
                if tag.is_empty() {
                    anyhow::bail!("tag must not be empty");
                }
                let id = session.registry.resolve(&id)?;
                let changed = session.registry.add_tag(id, &tag)?;
                session.save()?;
                let name = project_name(&session, id);
                if changed {
                    println!("Tagged {name} with {tag}");
                } else {
                    println!("{name} is already tagged {tag}");
                }
            }
            TagCommand::Rm { id, tag } => {
                let id = session.registry.resolve(&id)?;
                let changed = session.registry.remove_tag(id, &tag)?;
                session.save()?;
                let name = project_name(&session, id);
                if changed {
                    println!("Removed tag {tag} from {name}");
                } else {
                    println!("{name} has no tag {tag}");
                }
            }
        },
        Command::Summary { id, text } => {
            let id = session.registry.resolve(&id)?;
            let update = ProjectUpdate {
                summary: Some(text),
                ..ProjectUpdate::default()
            };
            session.registry.update(id, update)?;
            session.save()?;
            println!("Updated summary of {}", project_name(&session, id));
        }
        Command::Screenshot { cmd } => match cmd {
            ScreenshotCommand::Add { id, path, name } => {
                let id = session.registry.resolve(&id)?;
                let screenshot = Screenshot::new(name, Some(path));
                let screenshot_id = screenshot.id;
                session.registry.add_screenshot(id, screenshot)?;
                session.save()?;
                println!(
                    "Added screenshot {screenshot_id} to {}",
                    project_name(&session, id)
                );
            }
            ScreenshotCommand::Rm { id, screenshot } => {
                let id = session.registry.resolve(&id)?;
                let screenshot: Uuid = screenshot
                    .parse()
                    .with_context(|| format!("invalid screenshot id {screenshot}"))?;
                session.registry.remove_screenshot(id, screenshot)?;
                session.save()?;
                println!(
                    "Removed screenshot {screenshot} from {}",
                    project_name(&session, id)
                );
            }
        },
        Command::Rm { id } => {
            let id = session.registry.resolve(&id)?;
            let removed = session.registry.remove(id)?;
            session.save()?;
            println!("Removed {}", removed.name());
        }
        Command::Scan => {
            if session.state.scan_locations.is_empty() {
                println!("No scan locations configured; add one with `devdeck config roots add <path>`");
                return Ok(());
            }
            let report = session.scan_roots();
            session.save()?;
            for failure in &report.failures {
                eprintln!("warning: {}: {}", failure.path.display(), failure.error);
            }
            println!("{}", render::scan_summary("Scanned", &report));
        }
        Command::Rescan => {
            let report = rescan_projects(&LocalFs, &mut session.registry);
            session.save()?;
            for failure in &report.failures {
                eprintln!("warning: {}: {}", failure.path.display(), failure.error);
            }
            println!("{}", render::scan_summary("Rescanned", &report));
        }
        Command::Refresh => {
            let client = GithubClient::from_env();
            let snapshot = session.registry.snapshot();
            let (mut refreshed, mut failed) = (0, 0);
            for project in snapshot.iter() {
                let Project::Remote(remote) = project else {
                    continue;
                };
                let fetched = match parse_repo_url(&remote.repo_url) {
                    Ok(repo) => client.fetch_repo(&repo).await,
                    Err(e) => Err(e),
                };
                match fetched {
                    Ok(fresh) => {
                        session.registry.add_or_update(Project::Remote(fresh));
                        refreshed += 1;
                    }
                    Err(e) => {
                        eprintln!("warning: {}: {e}", remote.repo_url);
                        failed += 1;
                    }
                }
            }
            session.save()?;
            println!("Refreshed {refreshed} remote projects, {failed} failed");
        }
        Command::Stats => {
            print!("{}", render::stats(&views::stats(session.registry.projects())));
        }
        Command::Tags => {
            let groups = views::tag_groups(session.registry.projects());
            if groups.is_empty() {
                println!("No tags");
            } else {
                print!("{}", render::tag_groups(&groups));
            }
        }
        Command::Favorites => {
            let favorites = views::favorites(session.registry.projects());
            if favorites.is_empty() {
                println!("No favorites");
            }
            for project in favorites {
                println!("{}", render::project_line(project));
            }
        }
        Command::Config { .. } | Command::Export | Command::Import | Command::Migrate { .. } => {
            unreachable!("handled before the session is opened")
        }
    }
    Ok(())
}

fn configure(session: &mut Session, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Roots { cmd } => match cmd {
            RootsCommand::Add { path } => {
                let path = absolute(&path)?;
                if !session.state.add_scan_location(&path) {
                    anyhow::bail!("{} is already a scan location", path.display());
                }
                session.save()?;
                println!("Added scan location {}", path.display());
            }
            RootsCommand::Rm { path } => {
                let path = absolute(&path)?;
                if !session.state.remove_scan_location(&path) {
                    anyhow::bail!("{} is not a scan location", path.display());
                }
                session.save()?;
                println!("Removed scan location {}", path.display());
            }
        },
        ConfigCommand::AutoScan { value } => {
            session.state.auto_scan_on_startup = value == Toggle::On;
            session.save()?;
            println!("Auto-scan {}", on_off(session.state.auto_scan_on_startup));
        }
        ConfigCommand::Show => {
            println!("State:     {}", session.describe());
            println!("Auto-scan: {}", on_off(session.state.auto_scan_on_startup));
            println!("Scan locations:");
            if session.state.scan_locations.is_empty() {
                println!("  (none)");
            }
            for location in &session.state.scan_locations {
                println!("  {}", location.display());
            }
        }
    }
    Ok(())
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Name => SortKey::Name,
            SortArg::Updated => SortKey::LastUpdated,
            SortArg::Favorites => SortKey::Favorites,
        }
    }
}

fn report_merge(session: &Session, outcome: MergeOutcome) {
    let verb = match outcome {
        MergeOutcome::Inserted(_) => "Added",
        MergeOutcome::Updated(_) => "Updated",
    };
    if let Some(project) = session.registry.get(outcome.id()) {
        println!("{verb} {} ({})", project.name(), render::short_id(project));
    }
}

fn project_name(session: &Session, id: devdeck_registry::ProjectId) -> String {
    session
        .registry
        .get(id)
        .map(|p| p.name().to_string())
        .unwrap_or_else(|| id.to_string())
}

/// README for display. Lookup failures are logged and shown as absent.
async fn fetch_readme(project: &Project) -> Option<String> {
    match project {
        Project::Local(local) => local.readme.clone(),
        Project::Remote(remote) => {
            let repo = parse_repo_url(&remote.repo_url).ok()?;
            match GithubClient::from_env().fetch_readme(&repo).await {
                Ok(readme) => readme,
                Err(e) => {
                    tracing::warn!("cannot fetch README for {repo}: {e}");
                    None
                }
            }
        }
    }
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .with_context(|| format!("invalid path {}", path.display()))
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

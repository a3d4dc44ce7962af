//! Plain-text output for the terminal.

use devdeck_registry::Project;
use devdeck_registry::views::Stats;
use devdeck_scanner::ScanReport;
use std::collections::BTreeMap;
use std::fmt::Write as _;

const ID_WIDTH: usize = 8;

pub fn short_id(project: &Project) -> String {
    project.id().to_string().chars().take(ID_WIDTH).collect()
}

/// One line per project: short id, favorite marker, name, kind and tags.
pub fn project_line(project: &Project) -> String {
    let marker = if project.is_favorite() { '*' } else { ' ' };
    let kind = match project {
        Project::Remote(_) => "remote",
        Project::Local(_) => "local",
    };
    let mut line = format!("{} {marker} {}  ({kind})", short_id(project), project.name());
    if !project.tags().is_empty() {
        let _ = write!(line, "  [{}]", project.tags().join(", "));
    }
    line
}

pub fn project_details(project: &Project) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", project.name());
    let _ = writeln!(out, "  id:       {}", project.id());
    match project {
        Project::Remote(p) => {
            let _ = writeln!(out, "  owner:    {}", p.owner);
            let _ = writeln!(out, "  url:      {}", p.repo_url);
            let _ = writeln!(
                out,
                "  stars:    {}  forks: {}  watchers: {}",
                p.stars, p.forks, p.watchers
            );
            if let Some(lang) = &p.language {
                let _ = writeln!(out, "  language: {lang}");
            }
            let _ = writeln!(out, "  created:  {}", p.created_at.format("%Y-%m-%d"));
        }
        Project::Local(p) => {
            let _ = writeln!(out, "  path:     {}", p.path.display());
            if let Some(url) = &p.git_url {
                let _ = writeln!(out, "  git:      {url}");
            }
        }
    }
    let _ = writeln!(
        out,
        "  updated:  {}",
        project.last_updated().format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(out, "  favorite: {}", if project.is_favorite() { "yes" } else { "no" });
    if !project.tags().is_empty() {
        let _ = writeln!(out, "  tags:     {}", project.tags().join(", "));
    }
    if !project.summary().is_empty() {
        let _ = writeln!(out, "\n  {}", project.summary());
    }
    let shots = project.screenshots();
    if !shots.is_empty() {
        let _ = writeln!(out, "\n  screenshots:");
        for shot in shots {
            let label = shot
                .name
                .as_deref()
                .or(shot.path.as_deref())
                .unwrap_or("(unnamed)");
            let _ = writeln!(out, "    {}  {label}", shot.id);
        }
    }
    out
}

pub fn stats(stats: &Stats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Projects: {}", stats.total_projects);
    let _ = writeln!(out, "Stars:    {}", stats.total_stars);
    let _ = writeln!(out, "Forks:    {}", stats.total_forks);
    let _ = writeln!(out, "Tags:     {}", stats.unique_tags);
    if !stats.languages.is_empty() {
        let _ = writeln!(out, "Languages:");
        for (lang, count) in &stats.languages {
            let _ = writeln!(out, "  {lang}: {count}");
        }
    }
    out
}

pub fn tag_groups(groups: &BTreeMap<&str, Vec<&Project>>) -> String {
    let mut out = String::new();
    for (tag, projects) in groups {
        let _ = writeln!(out, "{tag} ({})", projects.len());
        for project in projects {
            let _ = writeln!(out, "  {}", project.name());
        }
    }
    out
}

pub fn scan_summary(verb: &str, report: &ScanReport) -> String {
    format!(
        "{verb} {} projects: {} added, {} updated, {} failed",
        report.discovered,
        report.inserted.len(),
        report.updated.len(),
        report.failures.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use devdeck_registry::LocalProject;
    use devdeck_registry::ProjectId;
    use std::path::PathBuf;

    fn local(name: &str) -> Project {
        Project::Local(LocalProject {
            id: ProjectId::new(),
            name: name.to_string(),
            path: PathBuf::from("/src").join(name),
            summary: "Does things.".to_string(),
            readme: None,
            tags: vec!["rust".to_string(), "cli".to_string()],
            is_favorite: true,
            last_updated: chrono::Utc::now(),
            git_url: None,
            screenshots: Vec::new(),
        })
    }

    #[test]
    fn line_shows_marker_and_tags() {
        let project = local("deck");
        let line = project_line(&project);
        assert!(line.starts_with(&short_id(&project)));
        assert!(line.contains("* deck  (local)  [rust, cli]"));
    }

    #[test]
    fn details_include_path_and_summary() {
        let text = project_details(&local("deck"));
        assert!(text.contains("path:     /src/deck"));
        assert!(text.contains("Does things."));
        assert!(text.contains("favorite: yes"));
    }
}

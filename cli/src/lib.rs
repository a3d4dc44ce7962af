//! `devdeck`: a terminal dashboard for local checkouts and GitHub
//! repositories.

pub mod commands;
pub mod config;
pub mod logging;
pub mod render;
pub mod session;

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "devdeck", author, version, about = "Keep track of your projects")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Import a GitHub repository by URL.
    Add { url: String },
    /// Register a single local directory.
    AddLocal { path: PathBuf },
    /// Register an existing checkout of a git URL.
    #[command(name = "clone")]
    CloneRepo { url: String, dest: PathBuf },
    /// List projects, favorites first unless `--sort` is given.
    List {
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        /// Only show projects whose name, summary or tags contain TERM.
        #[arg(long, value_name = "TERM")]
        search: Option<String>,
        /// Print the projects as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show one project.
    Show {
        id: String,
        /// Also print the README (fetched from GitHub for remote projects).
        #[arg(long)]
        readme: bool,
    },
    /// Toggle the favorite flag.
    Favorite { id: String },
    /// Add or remove a tag.
    Tag {
        #[command(subcommand)]
        cmd: TagCommand,
    },
    /// Replace the summary (description for remote projects).
    Summary { id: String, text: String },
    /// Manage screenshot references.
    Screenshot {
        #[command(subcommand)]
        cmd: ScreenshotCommand,
    },
    /// Remove a project.
    Rm { id: String },
    /// Scan the configured locations for repositories.
    Scan,
    /// Re-read every known local project.
    Rescan,
    /// Re-import every GitHub project.
    Refresh,
    /// Totals over all projects.
    Stats,
    /// Projects grouped by tag.
    Tags,
    /// Favorite projects.
    Favorites,
    /// Scan locations and startup behaviour.
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
    /// Write the stored state to stdout as JSON.
    Export,
    /// Replace the stored state with JSON read from stdin.
    Import,
    /// Copy a JSON state file into a SQLite database.
    Migrate {
        /// Path to the source JSON state file
        #[arg(long)]
        json: PathBuf,
        /// Path to the destination SQLite database file
        #[arg(long)]
        sqlite: PathBuf,
    },
}

#[derive(Debug, clap::Subcommand)]
pub enum TagCommand {
    Add { id: String, tag: String },
    Rm { id: String, tag: String },
}

#[derive(Debug, clap::Subcommand)]
pub enum ScreenshotCommand {
    /// Attach an image path to a project.
    Add {
        id: String,
        path: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Detach a screenshot. The image file is left in place.
    Rm { id: String, screenshot: String },
}

#[derive(Debug, clap::Subcommand)]
pub enum ConfigCommand {
    /// Add or remove scan locations.
    Roots {
        #[command(subcommand)]
        cmd: RootsCommand,
    },
    /// Scan the configured locations before every command.
    AutoScan {
        #[arg(value_enum)]
        value: Toggle,
    },
    /// Print the current settings.
    Show,
}

#[derive(Debug, clap::Subcommand)]
pub enum RootsCommand {
    Add { path: PathBuf },
    Rm { path: PathBuf },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortArg {
    Name,
    Updated,
    Favorites,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = config::data_dir()?;
    commands::execute(cli.cmd, &data_dir).await
}

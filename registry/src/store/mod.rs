use crate::migrate;
use crate::types::Project;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Name of the single blob holding the whole dashboard state.
pub const STATE_BLOB_NAME: &str = "devdeck-state";

/// Current layout version of [`PersistedState`].
pub const SCHEMA_VERSION: u16 = 1;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedState {
    pub schema_version: u16,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub scan_locations: Vec<PathBuf>,
    #[serde(default)]
    pub auto_scan_on_startup: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            projects: Vec::new(),
            scan_locations: Vec::new(),
            auto_scan_on_startup: false,
        }
    }
}

impl PersistedState {
    /// Returns `false` when the location is already configured.
    pub fn add_scan_location(&mut self, location: &Path) -> bool {
        if self.scan_locations.iter().any(|l| l == location) {
            return false;
        }
        self.scan_locations.push(location.to_path_buf());
        true
    }

    pub fn remove_scan_location(&mut self, location: &Path) -> bool {
        let before = self.scan_locations.len();
        self.scan_locations.retain(|l| l != location);
        self.scan_locations.len() != before
    }
}

pub trait StateStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<PersistedState>>;
    fn save(&self, state: &PersistedState) -> anyhow::Result<()>;
    /// Human readable location of the backing storage.
    fn describe(&self) -> String;

    fn export(&self, out: &mut dyn std::io::Write) -> anyhow::Result<()> {
        let state = self.load()?.unwrap_or_default();
        serde_json::to_writer_pretty(&mut *out, &state)?;
        out.write_all(b"\n")?;
        Ok(())
    }

    /// Replace the stored state with a blob read from `input`, upgrading
    /// older layouts. Returns the number of imported projects.
    fn import(&self, input: &mut dyn std::io::Read) -> anyhow::Result<usize> {
        let value: serde_json::Value = serde_json::from_reader(input)?;
        let state = migrate::upgrade_blob(value)?;
        self.save(&state)?;
        Ok(state.projects.len())
    }
}

pub mod json;
#[cfg(feature = "sqlite")]
pub mod sqlite;

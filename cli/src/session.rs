use anyhow::Context;
use devdeck_registry::PersistedState;
use devdeck_registry::Registry;
use devdeck_registry::StateStore;
use devdeck_registry::factory;
use devdeck_scanner::LocalFs;
use devdeck_scanner::ScanReport;
use devdeck_scanner::scan::scan_folders;
use std::path::Path;

/// The loaded dashboard state for one command invocation.
pub struct Session {
    store: Box<dyn StateStore>,
    /// Settings half of the blob. Its `projects` field is stale while the
    /// session is open; the registry is authoritative.
    pub state: PersistedState,
    pub registry: Registry,
}

impl Session {
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let store = factory::open_state_store(data_dir, None)?;
        let mut state = store
            .load()
            .with_context(|| format!("failed to load state from {}", store.describe()))?
            .unwrap_or_default();
        let registry = Registry::from_projects(std::mem::take(&mut state.projects));
        tracing::debug!(
            "loaded {} projects from {}",
            registry.len(),
            store.describe()
        );
        Ok(Self {
            store,
            state,
            registry,
        })
    }

    pub fn save(&mut self) -> anyhow::Result<()> {
        self.state.projects = self.registry.projects().to_vec();
        self.store
            .save(&self.state)
            .with_context(|| format!("failed to save state to {}", self.store.describe()))
    }

    pub fn describe(&self) -> String {
        self.store.describe()
    }

    /// Scan every configured root into the registry.
    pub fn scan_roots(&mut self) -> ScanReport {
        let roots = self.state.scan_locations.clone();
        scan_folders(&LocalFs, &mut self.registry, &roots)
    }
}

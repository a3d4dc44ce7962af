use crate::store::StateStore;
use crate::store::json::JsonStateStore;

#[cfg(feature = "sqlite")]
use crate::store::sqlite::SqliteStateStore;

/// Backend selection for state persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Json,
    #[cfg(feature = "sqlite")]
    Sqlite,
}

/// Choose backend using env `DEVDECK_STATE_BACKEND` if present: `sqlite` or `json`.
/// Defaults to JSON; if `sqlite` is requested but not compiled in, falls back to JSON.
pub fn choose_backend_from_env() -> Backend {
    let v = std::env::var("DEVDECK_STATE_BACKEND").unwrap_or_default();
    match v.as_str() {
        #[cfg(feature = "sqlite")]
        "sqlite" | "SQLITE" => Backend::Sqlite,
        "" | "json" | "JSON" => Backend::Json,
        other => {
            tracing::warn!("unsupported state backend `{other}`, using json");
            Backend::Json
        }
    }
}

/// Build the state store under `data_dir`.
/// Paths can be overridden via env:
/// - `DEVDECK_STATE_DB` for the SQLite file path
/// - `DEVDECK_STATE_JSON` for the JSON file path
pub fn open_state_store(
    data_dir: &std::path::Path,
    backend: Option<Backend>,
) -> anyhow::Result<Box<dyn StateStore>> {
    let be = backend.unwrap_or_else(choose_backend_from_env);
    Ok(match be {
        Backend::Json => {
            let path = std::env::var("DEVDECK_STATE_JSON")
                .map(std::path::PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("state.json"));
            Box::new(JsonStateStore::new(path))
        }
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => {
            let path = std::env::var("DEVDECK_STATE_DB")
                .map(std::path::PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("state.db"));
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            Box::new(SqliteStateStore::new(path))
        }
    })
}

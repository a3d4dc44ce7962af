use std::path::PathBuf;

/// Directory holding the persisted state.
///
/// `DEVDECK_HOME` when set, else the platform data directory, else
/// `~/.devdeck`.
pub fn data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(home) = std::env::var("DEVDECK_HOME")
        && !home.trim().is_empty()
    {
        return Ok(PathBuf::from(home));
    }
    if let Some(dir) = dirs::data_dir() {
        return Ok(dir.join("devdeck"));
    }
    dirs::home_dir()
        .map(|home| home.join(".devdeck"))
        .ok_or_else(|| anyhow::anyhow!("cannot determine a data directory; set DEVDECK_HOME"))
}

use super::*;
use chrono::Utc;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

fn init_db(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        CREATE TABLE IF NOT EXISTS blobs (
            name TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn open_conn(path: &Path) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)?;
    init_db(&conn)?;
    Ok(conn)
}

/// Stores the state blob as a named row in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteStateStore {
    path: PathBuf,
}

impl SqliteStateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl StateStore for SqliteStateStore {
    fn load(&self) -> anyhow::Result<Option<PersistedState>> {
        let conn = open_conn(&self.path)?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM blobs WHERE name=?1",
                params![STATE_BLOB_NAME],
                |row| row.get(0),
            )
            .optional()?;
        match value {
            Some(s) => {
                let value: serde_json::Value = serde_json::from_str(&s)?;
                migrate::upgrade_blob(value).map(Some)
            }
            None => Ok(None),
        }
    }

    fn save(&self, state: &PersistedState) -> anyhow::Result<()> {
        let conn = open_conn(&self.path)?;
        let value = serde_json::to_string(state)?;
        conn.execute(
            "INSERT INTO blobs (name, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                value=excluded.value,
                updated_at=excluded.updated_at",
            params![STATE_BLOB_NAME, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

//! Opening the embedded database and creating its tables.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open (creating if needed) the SQLite file at `path` and make sure both
/// tables exist.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Run the lazy migrations. Both statements are idempotent, so this runs on
/// every start. `events.venue` carries no foreign key; deleting a venue leaves
/// its events pointing at nothing.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS venues (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL CHECK (name <> ''),
            capacity INTEGER NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('indoor', 'outdoor'))
        )",
        [],
    )
    .context("failed to create venues table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL CHECK (name <> ''),
            date TEXT NOT NULL,
            venue INTEGER NOT NULL
        )",
        [],
    )
    .context("failed to create events table")?;

    Ok(())
}

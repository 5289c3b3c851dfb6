use crate::application::repositories::Document;
use crate::domain::aggregates::Page;
use rusqlite::{Connection, Result};

/// Initialize the SQLite database with the required schema.
/// This function is idempotent and can be safely called multiple times.
pub fn initialize_database(conn: &Connection) -> Result<()> {
    ensure_collection(conn, Page::COLLECTION)?;
    tracing::info!("Document store schema ready");
    Ok(())
}

/// Create the table backing a document collection if it does not exist yet.
///
/// Documents are stored whole as JSON text; `rowid` keeps insertion order.
pub fn ensure_collection(conn: &Connection, collection: &str) -> Result<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (
                id TEXT PRIMARY KEY,
                document TEXT NOT NULL CHECK (json_valid(document)),
                updated_at TEXT NOT NULL
            )",
            collection
        ),
        [],
    )?;

    Ok(())
}

// SQLite WolfStore
//
// One connection behind a Mutex; every write runs in its own transaction so
// the conflict re-check sees the same state as the failed UPDATE.

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use super::{StoreError, StoreResult, WolfStore};
use crate::validate;
use crate::wolf::{Gender, Wolf};

const WOLF_SELECT_SQL: &str = "SELECT id, name, birth_date, gender, location, version FROM wolves";

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS wolves (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            birth_date TEXT NOT NULL,
            gender INTEGER NOT NULL,
            location TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    Ok(())
}

/// Columns exactly as stored, before parsing
struct WolfRow {
    id: i64,
    name: String,
    birth_date: String,
    gender: i32,
    location: String,
    version: i64,
}

impl WolfRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(WolfRow {
            id: row.get(0)?,
            name: row.get(1)?,
            birth_date: row.get(2)?,
            gender: row.get(3)?,
            location: row.get(4)?,
            version: row.get(5)?,
        })
    }

    /// Reject rows that would not pass validation today (future dates aside)
    fn into_wolf(self) -> StoreResult<Wolf> {
        let id = self.id;
        let invalid =
            move |err: validate::ValidationError| StoreError::InvalidData(format!("wolf {id}: {err}"));

        Ok(Wolf {
            id,
            birth_date: validate::parse_birth_date(&self.birth_date).map_err(invalid)?,
            gender: Gender::from_code(self.gender)
                .ok_or_else(|| invalid(validate::ValidationError::UnknownGender(self.gender)))?,
            location: validate::check_location(&self.location).map_err(invalid)?,
            name: self.name,
            version: Some(self.version),
        })
    }
}

pub struct SqliteWolfStore {
    conn: Mutex<Connection>,
}

impl SqliteWolfStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened wolf database");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        setup_database(&conn)?;
        Ok(SqliteWolfStore {
            conn: Mutex::new(conn),
        })
    }

    pub fn count(&self) -> StoreResult<i64> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let count = conn.query_row("SELECT COUNT(*) FROM wolves", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn select_wolf(conn: &Connection, id: i64) -> StoreResult<Option<Wolf>> {
    let row = conn
        .query_row(
            &format!("{WOLF_SELECT_SQL} WHERE id = ?1"),
            params![id],
            WolfRow::from_row,
        )
        .optional()?;

    row.map(WolfRow::into_wolf).transpose()
}

impl WolfStore for SqliteWolfStore {
    fn find_by_id(&self, id: i64) -> StoreResult<Option<Wolf>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        select_wolf(&conn, id)
    }

    fn list_all(&self) -> StoreResult<Vec<Wolf>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare(&format!("{WOLF_SELECT_SQL} ORDER BY id"))?;

        let rows = stmt
            .query_map([], WolfRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(WolfRow::into_wolf).collect()
    }

    fn insert(&self, wolf: &Wolf) -> StoreResult<Wolf> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);

        conn.execute(
            "INSERT INTO wolves (name, birth_date, gender, location, version)
             VALUES (?1, ?2, ?3, ?4, 1)",
            params![
                wolf.name,
                wolf.birth_date.to_string(),
                wolf.gender.code(),
                wolf.location.to_string(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        debug!(id, "inserted wolf row");

        Ok(Wolf {
            id,
            version: Some(1),
            ..wolf.clone()
        })
    }

    fn replace(&self, id: i64, wolf: &Wolf) -> StoreResult<Wolf> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE wolves
             SET name = ?2, birth_date = ?3, gender = ?4, location = ?5, version = version + 1
             WHERE id = ?1 AND (?6 IS NULL OR version = ?6)",
            params![
                id,
                wolf.name,
                wolf.birth_date.to_string(),
                wolf.gender.code(),
                wolf.location.to_string(),
                wolf.version,
            ],
        )?;

        if changed == 0 {
            // Nothing matched: either the row is gone or its version moved
            let actual: Option<i64> = tx
                .query_row(
                    "SELECT version FROM wolves WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;

            return match (actual, wolf.version) {
                (Some(actual), Some(expected)) => Err(StoreError::Conflict {
                    id,
                    expected,
                    actual,
                }),
                _ => Err(StoreError::NotFound(id)),
            };
        }

        let stored = select_wolf(&tx, id)?.ok_or(StoreError::NotFound(id))?;
        tx.commit()?;

        Ok(stored)
    }

    fn remove(&self, id: i64) -> StoreResult<Wolf> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction()?;

        let wolf = select_wolf(&tx, id)?.ok_or(StoreError::NotFound(id))?;
        tx.execute("DELETE FROM wolves WHERE id = ?1", params![id])?;
        tx.commit()?;

        Ok(wolf)
    }
}

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use crate::core::error::StorageError;
use crate::machine::{Container, MachineState};

use super::StateStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS machine_state (
    id                 INTEGER PRIMARY KEY CHECK (id = 1),
    water_level        REAL    NOT NULL,
    water_capacity     REAL    NOT NULL,
    coffee_level       REAL    NOT NULL,
    coffee_capacity    REAL    NOT NULL,
    total_coffees_made INTEGER NOT NULL,
    last_updated       TEXT    NOT NULL
);
";

const UPSERT: &str = "
INSERT INTO machine_state
    (id, water_level, water_capacity, coffee_level, coffee_capacity, total_coffees_made, last_updated)
VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT(id) DO UPDATE SET
    water_level        = excluded.water_level,
    water_capacity     = excluded.water_capacity,
    coffee_level       = excluded.coffee_level,
    coffee_capacity    = excluded.coffee_capacity,
    total_coffees_made = excluded.total_coffees_made,
    last_updated       = excluded.last_updated
";

const SELECT: &str = "
SELECT water_level, water_capacity, coffee_level, coffee_capacity, total_coffees_made, last_updated
FROM machine_state
WHERE id = 1
";

/// Machine state kept as a single row in a SQLite database
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Opening SQLite state store at {}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    /// Store backed by a private in-memory database
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    fn kind(&self) -> &'static str {
        "sqlite"
    }

    async fn load(&self) -> Result<Option<MachineState>, StorageError> {
        let conn = self.conn.lock().await;

        let state = conn
            .query_row(SELECT, [], |row| {
                Ok(MachineState {
                    water: Container {
                        level: row.get(0)?,
                        capacity: row.get(1)?,
                    },
                    coffee: Container {
                        level: row.get(2)?,
                        capacity: row.get(3)?,
                    },
                    total_coffees_made: row.get(4)?,
                    last_updated: row.get::<_, DateTime<Utc>>(5)?,
                })
            })
            .optional()?;

        Ok(state)
    }

    async fn save(&self, state: &MachineState) -> Result<(), StorageError> {
        let conn = self.conn.lock().await;

        conn.execute(
            UPSERT,
            params![
                state.water.level,
                state.water.capacity,
                state.coffee.level,
                state.coffee.capacity,
                state.total_coffees_made,
                state.last_updated,
            ],
        )?;

        Ok(())
    }
}

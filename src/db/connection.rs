use rusqlite::Connection;
use std::cell::RefCell;

use crate::errors::{PipelineError, Result};

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

// Thread-local connection slot.
thread_local! {
    static DB_CONN: RefCell<Option<Connection>> = const { RefCell::new(None) };
}

#[derive(Clone)]
pub struct Database {
    path: String,
}

impl Database {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Provides a mutable connection to the closure, opening one lazily per
    /// thread.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        DB_CONN
            .try_with(|cell| {
                let mut slot = cell.borrow_mut();
                if slot.is_none() {
                    let conn = Connection::open(&self.path)
                        .map_err(|e| PipelineError::Db(format!("open db failed: {e}")))?;
                    *slot = Some(conn);
                }
                let conn = slot.as_mut().expect("connection slot filled above");
                f(conn)
            })
            .map_err(|e| PipelineError::Db(format!("thread-local db slot unavailable: {e}")))?
    }
}

/// Applies the bundled schema. Idempotent; runs at every startup.
pub fn init_db(db: &Database) -> Result<()> {
    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| PipelineError::Db(format!("failed to apply schema: {e}")))
    })
}

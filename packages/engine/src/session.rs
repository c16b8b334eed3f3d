//! The session API: the single entry point a caller drives, wrapping
//! the catalog, reclaimer, and SQL lowering behind one `execute` call.
//!
//! Grounded in the source's per-connection session object that owns a
//! database handle and forwards `ExecuteSQL` calls to it -- here a `Session`
//! is cheaper than a connection, since there is no network transport: it is
//! just the database name plus a shared handle to the catalog and its
//! reclaimer.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::reclaimer::Reclaimer;
use crate::sql;

pub use sql::QueryResult;

/// An open handle to one database within a shared [`Catalog`]. Cheap to
/// clone; many sessions can share one catalog and reclaimer.
pub struct Session {
    catalog: Arc<Catalog>,
    db_name: String,
    config: EngineConfig,
}

impl Session {
    /// Opens a session against `db_name` (or `"default"` if empty), creating
    /// the database if it does not already exist.
    #[must_use]
    pub fn open(catalog: Arc<Catalog>, db_name: impl Into<String>, config: EngineConfig) -> Self {
        let db_name = db_name.into();
        catalog.create_database(&db_name);
        Self { catalog, db_name, config }
    }

    /// Parses and executes a single SQL statement against this session's
    /// database.
    pub fn execute(&self, sql_text: &str) -> Result<QueryResult, EngineError> {
        let statement = sql::parse(sql_text)?;
        let result = sql::execute(&statement, &self.catalog, &self.db_name, &self.config);
        if let Err(ref e) = result {
            tracing::warn!(db = %self.db_name, error = %e, "statement failed");
        }
        result
    }
}

/// Owns the catalog and its background reclaimer; the handle callers open
/// [`Session`]s against. Dropping it aborts the reclaimer task.
pub struct Engine {
    catalog: Arc<Catalog>,
    config: EngineConfig,
    reclaimer: Reclaimer,
}

impl Engine {
    #[must_use]
    pub fn start(config: EngineConfig) -> Self {
        let reclaimer = Reclaimer::spawn(&config);
        Self {
            catalog: Arc::new(Catalog::new()),
            config,
            reclaimer,
        }
    }

    #[must_use]
    pub fn session(&self, db_name: impl Into<String>) -> Session {
        Session::open(self.catalog.clone(), db_name, self.config.clone())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.reclaimer.abort();
    }
}

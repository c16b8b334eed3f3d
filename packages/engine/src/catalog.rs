//! The catalog: the process-wide `database -> table` namespace.
//!
//! Grounded in the source's package-level `databases` map guarded by a single
//! mutex. Here the two-level namespace is a nested [`TtlMap`] (catalog
//! entries never expire -- every `set` call passes `ttl: None` -- reusing the
//! same concurrent map the rest of the engine already leans on rather than
//! introducing a second container type for one more `HashMap`). Database and
//! table creation are additionally serialized behind `write_lock`, which is
//! what makes "create if absent" atomic instead of a check-then-act race.

use std::sync::Arc;

use parking_lot::Mutex;

use minisql_core::naming::default_database_name;

use crate::error::EngineError;
use crate::table::Table;
use crate::ttl::TtlMap;

type TableMap = Arc<TtlMap<String, Arc<Table>>>;
type DatabaseMap = Arc<TtlMap<String, TableMap>>;

/// The root namespace: every database, and every table within it.
pub struct Catalog {
    databases: DatabaseMap,
    write_lock: Mutex<()>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            databases: TtlMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates an empty database named `name` (or `"default"` if `name` is
    /// empty). Idempotent: creating an already-existing database is a no-op,
    /// it does not clear its tables.
    pub fn create_database(&self, name: &str) {
        let name = default_database_name(name);
        let _guard = self.write_lock.lock();
        if self.databases.get(&name).is_none() {
            self.databases.set(name, TtlMap::new(), None);
        }
    }

    /// Creates an empty table named `table_name` within `db_name`, creating
    /// the database first if it does not yet exist. Errors if the table
    /// already exists -- there is no `CREATE TABLE IF NOT EXISTS` or `ALTER
    /// TABLE` in scope, so re-creation is always a schema conflict.
    pub fn create_table(&self, db_name: &str, table_name: &str) -> Result<Arc<Table>, EngineError> {
        let db_name = default_database_name(db_name);
        let _guard = self.write_lock.lock();

        let tables = match self.databases.get(&db_name) {
            Some(existing) => existing,
            None => {
                let created = TtlMap::new();
                self.databases.set(db_name, created.clone(), None);
                created
            }
        };

        if tables.get(&table_name.to_string()).is_some() {
            return Err(EngineError::schema(format!("table already exists: {table_name}")));
        }

        let table = Arc::new(Table::new());
        tables.set(table_name.to_string(), table.clone(), None);
        Ok(table)
    }

    /// Looks up a table by database and table name, applying the same
    /// database-name defaulting as [`Catalog::create_table`].
    #[must_use]
    pub fn get_table(&self, db_name: &str, table_name: &str) -> Option<Arc<Table>> {
        let db_name = default_database_name(db_name);
        self.databases.get(&db_name)?.get(&table_name.to_string())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

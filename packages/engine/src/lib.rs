//! minisql engine -- an in-process, in-memory mini-database: TTL-indexed
//! storage, a lazy filter/map/sort/paginate stream pipeline, and a subset of
//! SQL (`CREATE TABLE` / `INSERT` / `DELETE` / `SELECT`) lowered onto both.
//!
//! - **Config** ([`config`]): process-wide tunables for the reclaimer and pipeline
//! - **Error** ([`error`]): the engine-wide [`error::EngineError`]
//! - **TTL** ([`ttl`]): the concurrent, per-entry-expiring map/sequence primitives
//! - **Reclaimer** ([`reclaimer`]): the background sweep task
//! - **Stream** ([`stream`]): the filter/map/sort/paginate pipeline
//! - **Table** ([`table`]): row list + inverted index + query execution
//! - **Catalog** ([`catalog`]): the database/table namespace
//! - **SQL** ([`sql`]): statement parsing and lowering
//! - **Session** ([`session`]): the entry point callers drive

pub mod catalog;
pub mod config;
pub mod error;
pub mod reclaimer;
pub mod session;
pub mod sql;
pub mod stream;
pub mod table;
pub mod ttl;

pub use catalog::Catalog;
pub use config::EngineConfig;
pub use error::EngineError;
pub use session::{Engine, QueryResult, Session};

//! The table engine: a primary row list plus a secondary inverted
//! index, answering predicate+sort+paginate queries through the stream
//! pipeline.
//!
//! Grounded in the source's `DataTable`/`valueToReferenceMap`. Mutations
//! (`insert`/`delete`) are serialized per table via `write_lock`, which is
//! what lets "append a row, then post it to every field's index" stay
//! consistent under concurrent writers without fine-grained locking of the
//! row list and index separately.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ordered_float::OrderedFloat;
use parking_lot::Mutex;

use minisql_core::hash::stable_row_hash;
use minisql_core::types::{Row, Value};

use crate::config::EngineConfig;
use crate::stream::{Pipeline, SliceProvider};
use crate::ttl::{TtlMap, TtlSeq};

/// A hashable, orderable stand-in for [`Value`], used as the inverted
/// index's second-level key. `f64` alone is neither `Hash` nor (fully) `Eq`,
/// so values are wrapped through `ordered_float::OrderedFloat` the same way
/// the rest of the pack does whenever a float needs to live in a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ValueKey {
    Null,
    Bool(bool),
    Float(OrderedFloat<f64>),
    String(String),
}

impl From<&Value> for ValueKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ValueKey::Null,
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Float(f) => ValueKey::Float(OrderedFloat(*f)),
            Value::String(s) => ValueKey::String(s.clone()),
        }
    }
}

impl ValueKey {
    fn to_value(&self) -> Value {
        match self {
            ValueKey::Null => Value::Null,
            ValueKey::Bool(b) => Value::Bool(*b),
            ValueKey::Float(f) => Value::Float(f.into_inner()),
            ValueKey::String(s) => Value::String(s.clone()),
        }
    }
}

/// A row, plus the row's field values at insertion time. The inverted index
/// stores handles directly rather than re-fetching from the row list, so a
/// field lookup never has to cross back into `rows`.
#[derive(Debug, Clone)]
struct RowHandle {
    #[allow(dead_code)]
    index: u64,
    row: Row,
}

/// A boxed predicate over a row, shared across the query/delete paths.
pub type Predicate = Arc<dyn Fn(&Row) -> bool + Send + Sync>;
/// A boxed two-row comparator, used for `ORDER BY` lowering.
pub type Comparator = Arc<dyn Fn(&Row, &Row) -> Ordering + Send + Sync>;

/// One table: a TTL-indexed row list plus a two-level inverted index
/// `field -> value -> posting list of row handles`.
pub struct Table {
    rows: Arc<TtlSeq<Row>>,
    index: Arc<TtlMap<String, Arc<TtlMap<ValueKey, Arc<TtlSeq<RowHandle>>>>>>,
    write_lock: Mutex<()>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Arc::new(TtlSeq::new()),
            index: TtlMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Appends `row` to the row list, then posts a handle under every
    /// `(field, value)` pair it contains.
    pub fn insert(&self, row: Row, ttl: Option<Duration>) -> u64 {
        let _guard = self.write_lock.lock();
        let position = self.rows.append(row.clone(), ttl);

        for (field, value) in &row {
            let field_map = match self.index.get(field) {
                Some(existing) => existing,
                None => {
                    let created = TtlMap::new();
                    self.index.set(field.clone(), created.clone(), None);
                    created
                }
            };
            let value_key = ValueKey::from(value);
            let postings = match field_map.get(&value_key) {
                Some(existing) => existing,
                None => {
                    let created = Arc::new(TtlSeq::new());
                    field_map.set(value_key, created.clone(), None);
                    created
                }
            };
            postings.append(
                RowHandle {
                    index: position,
                    row: row.clone(),
                },
                ttl,
            );
        }

        position
    }

    /// Returns the row at `position` if it is still live.
    #[must_use]
    pub fn get_by_index(&self, position: u64) -> Option<Row> {
        self.rows.get(position)
    }

    /// Removes every row matching `pred` from the row list, then performs
    /// coarse index pruning: for each `(field, value)` pair, `pred` is
    /// evaluated against the synthetic single-field row `{field: value}`,
    /// and if it matches, the *entire* posting list for that value is
    /// dropped -- even the rows in that list that also have other,
    /// non-matching fields. This is a known, preserved divergence from the
    /// row<->index invariant, not a bug to silently fix here: a predicate
    /// like `id > 50` drops every `id` posting list whose value exceeds 50,
    /// but leaves those same rows' entries under their *other* fields
    /// dangling in the index.
    pub fn delete(&self, pred: &Predicate) {
        let _guard = self.write_lock.lock();
        let row_pred = pred.clone();
        self.rows.delete_all(Some(move |row: &Row| row_pred(row)));

        self.index.items(|_field, field_map| {
            let mut to_delete = Vec::new();
            field_map.items(|value_key, _postings| {
                let mut synthetic = Row::new();
                synthetic.insert(_field.clone(), value_key.to_value());
                if pred(&synthetic) {
                    to_delete.push(value_key.clone());
                }
                true
            });
            for key in to_delete {
                field_map.delete(&key);
            }
            true
        });
    }

    /// Walks the inverted index for candidate rows whose single-field
    /// synthetic projection satisfies `pred`, deduplicates them by stable
    /// content hash, then runs the deduplicated set through the stream
    /// pipeline with the given comparator/limit/offset.
    #[must_use]
    pub fn query_with_criteria(
        &self,
        pred: Predicate,
        cmp: Option<Comparator>,
        limit: Option<u64>,
        offset: Option<u64>,
        config: &EngineConfig,
    ) -> Vec<Row> {
        let mut dedup: HashMap<u64, Row> = HashMap::new();

        self.index.items(|field, field_map| {
            field_map.items(|value_key, postings| {
                let mut synthetic = Row::new();
                synthetic.insert(field.clone(), value_key.to_value());
                if pred(&synthetic) {
                    for handle in postings.get_all() {
                        let digest = stable_row_hash(&handle.row);
                        dedup.entry(digest).or_insert(handle.row);
                    }
                }
                true
            });
            true
        });

        let rows: Vec<Row> = dedup.into_values().collect();
        let mut pipeline = Pipeline::new(Arc::new(SliceProvider::new(rows)));
        if let Some(cmp) = cmp {
            pipeline = pipeline.order(move |a, b| cmp(a, b));
        }
        if let Some(limit) = limit {
            pipeline = pipeline.limit(limit);
        }
        if let Some(offset) = offset {
            pipeline = pipeline.offset(offset);
        }
        pipeline.collect(config)
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

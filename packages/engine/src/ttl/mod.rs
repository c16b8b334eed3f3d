//! The TTL-keyed associative container (`TtlMap`) and the append-only
//! TTL-indexed sequence (`TtlSeq`) built on top of it, plus the `Sweepable`
//! capability both register with the global [`crate::reclaimer::Reclaimer`].

mod map;
mod registry;
mod seq;

pub use map::{Expiry, TtlMap};
pub use registry::{registered_maps, register, Sweepable};
pub use seq::TtlSeq;

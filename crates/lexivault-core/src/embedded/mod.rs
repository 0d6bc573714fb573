//! Embedded store
//!
//! Durable local persistence, independent of any remote service. Backed by
//! SQLite; serves every operation when the primary store is unreachable and
//! tracks which locally-written records still need to be propagated.

pub mod schema;
pub mod store;

pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
pub use store::{EmbeddedStatus, EmbeddedStore, StoreState};

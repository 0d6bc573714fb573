//! Lexivault Core Library
//!
//! Dual-backend vocabulary storage: records persist to a primary remote
//! document store and transparently fall back to a local embedded store
//! when the primary is unreachable. Locally-written records are flagged
//! until a reconciliation pass mirrors them to the primary.
//!
//! # Architecture
//!
//! - **Primary store**: remote MongoDB deployment, probed lazily per
//!   operation so it can recover between requests
//! - **Embedded store**: local SQLite file, always available, tracks the
//!   `synced_to_primary` flag
//! - **Word repository**: picks the store per operation and reconciles on
//!   demand
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let embedded = EmbeddedStore::open(&config)?;
//! let primary = PrimaryStore::new(&config);
//! let repo = WordRepository::new(primary, embedded);
//!
//! let receipt = repo.upsert_word("ephemeral", "short-lived", "adjective", "").await?;
//! println!("saved via {}", receipt.storage);
//! ```
//!
//! # Modules
//!
//! - `repository`: store orchestration (main entry point)
//! - `primary`: primary store client and connection handling
//! - `embedded`: local SQLite store
//! - `models`: vocabulary record and result types
//! - `health`: aggregated status reporting
//! - `config`: application configuration
//! - `error`: repository error taxonomy

pub mod config;
pub mod embedded;
pub mod error;
pub mod health;
pub mod models;
pub mod primary;
pub mod repository;

pub use config::Config;
pub use embedded::{EmbeddedStatus, EmbeddedStore, StoreState};
pub use error::RepositoryError;
pub use health::{health_report, HealthReport, OverallStatus};
pub use models::{
    KnownWords, Provenance, ReconcileReport, UpsertOutcome, UpsertReceipt, WordList, WordRecord,
};
pub use primary::{PrimaryStore, PrimaryWords};
pub use repository::WordRepository;

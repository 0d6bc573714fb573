//! Data models for Lexivault
//!
//! Defines the vocabulary record and the result types returned by the
//! word repository. Every read or write result carries a provenance tag
//! naming the store that actually served it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vocabulary record
///
/// `word` is the unique key in both stores. Timestamps are persisted as
/// RFC 3339 text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordRecord {
    /// Store-assigned identity (SQLite rowid or Mongo ObjectId) as text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Normalized token, unique per store
    pub word: String,
    /// Free-text meaning
    #[serde(default)]
    pub meaning: String,
    /// Grammatical category (noun, verb, ...)
    #[serde(default, rename = "type")]
    pub word_type: String,
    /// Example sentence or usage context
    #[serde(default)]
    pub context: String,
    /// Set once at first insert
    pub created_at: DateTime<Utc>,
    /// Refreshed on every upsert
    pub updated_at: DateTime<Utc>,
    /// False until the record has been mirrored to the primary store
    #[serde(default)]
    pub synced_to_primary: bool,
}

impl WordRecord {
    /// Create a fresh, not-yet-persisted record
    pub fn new(
        word: impl Into<String>,
        meaning: impl Into<String>,
        word_type: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            word: word.into(),
            meaning: meaning.into(),
            word_type: word_type.into(),
            context: context.into(),
            created_at: now,
            updated_at: now,
            synced_to_primary: false,
        }
    }
}

/// Which store served a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// The remote document store
    Primary,
    /// The local fallback store
    Embedded,
    /// Neither store (failed writes only)
    None,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Primary => write!(f, "primary"),
            Provenance::Embedded => write!(f, "embedded"),
            Provenance::None => write!(f, "none"),
        }
    }
}

/// Whether an upsert inserted a new record or modified an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

impl UpsertOutcome {
    pub fn is_created(self) -> bool {
        matches!(self, UpsertOutcome::Created)
    }
}

/// Result of a successful word upsert
#[derive(Debug, Clone, Serialize)]
pub struct UpsertReceipt {
    pub record: WordRecord,
    pub outcome: UpsertOutcome,
    /// Where the write landed
    pub storage: Provenance,
}

/// All records, tagged with the store that produced them
#[derive(Debug, Clone, Serialize)]
pub struct WordList {
    pub words: Vec<WordRecord>,
    pub source: Provenance,
}

/// The set of known word keys, tagged with its source
#[derive(Debug, Clone, Serialize)]
pub struct KnownWords {
    pub words: Vec<String>,
    pub source: Provenance,
}

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    /// Records confirmed written to the primary and flagged locally
    pub synced: usize,
    /// Records that were unsynced when the pass started
    pub attempted: usize,
    pub message: String,
}

/// Parse an RFC 3339 timestamp as stored by either backend
///
/// Unparseable values fall back to the current time rather than failing
/// the whole read.
pub(crate) fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

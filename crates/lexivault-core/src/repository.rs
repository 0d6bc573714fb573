//! Word repository
//!
//! The orchestration layer: decides which store serves each operation,
//! falls back from primary to embedded, and reconciles locally-stranded
//! writes back to the primary on demand.
//!
//! Availability is computed fresh for every call. No "primary is down"
//! flag survives between operations, so a transient outage never strands
//! writes in the embedded store permanently.

use tracing::{debug, error, info, warn};

use crate::embedded::EmbeddedStore;
use crate::error::RepositoryError;
use crate::models::{
    KnownWords, Provenance, ReconcileReport, UpsertReceipt, WordList, WordRecord,
};
use crate::primary::PrimaryWords;

/// Orchestrates the primary and embedded stores
pub struct WordRepository<P> {
    primary: P,
    embedded: EmbeddedStore,
}

impl<P: PrimaryWords> WordRepository<P> {
    pub fn new(primary: P, embedded: EmbeddedStore) -> Self {
        Self { primary, embedded }
    }

    /// The primary store client, for health reporting
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// The embedded store, for health reporting
    pub fn embedded(&self) -> &EmbeddedStore {
        &self.embedded
    }

    /// The set of known word keys
    ///
    /// Primary first, embedded on any failure; worst case an empty list.
    /// Never errors.
    pub async fn lookup_known_words(&self) -> KnownWords {
        if self.primary.probe().await {
            match self.primary.known_words().await {
                Ok(words) => {
                    return KnownWords {
                        words,
                        source: Provenance::Primary,
                    }
                }
                Err(e) => {
                    warn!("primary known-word lookup failed, falling back: {:#}", e)
                }
            }
        }

        match self.embedded.known_words() {
            Ok(words) => KnownWords {
                words,
                source: Provenance::Embedded,
            },
            Err(e) => {
                error!("embedded known-word lookup failed: {:#}", e);
                KnownWords {
                    words: Vec::new(),
                    source: Provenance::Embedded,
                }
            }
        }
    }

    /// Insert or update a word
    ///
    /// The key is normalized (trimmed, lowercased) before it touches either
    /// store. With both stores down this returns a structured
    /// `AllStoresDown` error and attempts no partial write.
    pub async fn upsert_word(
        &self,
        word: &str,
        meaning: &str,
        word_type: &str,
        context: &str,
    ) -> Result<UpsertReceipt, RepositoryError> {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return Err(RepositoryError::Validation { field: "word" });
        }

        let primary_up = self.primary.probe().await;
        let embedded_status = self.embedded.check_status();

        if !primary_up && !embedded_status.is_active() {
            error!("both stores unavailable, cannot save '{}'", word);
            return Err(RepositoryError::AllStoresDown);
        }

        let record = WordRecord::new(&word, meaning, word_type, context);

        if primary_up {
            match self.primary.upsert(&record).await {
                Ok(outcome) => {
                    debug!("word '{}' written to primary store", word);
                    let mut record = record;
                    record.synced_to_primary = true;
                    return Ok(UpsertReceipt {
                        record,
                        outcome,
                        storage: Provenance::Primary,
                    });
                }
                Err(e) => {
                    warn!(
                        "primary upsert of '{}' failed, falling back to embedded: {:#}",
                        word, e
                    );
                }
            }
        }

        if !embedded_status.is_active() {
            return Err(RepositoryError::AllStoresDown);
        }

        let (record, outcome) = self.embedded.upsert(&word, meaning, word_type, context)?;
        info!("word '{}' saved to embedded store", word);
        Ok(UpsertReceipt {
            record,
            outcome,
            storage: Provenance::Embedded,
        })
    }

    /// All records, with the store that produced them
    pub async fn list_all_words(&self) -> Result<WordList, RepositoryError> {
        if self.primary.probe().await {
            match self.primary.all_words().await {
                Ok(words) => {
                    return Ok(WordList {
                        words,
                        source: Provenance::Primary,
                    })
                }
                Err(e) => warn!("primary word listing failed, falling back: {:#}", e),
            }
        }

        let words = self.embedded.list_all()?;
        Ok(WordList {
            words,
            source: Provenance::Embedded,
        })
    }

    /// Propagate unsynced embedded records to the primary store
    ///
    /// A snapshot of unsynced records is taken up front; writes landing
    /// mid-pass are picked up next time. Individual failures are logged and
    /// skipped. With the primary unavailable this is a benign no-op.
    pub async fn reconcile(&self) -> Result<ReconcileReport, RepositoryError> {
        if !self.primary.probe().await {
            info!("primary store unavailable, skipping reconciliation");
            return Ok(ReconcileReport {
                synced: 0,
                attempted: 0,
                message: "Primary store unavailable; nothing synced".to_string(),
            });
        }

        let unsynced = self.embedded.list_unsynced()?;
        if unsynced.is_empty() {
            return Ok(ReconcileReport {
                synced: 0,
                attempted: 0,
                message: "No words to synchronize".to_string(),
            });
        }

        let attempted = unsynced.len();
        let mut synced = 0;
        for record in &unsynced {
            match self.primary.upsert(record).await {
                Ok(_) => match self.embedded.mark_synced(&record.word) {
                    Ok(_) => synced += 1,
                    Err(e) => {
                        warn!("failed to flag '{}' as synced: {:#}", record.word, e)
                    }
                },
                Err(e) => {
                    warn!("failed to sync word '{}', skipping: {:#}", record.word, e)
                }
            }
        }

        info!("reconciliation synced {}/{} words", synced, attempted);
        Ok(ReconcileReport {
            synced,
            attempted,
            message: format!("Synced {} of {} words to the primary store", synced, attempted),
        })
    }
}

//! Trait definitions for external interactions
//!
//! These traits define the boundary between domain logic and infrastructure.
//! Implementations live in other crates.

use crate::error::StoreError;
use crate::source::SourceRecord;

/// Persistent document store keyed by source identifier.
///
/// This is the contract a document-store driver implements. The store must
/// provide atomic find-or-insert on first touch of a source; updates need
/// not be linearized across requests (reputation is a long-horizon
/// statistic and tolerates lost updates).
pub trait ReputationStore: Send + Sync {
    /// Return the record for `source_id`, inserting `defaults` atomically
    /// if no record exists yet.
    fn find_or_create(&self, defaults: SourceRecord) -> Result<SourceRecord, StoreError>;

    /// Read the record for a source, if present.
    fn get(&self, source_id: &str) -> Result<Option<SourceRecord>, StoreError>;

    /// Replace the stored ratings/probabilities/reputation of a source.
    fn put(&self, record: &SourceRecord) -> Result<(), StoreError>;

    /// Drop all stored records.
    fn clear(&self) -> Result<(), StoreError>;
}

//! Passer document schema
//!
//! One document per Discord user, created lazily on their first passing
//! of checkpoint 0. Passing timestamps are a mapping from checkpoint
//! ordinal to timestamp; a missing key means "not yet passed".

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for passers
pub const PASSER_COLLECTION: &str = "passers";

/// Per-user checkpoint history stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PasserDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Discord user id
    pub id: String,

    /// Checkpoint ordinal (stringified, MongoDB map key) to passing time
    #[serde(default)]
    pub checkpoints: HashMap<String, DateTime>,
}

impl PasserDoc {
    /// Create a new passer with a single checkpoint entry
    pub fn new(id: String, ordinal: u32, at: DateTime) -> Self {
        let mut checkpoints = HashMap::new();
        checkpoints.insert(ordinal.to_string(), at);

        Self {
            _id: None,
            metadata: Metadata::new(),
            id,
            checkpoints,
        }
    }

    /// Passing time for the given checkpoint ordinal, if recorded
    pub fn checkpoint_at(&self, ordinal: u32) -> Option<DateTime> {
        self.checkpoints.get(&ordinal.to_string()).copied()
    }
}

impl IntoIndexes for PasserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on the Discord user id
            (
                doc! { "id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("user_id_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for PasserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_passer_records_single_entry() {
        let at = DateTime::from_millis(1_000_000);
        let passer = PasserDoc::new("184810".to_string(), 0, at);

        assert_eq!(passer.id, "184810");
        assert_eq!(passer.checkpoint_at(0), Some(at));
        assert_eq!(passer.checkpoint_at(1), None);
    }

    #[test]
    fn test_checkpoint_lookup_by_ordinal() {
        let mut passer = PasserDoc::new("184810".to_string(), 0, DateTime::from_millis(1_000));
        passer
            .checkpoints
            .insert("3".to_string(), DateTime::from_millis(9_000));

        assert_eq!(passer.checkpoint_at(3), Some(DateTime::from_millis(9_000)));
        assert_eq!(passer.checkpoint_at(2), None);
    }
}

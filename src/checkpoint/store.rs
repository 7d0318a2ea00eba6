//! Checkpoint store
//!
//! Sole owner of the checkpoint configuration and passer collections.
//! Writes use atomic conditional updates so a recorded passing timestamp
//! is never overwritten, even by concurrent duplicate submissions.

use bson::{doc, DateTime, Document};
use tracing::debug;

use crate::db::schemas::{
    CheckpointConfigDoc, PasserDoc, CHECKPOINT_COLLECTION, PASSER_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::types::WaypointError;

/// MongoDB-backed store for checkpoint configuration and passer history
pub struct CheckpointStore {
    checkpoints: MongoCollection<CheckpointConfigDoc>,
    passers: MongoCollection<PasserDoc>,
}

impl CheckpointStore {
    /// Open both collections and apply their indexes
    pub async fn new(mongo: &MongoClient) -> Result<Self, WaypointError> {
        Ok(Self {
            checkpoints: mongo.collection(CHECKPOINT_COLLECTION).await?,
            passers: mongo.collection(PASSER_COLLECTION).await?,
        })
    }

    /// Load the configuration for one checkpoint ordinal
    ///
    /// Called once at startup; a missing document is fatal for the process.
    pub async fn load_config(&self, ordinal: u32) -> Result<CheckpointConfigDoc, WaypointError> {
        self.checkpoints
            .find_one(doc! { "id": ordinal as i64 })
            .await?
            .ok_or(WaypointError::ConfigNotFound(ordinal))
    }

    /// Fetch a passer record by Discord user id
    pub async fn get_passer(&self, id: &str) -> Result<Option<PasserDoc>, WaypointError> {
        self.passers.find_one(doc! { "id": id }).await
    }

    /// Create a passer record with a single checkpoint entry
    ///
    /// A duplicate-key violation of the unique `id` index means a
    /// concurrent request created the record first; the earlier timestamp
    /// stands and the insert is accepted as a no-op.
    pub async fn create_passer(
        &self,
        id: &str,
        ordinal: u32,
        at: DateTime,
    ) -> Result<(), WaypointError> {
        let passer = PasserDoc::new(id.to_string(), ordinal, at);

        match self.passers.insert_one(passer).await {
            Ok(_) => Ok(()),
            Err(e) => {
                let message = e.to_string();
                if message.contains("duplicate key") || message.contains("E11000") {
                    debug!("Passer {} already created concurrently", id);
                    Ok(())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Record a checkpoint passing, only if not already recorded
    ///
    /// The `$exists: false` guard makes the write conditional inside
    /// MongoDB, so two racing submissions cannot both set the timestamp.
    /// Returns whether this call performed the write.
    pub async fn record_checkpoint(
        &self,
        id: &str,
        ordinal: u32,
        at: DateTime,
    ) -> Result<bool, WaypointError> {
        let field = format!("checkpoints.{}", ordinal);

        let mut filter = doc! { "id": id };
        filter.insert(field.clone(), doc! { "$exists": false });

        let mut set = Document::new();
        set.insert(field, at);
        set.insert("metadata.updated_at", DateTime::now());

        let result = self
            .passers
            .update_one(filter, doc! { "$set": set })
            .await?;

        Ok(result.modified_count > 0)
    }
}

#[cfg(test)]
mod tests {
    // Store operations require a running MongoDB instance and are exercised
    // by integration environments; the decision logic they serve is covered
    // in super::tests.
}

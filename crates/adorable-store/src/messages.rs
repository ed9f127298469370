//! In-memory implementation of `MessageStore`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use adorable_contracts::{error::AdorableResult, record::MessageRecord, run::ProjectId};
use adorable_core::traits::MessageStore;

/// Append-only message list shared by every clone.
#[derive(Clone, Default)]
pub struct InMemoryMessageStore {
    records: Arc<Mutex<Vec<MessageRecord>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MessageRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every saved record, oldest first.
    pub fn records(&self) -> Vec<MessageRecord> {
        self.lock().clone()
    }

    /// Records of one project, oldest first.
    pub fn for_project(&self, project_id: ProjectId) -> Vec<MessageRecord> {
        self.lock()
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn save(&self, record: &MessageRecord) -> AdorableResult<()> {
        self.lock().push(record.clone());
        debug!(
            message_id = %record.id,
            project_id = %record.project_id,
            role = ?record.role,
            kind = ?record.kind,
            "message saved"
        );
        Ok(())
    }
}

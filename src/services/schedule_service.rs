use crate::models::{
    check_conflicts, ConflictReport, ScheduleSlot, ScheduleSlotDraft, ServiceError, SlotId,
    UNSAVED_SLOT_ID,
};
use crate::repositories::{SaveOutcome, ScheduleSlotRepository};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct ScheduleService {
    repository: Arc<dyn ScheduleSlotRepository>,
    // Writers to the same branch are serialized so the load-check-write in
    // the repository never races another writer from this process.
    branch_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ScheduleService {
    pub fn new(repository: Arc<dyn ScheduleSlotRepository>) -> Self {
        Self {
            repository,
            branch_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn branch_lock(&self, branch_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.branch_locks.lock().await;
        locks
            .entry(branch_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // Handles are only cloned under the map lock, so a count of one means no
    // other writer is waiting on this branch.
    async fn release_branch_lock(&self, branch_id: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        let mut locks = self.branch_locks.lock().await;
        if locks
            .get(branch_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(branch_id);
        }
    }

    /// Number of branches with a writer in flight.
    pub async fn active_branch_locks(&self) -> usize {
        self.branch_locks.lock().await.len()
    }

    pub async fn list_slots(&self, branch_id: &str) -> Result<Vec<ScheduleSlot>, ServiceError> {
        let branch_id = require_branch(branch_id)?;
        self.repository.find_by_branch(branch_id).await
    }

    pub async fn get_slot(&self, id: SlotId) -> Result<ScheduleSlot, ServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Schedule {} not found", id)))
    }

    pub async fn create_slot(
        &self,
        branch_id: &str,
        draft: ScheduleSlotDraft,
    ) -> Result<ScheduleSlot, ServiceError> {
        let branch_id = require_branch(branch_id)?;
        let lock = self.branch_lock(branch_id).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.repository.create_checked(branch_id, &draft).await
        };
        self.release_branch_lock(branch_id, lock).await;

        match outcome? {
            SaveOutcome::Saved(slot) => {
                tracing::info!(
                    branch_id = %slot.branch_id,
                    schedule_id = slot.id,
                    "Created schedule \"{}\" on {}",
                    slot.title,
                    slot.time_slot
                );
                Ok(slot)
            }
            SaveOutcome::Rejected(report) => {
                tracing::info!(
                    branch_id = %branch_id,
                    conflicts = report.len(),
                    "Rejected new schedule \"{}\" on {}",
                    draft.title,
                    draft.time_slot
                );
                Err(ServiceError::Conflict(report))
            }
        }
    }

    pub async fn update_slot(
        &self,
        id: SlotId,
        draft: ScheduleSlotDraft,
    ) -> Result<ScheduleSlot, ServiceError> {
        // The branch never changes, so the current row tells us which lock to take.
        let current = self.get_slot(id).await?;
        let lock = self.branch_lock(&current.branch_id).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.repository.update_checked(id, &draft).await
        };
        self.release_branch_lock(&current.branch_id, lock).await;

        match outcome? {
            SaveOutcome::Saved(slot) => {
                tracing::info!(
                    branch_id = %slot.branch_id,
                    schedule_id = slot.id,
                    "Updated schedule \"{}\" to {}",
                    slot.title,
                    slot.time_slot
                );
                Ok(slot)
            }
            SaveOutcome::Rejected(report) => {
                tracing::info!(
                    branch_id = %current.branch_id,
                    schedule_id = id,
                    conflicts = report.len(),
                    "Rejected schedule update to {}",
                    draft.time_slot
                );
                Err(ServiceError::Conflict(report))
            }
        }
    }

    /// Dry run of a create (or, with `exclude_id`, an update). Nothing is stored.
    pub async fn check_slot(
        &self,
        branch_id: &str,
        draft: &ScheduleSlotDraft,
        exclude_id: Option<SlotId>,
    ) -> Result<ConflictReport, ServiceError> {
        let branch_id = require_branch(branch_id)?;
        let existing = self.repository.find_by_branch(branch_id).await?;
        let proposed = draft.to_slot(exclude_id.unwrap_or(UNSAVED_SLOT_ID), branch_id, Utc::now());

        let report = check_conflicts(
            &proposed,
            existing.iter().filter(|slot| Some(slot.id) != exclude_id),
        );
        tracing::debug!(
            branch_id = %branch_id,
            conflicts = report.len(),
            "Checked proposed schedule {}",
            draft.time_slot
        );
        Ok(report)
    }

    pub async fn delete_slot(&self, id: SlotId) -> Result<String, ServiceError> {
        let slot = self.get_slot(id).await?;
        let lock = self.branch_lock(&slot.branch_id).await;
        let deleted = {
            let _guard = lock.lock().await;
            self.repository.delete(id).await
        };
        self.release_branch_lock(&slot.branch_id, lock).await;

        if !deleted? {
            return Err(ServiceError::NotFound(format!("Schedule {} not found", id)));
        }

        tracing::info!(branch_id = %slot.branch_id, schedule_id = id, "Deleted schedule");
        Ok(format!("Schedule \"{}\" deleted successfully", slot.title))
    }
}

fn require_branch(branch_id: &str) -> Result<&str, ServiceError> {
    let branch_id = branch_id.trim();
    if branch_id.is_empty() {
        return Err(ServiceError::ValidationError("Branch id is required".to_string()));
    }
    Ok(branch_id)
}

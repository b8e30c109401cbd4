use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    Child, ChildStats, CreateChildRequest, CreateRewardRequest, CreateTaskRequest, Family,
    Redemption, RedemptionStatus, Reward, Task, TaskStatus, UpdateChildRequest, UpdateTaskRequest,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::catalog::{default_family, starter_rewards, FamilySeed};
use super::commands::{ChildUpdate, Collection, FamilyCommand, TaskUpdate};
use super::errors::{FamilyError, FamilyResult, ValidationError};
use super::ledger::{PointBalance, Transition};
use super::state::FamilyState;
use crate::storage::{keys, KeyValueStorage};

const MAX_NAME_LENGTH: usize = 100;
const MAX_TITLE_LENGTH: usize = 256;

/// Owns the family state and keeps it synchronized with storage.
///
/// All mutations go through [`FamilyStore::dispatch`]: the command is applied
/// to the in-memory state first and, if it changed anything, the affected
/// collections are marked unsaved and written back. A failed write is
/// reported to the caller but the in-memory change is kept. Collections that
/// failed stay unsaved and are written again on the next dispatch (or
/// [`FamilyStore::flush`]), so a change spanning two collections is never
/// left half-written once storage recovers.
pub struct FamilyStore {
    storage: Arc<dyn KeyValueStorage>,
    state: FamilyState,
    unsaved: Vec<Collection>,
}

impl FamilyStore {
    /// Load all four collections, seeding the family profile and starter
    /// reward catalog when storage has none yet.
    pub async fn load(storage: Arc<dyn KeyValueStorage>, seed: &FamilySeed) -> FamilyResult<Self> {
        info!("Loading family data from storage");
        let now = Utc::now();

        let family = match read_json::<Family>(storage.as_ref(), keys::FAMILY_DATA).await? {
            Some(family) => family,
            None => {
                info!("No family profile found, seeding '{}'", seed.name);
                let family = default_family(seed, now);
                write_json(storage.as_ref(), keys::FAMILY_DATA, &family).await?;
                family
            }
        };

        let rewards = match read_json::<Vec<Reward>>(storage.as_ref(), keys::FAMILY_REWARDS).await? {
            Some(rewards) => rewards,
            None => {
                let rewards = starter_rewards(now);
                info!("No rewards found, seeding {} starter rewards", rewards.len());
                write_json(storage.as_ref(), keys::FAMILY_REWARDS, &rewards).await?;
                rewards
            }
        };

        let tasks = read_json::<Vec<Task>>(storage.as_ref(), keys::FAMILY_TASKS)
            .await?
            .unwrap_or_default();
        let redemptions = read_json::<Vec<Redemption>>(storage.as_ref(), keys::FAMILY_REDEMPTIONS)
            .await?
            .unwrap_or_default();

        info!(
            "Loaded family '{}': {} children, {} tasks, {} rewards, {} redemptions",
            family.name,
            family.children.len(),
            tasks.len(),
            rewards.len(),
            redemptions.len()
        );

        Ok(Self {
            storage,
            state: FamilyState::new(family, tasks, rewards, redemptions),
            unsaved: Vec::new(),
        })
    }

    pub fn state(&self) -> &FamilyState {
        &self.state
    }

    /// Collections whose in-memory state has not reached storage yet
    pub fn unsaved_collections(&self) -> &[Collection] {
        &self.unsaved
    }

    /// Apply a command and persist what it touched, along with anything
    /// still unsaved from earlier failed writes.
    pub async fn dispatch(&mut self, command: FamilyCommand) -> FamilyResult<Transition> {
        let name = command.name();
        let collections = command.affected_collections();

        let transition = match self.state.apply(command) {
            Ok(transition) => transition,
            Err(e) => {
                warn!("Command {} rejected: {}", name, e);
                return Err(e);
            }
        };

        if transition.is_applied() {
            for collection in collections {
                if !self.unsaved.contains(collection) {
                    self.unsaved.push(*collection);
                }
            }
        }

        if let Err(e) = self.flush().await {
            error!("Failed to persist {}: {}", name, e);
            return Err(e);
        }

        match transition {
            Transition::Applied => debug!("Command {} applied and persisted", name),
            Transition::Ignored => {
                warn!("Command {} ignored: entity already in requested state", name)
            }
        }

        Ok(transition)
    }

    /// Write every unsaved collection. Each one is attempted even if an
    /// earlier write fails; the first error is returned.
    pub async fn flush(&mut self) -> FamilyResult<()> {
        let mut first_error = None;
        let mut still_unsaved = Vec::new();

        for collection in std::mem::take(&mut self.unsaved) {
            if let Err(e) = self.write_collection(collection).await {
                warn!("Write of {} failed, keeping it unsaved", collection.storage_key());
                still_unsaved.push(collection);
                first_error.get_or_insert(e);
            }
        }

        self.unsaved = still_unsaved;
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn write_collection(&self, collection: Collection) -> FamilyResult<()> {
        let storage = self.storage.as_ref();
        let key = collection.storage_key();
        match collection {
            Collection::Family => write_json(storage, key, self.state.family()).await,
            Collection::Tasks => write_json(storage, key, self.state.tasks()).await,
            Collection::Rewards => write_json(storage, key, self.state.rewards()).await,
            Collection::Redemptions => write_json(storage, key, self.state.redemptions()).await,
        }
    }

    // -----------------------------------------------------------------------
    // Children
    // -----------------------------------------------------------------------

    pub async fn add_child(&mut self, request: CreateChildRequest) -> FamilyResult<Child> {
        info!("Adding child: name={}, age={}", request.name, request.age);

        let name = validate_name(&request.name)?;
        let now = Utc::now();
        let child = Child {
            id: Child::generate_id(now.timestamp_millis() as u64),
            name,
            age: request.age,
            avatar: request.avatar,
            preferences: request.preferences.unwrap_or_default(),
            stats: ChildStats::default(),
            created_at: now,
            updated_at: now,
        };

        self.dispatch(FamilyCommand::AddChild(child.clone())).await?;
        info!("Added child: {} with ID: {}", child.name, child.id);
        Ok(child)
    }

    pub async fn update_child(
        &mut self,
        child_id: &str,
        request: UpdateChildRequest,
    ) -> FamilyResult<Child> {
        info!("Updating child: {}", child_id);

        let name = request.name.as_deref().map(validate_name).transpose()?;
        let update = ChildUpdate {
            name,
            age: request.age,
            avatar: request.avatar,
            preferences: request.preferences,
        };

        self.dispatch(FamilyCommand::UpdateChild {
            child_id: child_id.to_string(),
            update,
            at: Utc::now(),
        })
        .await?;

        self.cloned_child(child_id)
    }

    pub async fn remove_child(&mut self, child_id: &str) -> FamilyResult<Transition> {
        info!("Removing child: {}", child_id);
        self.dispatch(FamilyCommand::RemoveChild {
            child_id: child_id.to_string(),
        })
        .await
    }

    pub fn child(&self, child_id: &str) -> Option<&Child> {
        self.state.child(child_id)
    }

    fn cloned_child(&self, child_id: &str) -> FamilyResult<Child> {
        self.state
            .child(child_id)
            .cloned()
            .ok_or_else(|| FamilyError::ChildNotFound(child_id.to_string()))
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub async fn add_task(&mut self, request: CreateTaskRequest) -> FamilyResult<Task> {
        info!(
            "Adding task: child_id={}, title={}, points={}",
            request.child_id, request.title, request.points
        );

        let title = validate_title(&request.title)?;
        let now = Utc::now();
        let task = Task {
            id: Task::generate_id(now.timestamp_millis() as u64),
            child_id: request.child_id,
            title,
            description: request.description,
            category: request.category,
            points: request.points,
            difficulty: request.difficulty,
            is_completed: false,
            due_date: request.due_date,
            completed_at: None,
            parent_approved: false,
            created_at: now,
            icon: request.icon,
            color: request.color,
            status: TaskStatus::New,
        };

        self.dispatch(FamilyCommand::AddTask(task.clone())).await?;
        info!("Added task: {} with ID: {}", task.title, task.id);
        Ok(task)
    }

    pub async fn update_task(&mut self, task_id: &str, request: UpdateTaskRequest) -> FamilyResult<Task> {
        info!("Updating task: {}", task_id);

        let title = request.title.as_deref().map(validate_title).transpose()?;
        let update = TaskUpdate {
            title,
            description: request.description,
            category: request.category,
            points: request.points,
            difficulty: request.difficulty,
            due_date: request.due_date,
            icon: request.icon,
            color: request.color,
        };

        self.dispatch(FamilyCommand::UpdateTask {
            task_id: task_id.to_string(),
            update,
        })
        .await?;

        self.cloned_task(task_id)
    }

    pub async fn complete_task(&mut self, task_id: &str, child_id: &str) -> FamilyResult<Transition> {
        info!("Completing task: {} by child {}", task_id, child_id);
        self.dispatch(FamilyCommand::CompleteTask {
            task_id: task_id.to_string(),
            child_id: child_id.to_string(),
            at: Utc::now(),
        })
        .await
    }

    pub async fn approve_task_completion(
        &mut self,
        task_id: &str,
        parent_id: &str,
    ) -> FamilyResult<Transition> {
        info!("Approving task completion: {} by parent {}", task_id, parent_id);
        self.dispatch(FamilyCommand::ApproveTaskCompletion {
            task_id: task_id.to_string(),
            parent_id: parent_id.to_string(),
        })
        .await
    }

    pub async fn reject_task_completion(
        &mut self,
        task_id: &str,
        parent_id: &str,
    ) -> FamilyResult<Transition> {
        info!("Rejecting task completion: {} by parent {}", task_id, parent_id);
        self.dispatch(FamilyCommand::RejectTaskCompletion {
            task_id: task_id.to_string(),
            parent_id: parent_id.to_string(),
        })
        .await
    }

    pub async fn reassign_task(&mut self, task_id: &str, child_id: &str) -> FamilyResult<Transition> {
        info!("Reassigning task: {} to child {}", task_id, child_id);
        self.dispatch(FamilyCommand::ReassignTask {
            task_id: task_id.to_string(),
            child_id: child_id.to_string(),
        })
        .await
    }

    pub async fn delete_task(&mut self, task_id: &str) -> FamilyResult<Transition> {
        info!("Deleting task: {}", task_id);
        self.dispatch(FamilyCommand::DeleteTask {
            task_id: task_id.to_string(),
        })
        .await
    }

    pub fn tasks_for_child(&self, child_id: &str) -> Vec<Task> {
        self.state
            .tasks_for_child(child_id)
            .into_iter()
            .cloned()
            .collect()
    }

    fn cloned_task(&self, task_id: &str) -> FamilyResult<Task> {
        self.state
            .task(task_id)
            .cloned()
            .ok_or_else(|| FamilyError::TaskNotFound(task_id.to_string()))
    }

    // -----------------------------------------------------------------------
    // Rewards and redemptions
    // -----------------------------------------------------------------------

    pub async fn add_reward(&mut self, request: CreateRewardRequest) -> FamilyResult<Reward> {
        info!("Adding reward: title={}, cost={}", request.title, request.points_cost);

        let title = validate_title(&request.title)?;
        let reward = Reward {
            id: Reward::generate_id(Utc::now().timestamp_millis() as u64),
            title,
            description: request.description,
            reward_type: request.reward_type,
            points_cost: request.points_cost,
            is_available: request.is_available,
            category: request.category,
            estimated_time: request.estimated_time,
        };

        self.dispatch(FamilyCommand::AddReward(reward.clone())).await?;
        info!("Added reward: {} with ID: {}", reward.title, reward.id);
        Ok(reward)
    }

    pub async fn request_redemption(
        &mut self,
        reward_id: &str,
        child_id: &str,
    ) -> FamilyResult<Redemption> {
        info!("Requesting redemption: reward {} for child {}", reward_id, child_id);

        let now = Utc::now();
        let redemption_id = Redemption::generate_id(now.timestamp_millis() as u64);
        self.dispatch(FamilyCommand::RequestRedemption {
            redemption_id: redemption_id.clone(),
            reward_id: reward_id.to_string(),
            child_id: child_id.to_string(),
            at: now,
        })
        .await?;

        let redemption = self
            .state
            .redemption(&redemption_id)
            .cloned()
            .ok_or(FamilyError::RedemptionNotFound(redemption_id))?;
        info!(
            "Redemption {} pending, {} points escrowed",
            redemption.id, redemption.points_cost
        );
        Ok(redemption)
    }

    pub async fn approve_redemption(
        &mut self,
        redemption_id: &str,
        parent_id: &str,
    ) -> FamilyResult<Transition> {
        info!("Approving redemption: {} by parent {}", redemption_id, parent_id);
        self.dispatch(FamilyCommand::ApproveRedemption {
            redemption_id: redemption_id.to_string(),
            parent_id: parent_id.to_string(),
            at: Utc::now(),
        })
        .await
    }

    pub async fn reject_redemption(
        &mut self,
        redemption_id: &str,
        parent_id: &str,
    ) -> FamilyResult<Transition> {
        info!("Rejecting redemption: {} by parent {}", redemption_id, parent_id);
        self.dispatch(FamilyCommand::RejectRedemption {
            redemption_id: redemption_id.to_string(),
            parent_id: parent_id.to_string(),
        })
        .await
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn point_balance(&self, child_id: &str) -> FamilyResult<PointBalance> {
        self.state.point_balance(child_id)
    }

    pub fn remaining_points(&self, child_id: &str) -> FamilyResult<u32> {
        self.state.remaining_points(child_id)
    }

    pub fn available_rewards(&self, child_id: &str) -> FamilyResult<Vec<Reward>> {
        Ok(self
            .state
            .available_rewards(child_id)?
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn redemption_history(
        &self,
        child_id: Option<&str>,
        status: Option<RedemptionStatus>,
    ) -> Vec<Redemption> {
        self.state
            .redemption_history(child_id, status)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn pending_approvals(&self) -> (usize, usize) {
        self.state.pending_approvals()
    }

    pub fn pending_approvals_count(&self) -> usize {
        self.state.pending_approvals_count()
    }

    /// Full snapshot as pretty-printed JSON.
    pub fn export_data(&self) -> FamilyResult<String> {
        info!("Exporting family data");
        Ok(serde_json::to_string_pretty(&self.state)?)
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    Ok(name.to_string())
}

fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(title.to_string())
}

async fn read_json<T: DeserializeOwned>(
    storage: &dyn KeyValueStorage,
    key: &str,
) -> FamilyResult<Option<T>> {
    match storage.get_value(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

async fn write_json<T: Serialize + ?Sized>(
    storage: &dyn KeyValueStorage,
    key: &str,
    value: &T,
) -> FamilyResult<()> {
    let raw = serde_json::to_string(value)?;
    storage.put_value(key, &raw).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DbConnection, MemoryStorage};
    use shared::{Difficulty, RedemptionStatus, RewardCategory, RewardType, TaskCategory};
    use tempfile::TempDir;

    async fn memory_store() -> (Arc<MemoryStorage>, FamilyStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = FamilyStore::load(storage.clone(), &FamilySeed::default())
            .await
            .unwrap();
        (storage, store)
    }

    fn child_request(name: &str) -> CreateChildRequest {
        CreateChildRequest {
            name: name.to_string(),
            age: 8,
            avatar: None,
            preferences: None,
        }
    }

    fn task_request(child_id: &str, points: u32) -> CreateTaskRequest {
        CreateTaskRequest {
            child_id: child_id.to_string(),
            title: "Feed the cat".to_string(),
            description: Some("Morning and evening".to_string()),
            category: TaskCategory::Chores,
            points,
            difficulty: Difficulty::Easy,
            due_date: None,
            icon: None,
            color: None,
        }
    }

    fn reward_request(cost: u32) -> CreateRewardRequest {
        CreateRewardRequest {
            title: "Ice cream".to_string(),
            description: "One scoop".to_string(),
            reward_type: RewardType::Experience,
            points_cost: cost,
            is_available: true,
            category: RewardCategory::Fun,
            estimated_time: None,
        }
    }

    #[tokio::test]
    async fn test_load_seeds_empty_storage_once() {
        let (storage, store) = memory_store().await;

        assert_eq!(store.state().family().name, "My Family");
        assert_eq!(store.state().rewards().len(), 6);
        assert!(store.state().tasks().is_empty());
        assert!(storage.raw(keys::FAMILY_DATA).is_some());
        assert!(storage.raw(keys::FAMILY_REWARDS).is_some());

        let family_id = store.state().family().id.clone();
        let reloaded = FamilyStore::load(storage.clone(), &FamilySeed::default())
            .await
            .unwrap();
        assert_eq!(reloaded.state().family().id, family_id);
        assert_eq!(reloaded.state().rewards().len(), 6);
    }

    #[tokio::test]
    async fn test_add_child_validates_name() {
        let (_storage, mut store) = memory_store().await;

        let err = store.add_child(child_request("   ")).await.unwrap_err();
        assert!(matches!(err, FamilyError::Validation(ValidationError::EmptyName)));

        let err = store.add_child(child_request(&"x".repeat(101))).await.unwrap_err();
        assert!(matches!(err, FamilyError::Validation(ValidationError::NameTooLong)));

        let child = store.add_child(child_request("  Ava  ")).await.unwrap();
        assert_eq!(child.name, "Ava");
        assert_eq!(child.stats.level, 1);
        assert_eq!(store.child(&child.id).unwrap().name, "Ava");
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = FamilyStore::load(storage.clone(), &FamilySeed::default())
            .await
            .unwrap();

        let child = store.add_child(child_request("Ava")).await.unwrap();
        let task = store.add_task(task_request(&child.id, 30)).await.unwrap();
        store.complete_task(&task.id, &child.id).await.unwrap();
        store.approve_task_completion(&task.id, "parent_1").await.unwrap();
        let reward = store.add_reward(reward_request(10)).await.unwrap();
        let redemption = store.request_redemption(&reward.id, &child.id).await.unwrap();

        let reloaded = FamilyStore::load(storage.clone(), &FamilySeed::default())
            .await
            .unwrap();

        assert_eq!(reloaded.state(), store.state());
        assert_eq!(reloaded.child(&child.id).unwrap().stats.total_points, 30);
        assert_eq!(reloaded.remaining_points(&child.id).unwrap(), 20);
        assert_eq!(
            reloaded.state().redemption(&redemption.id).unwrap().status,
            RedemptionStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_failed_write_keeps_in_memory_change() {
        let (storage, mut store) = memory_store().await;
        let child = store.add_child(child_request("Ava")).await.unwrap();
        let task = store.add_task(task_request(&child.id, 10)).await.unwrap();

        storage.set_fail_writes(true);
        let err = store.complete_task(&task.id, &child.id).await.unwrap_err();
        assert!(matches!(err, FamilyError::Storage(_)));
        assert!(store.state().task(&task.id).unwrap().is_completed);

        storage.set_fail_writes(false);
        let reloaded = FamilyStore::load(storage.clone(), &FamilySeed::default())
            .await
            .unwrap();
        assert!(!reloaded.state().task(&task.id).unwrap().is_completed);

        // Any later dispatch writes the unsaved tasks collection.
        store.add_task(task_request(&child.id, 5)).await.unwrap();
        let reloaded = FamilyStore::load(storage.clone(), &FamilySeed::default())
            .await
            .unwrap();
        assert!(reloaded.state().task(&task.id).unwrap().is_completed);
    }

    #[tokio::test]
    async fn test_failed_approval_is_not_half_saved_by_later_write() {
        let (storage, mut store) = memory_store().await;
        let child = store.add_child(child_request("Ava")).await.unwrap();
        let task = store.add_task(task_request(&child.id, 20)).await.unwrap();
        store.complete_task(&task.id, &child.id).await.unwrap();

        storage.set_fail_writes(true);
        let err = store
            .approve_task_completion(&task.id, "parent_1")
            .await
            .unwrap_err();
        assert!(matches!(err, FamilyError::Storage(_)));
        assert_eq!(
            store.unsaved_collections(),
            &[Collection::Tasks, Collection::Family]
        );

        // Touches only the tasks collection, but must carry the credit too.
        storage.set_fail_writes(false);
        store.add_task(task_request(&child.id, 5)).await.unwrap();
        assert!(store.unsaved_collections().is_empty());

        let reloaded = FamilyStore::load(storage.clone(), &FamilySeed::default())
            .await
            .unwrap();
        assert!(reloaded.state().task(&task.id).unwrap().parent_approved);
        assert_eq!(reloaded.child(&child.id).unwrap().stats.total_points, 20);
        assert_eq!(reloaded.remaining_points(&child.id).unwrap(), 20);
        assert_eq!(reloaded.state(), store.state());
    }

    #[tokio::test]
    async fn test_every_affected_key_is_attempted_when_one_fails() {
        let (storage, mut store) = memory_store().await;
        let child = store.add_child(child_request("Ava")).await.unwrap();
        let task = store.add_task(task_request(&child.id, 20)).await.unwrap();
        store.complete_task(&task.id, &child.id).await.unwrap();

        storage.set_failing_key(Some(keys::FAMILY_TASKS));
        store
            .approve_task_completion(&task.id, "parent_1")
            .await
            .unwrap_err();
        assert_eq!(store.unsaved_collections(), &[Collection::Tasks]);

        // The family profile (with the credit) was still written.
        let reloaded = FamilyStore::load(storage.clone(), &FamilySeed::default())
            .await
            .unwrap();
        assert_eq!(reloaded.child(&child.id).unwrap().stats.total_points, 20);

        storage.set_failing_key(None);
        store.flush().await.unwrap();
        let reloaded = FamilyStore::load(storage.clone(), &FamilySeed::default())
            .await
            .unwrap();
        assert!(reloaded.state().task(&task.id).unwrap().parent_approved);
        assert_eq!(reloaded.state(), store.state());
    }

    #[tokio::test]
    async fn test_ignored_commands_are_not_persisted() {
        let (storage, mut store) = memory_store().await;
        let child = store.add_child(child_request("Ava")).await.unwrap();
        let task = store.add_task(task_request(&child.id, 10)).await.unwrap();
        store.complete_task(&task.id, &child.id).await.unwrap();

        storage.set_fail_writes(true);
        let transition = store.complete_task(&task.id, &child.id).await.unwrap();
        assert_eq!(transition, Transition::Ignored);
    }

    #[tokio::test]
    async fn test_rejected_commands_leave_storage_untouched() {
        let (storage, mut store) = memory_store().await;
        let child = store.add_child(child_request("Ava")).await.unwrap();
        let before = storage.raw(keys::FAMILY_REDEMPTIONS);

        let reward = store.add_reward(reward_request(500)).await.unwrap();
        let err = store.request_redemption(&reward.id, &child.id).await.unwrap_err();
        assert!(matches!(err, FamilyError::InsufficientPoints { cost: 500, available: 0 }));
        assert_eq!(storage.raw(keys::FAMILY_REDEMPTIONS), before);
        assert!(store.state().redemptions().is_empty());
    }

    #[tokio::test]
    async fn test_update_task_validates_title() {
        let (_storage, mut store) = memory_store().await;
        let child = store.add_child(child_request("Ava")).await.unwrap();
        let task = store.add_task(task_request(&child.id, 10)).await.unwrap();

        let err = store
            .update_task(
                &task.id,
                UpdateTaskRequest {
                    title: Some(String::new()),
                    ..UpdateTaskRequest::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FamilyError::Validation(ValidationError::EmptyTitle)));

        let updated = store
            .update_task(
                &task.id,
                UpdateTaskRequest {
                    points: Some(15),
                    color: Some("#ff8800".to_string()),
                    ..UpdateTaskRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.points, 15);
        assert_eq!(updated.color.as_deref(), Some("#ff8800"));
        assert_eq!(updated.title, "Feed the cat");
    }

    #[tokio::test]
    async fn test_update_child_keeps_stats() {
        let (_storage, mut store) = memory_store().await;
        let child = store.add_child(child_request("Ava")).await.unwrap();

        let updated = store
            .update_child(
                &child.id,
                UpdateChildRequest {
                    age: Some(10),
                    ..UpdateChildRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.age, 10);
        assert_eq!(updated.name, "Ava");
        assert_eq!(updated.stats, child.stats);
        assert!(updated.updated_at >= child.updated_at);
    }

    #[tokio::test]
    async fn test_export_data_contains_all_collections() {
        let (_storage, mut store) = memory_store().await;
        let child = store.add_child(child_request("Ava")).await.unwrap();
        store.add_task(task_request(&child.id, 10)).await.unwrap();

        let exported = store.export_data().unwrap();
        let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
        assert_eq!(value["family"]["children"][0]["name"], "Ava");
        assert_eq!(value["tasks"][0]["points"], 10);
        assert_eq!(value["rewards"].as_array().unwrap().len(), 6);
        assert!(value["redemptions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_approvals_count() {
        let (_storage, mut store) = memory_store().await;
        let child = store.add_child(child_request("Ava")).await.unwrap();
        let task = store.add_task(task_request(&child.id, 100)).await.unwrap();
        store.complete_task(&task.id, &child.id).await.unwrap();
        let reward_id = store.state().rewards()[0].id.clone();
        store.request_redemption(&reward_id, &child.id).await.unwrap();

        assert_eq!(store.pending_approvals(), (1, 1));
        assert_eq!(store.pending_approvals_count(), 2);

        let affordable = store.available_rewards(&child.id).unwrap();
        assert!(affordable.iter().all(|r| r.points_cost <= 50));
    }

    #[tokio::test]
    async fn test_sqlite_backed_store_reloads_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", temp_dir.path().join("family.db").display());

        let child_id = {
            let storage = Arc::new(DbConnection::new(&url).await.unwrap());
            let mut store = FamilyStore::load(storage, &FamilySeed::default()).await.unwrap();
            store.add_child(child_request("Ava")).await.unwrap().id
        };

        let storage = Arc::new(DbConnection::new(&url).await.unwrap());
        let store = FamilyStore::load(storage, &FamilySeed::default()).await.unwrap();
        assert_eq!(store.child(&child_id).unwrap().name, "Ava");
    }

    #[tokio::test]
    async fn test_in_memory_sqlite_store() {
        let storage = Arc::new(DbConnection::init_test().await.unwrap());
        let mut store = FamilyStore::load(storage, &FamilySeed::default()).await.unwrap();
        let child = store.add_child(child_request("Ben")).await.unwrap();
        let task = store.add_task(task_request(&child.id, 5)).await.unwrap();
        store.complete_task(&task.id, &child.id).await.unwrap();
        store.reject_task_completion(&task.id, "parent_1").await.unwrap();

        let task = store.state().task(&task.id).unwrap();
        assert!(!task.is_completed);
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn test_validate_title_trims() {
        assert_eq!(validate_title("  Walk dog ").unwrap(), "Walk dog");
        assert_eq!(validate_title(&"t".repeat(257)), Err(ValidationError::TitleTooLong));
    }
}

//! Domain-level commands.
//!
//! Every mutation of the family state is one [`FamilyCommand`] variant. The
//! store builds commands (generating ids and timestamps), the reducer in
//! [`super::state`] applies them. The REST layer never constructs commands
//! directly; it goes through the store's named operations.

use chrono::{DateTime, Utc};
use shared::{Child, ChildPreferences, Difficulty, Reward, Task, TaskCategory};

use crate::storage::keys;

/// One of the four persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Family,
    Tasks,
    Rewards,
    Redemptions,
}

impl Collection {
    pub fn storage_key(&self) -> &'static str {
        match self {
            Collection::Family => keys::FAMILY_DATA,
            Collection::Tasks => keys::FAMILY_TASKS,
            Collection::Rewards => keys::FAMILY_REWARDS,
            Collection::Redemptions => keys::FAMILY_REDEMPTIONS,
        }
    }
}

/// Partial update of a child's profile. Stats are deliberately absent: only
/// approvals move points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildUpdate {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub avatar: Option<String>,
    pub preferences: Option<ChildPreferences>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<TaskCategory>,
    pub points: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub due_date: Option<DateTime<Utc>>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FamilyCommand {
    AddChild(Child),
    UpdateChild {
        child_id: String,
        update: ChildUpdate,
        at: DateTime<Utc>,
    },
    RemoveChild {
        child_id: String,
    },
    AddTask(Task),
    UpdateTask {
        task_id: String,
        update: TaskUpdate,
    },
    CompleteTask {
        task_id: String,
        child_id: String,
        at: DateTime<Utc>,
    },
    ApproveTaskCompletion {
        task_id: String,
        parent_id: String,
    },
    RejectTaskCompletion {
        task_id: String,
        parent_id: String,
    },
    ReassignTask {
        task_id: String,
        child_id: String,
    },
    DeleteTask {
        task_id: String,
    },
    AddReward(Reward),
    RequestRedemption {
        redemption_id: String,
        reward_id: String,
        child_id: String,
        at: DateTime<Utc>,
    },
    ApproveRedemption {
        redemption_id: String,
        parent_id: String,
        at: DateTime<Utc>,
    },
    RejectRedemption {
        redemption_id: String,
        parent_id: String,
    },
}

impl FamilyCommand {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            FamilyCommand::AddChild(_) => "add_child",
            FamilyCommand::UpdateChild { .. } => "update_child",
            FamilyCommand::RemoveChild { .. } => "remove_child",
            FamilyCommand::AddTask(_) => "add_task",
            FamilyCommand::UpdateTask { .. } => "update_task",
            FamilyCommand::CompleteTask { .. } => "complete_task",
            FamilyCommand::ApproveTaskCompletion { .. } => "approve_task_completion",
            FamilyCommand::RejectTaskCompletion { .. } => "reject_task_completion",
            FamilyCommand::ReassignTask { .. } => "reassign_task",
            FamilyCommand::DeleteTask { .. } => "delete_task",
            FamilyCommand::AddReward(_) => "add_reward",
            FamilyCommand::RequestRedemption { .. } => "request_redemption",
            FamilyCommand::ApproveRedemption { .. } => "approve_redemption",
            FamilyCommand::RejectRedemption { .. } => "reject_redemption",
        }
    }

    /// Collections that must be written back once this command is applied
    pub fn affected_collections(&self) -> &'static [Collection] {
        match self {
            FamilyCommand::AddChild(_)
            | FamilyCommand::UpdateChild { .. }
            | FamilyCommand::RemoveChild { .. } => &[Collection::Family],
            FamilyCommand::AddTask(_)
            | FamilyCommand::UpdateTask { .. }
            | FamilyCommand::CompleteTask { .. }
            | FamilyCommand::RejectTaskCompletion { .. }
            | FamilyCommand::ReassignTask { .. }
            | FamilyCommand::DeleteTask { .. } => &[Collection::Tasks],
            // Credits the child's stats as well as flagging the task
            FamilyCommand::ApproveTaskCompletion { .. } => &[Collection::Tasks, Collection::Family],
            FamilyCommand::AddReward(_) => &[Collection::Rewards],
            FamilyCommand::RequestRedemption { .. } | FamilyCommand::RejectRedemption { .. } => {
                &[Collection::Redemptions]
            }
            FamilyCommand::ApproveRedemption { .. } => &[Collection::Redemptions, Collection::Family],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approvals_touch_family_and_their_own_collection() {
        let approve_task = FamilyCommand::ApproveTaskCompletion {
            task_id: "task::1::a".to_string(),
            parent_id: "parent_1".to_string(),
        };
        assert_eq!(approve_task.affected_collections(), &[Collection::Tasks, Collection::Family]);

        let approve_redemption = FamilyCommand::ApproveRedemption {
            redemption_id: "redemption::1::a".to_string(),
            parent_id: "parent_1".to_string(),
            at: Utc::now(),
        };
        assert_eq!(
            approve_redemption.affected_collections(),
            &[Collection::Redemptions, Collection::Family]
        );
    }

    #[test]
    fn test_storage_keys() {
        assert_eq!(Collection::Family.storage_key(), "family_data");
        assert_eq!(Collection::Tasks.storage_key(), "family_tasks");
        assert_eq!(Collection::Rewards.storage_key(), "family_rewards");
        assert_eq!(Collection::Redemptions.storage_key(), "family_redemptions");
    }
}

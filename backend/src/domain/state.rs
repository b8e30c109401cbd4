//! In-memory family state and the command reducer.
//!
//! [`FamilyState::apply`] is the single entry point for mutation. Each arm
//! resolves and validates everything it needs before touching state, so a
//! command that fails leaves the state exactly as it was.

use serde::{Deserialize, Serialize};
use shared::{Child, Family, Redemption, RedemptionStatus, Reward, Task};
use tracing::{debug, warn};

use super::commands::FamilyCommand;
use super::errors::{FamilyError, FamilyResult, ValidationError};
use super::ledger::{self, PointBalance, Transition};

/// Complete snapshot of everything the store owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyState {
    family: Family,
    tasks: Vec<Task>,
    rewards: Vec<Reward>,
    redemptions: Vec<Redemption>,
}

impl FamilyState {
    pub fn new(
        family: Family,
        tasks: Vec<Task>,
        rewards: Vec<Reward>,
        redemptions: Vec<Redemption>,
    ) -> Self {
        Self {
            family,
            tasks,
            rewards,
            redemptions,
        }
    }

    pub fn family(&self) -> &Family {
        &self.family
    }

    pub fn children(&self) -> &[Child] {
        &self.family.children
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    pub fn redemptions(&self) -> &[Redemption] {
        &self.redemptions
    }

    pub fn child(&self, child_id: &str) -> Option<&Child> {
        self.family.children.iter().find(|c| c.id == child_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn reward(&self, reward_id: &str) -> Option<&Reward> {
        self.rewards.iter().find(|r| r.id == reward_id)
    }

    pub fn redemption(&self, redemption_id: &str) -> Option<&Redemption> {
        self.redemptions.iter().find(|r| r.id == redemption_id)
    }

    pub fn tasks_for_child(&self, child_id: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.child_id == child_id).collect()
    }

    /// Redemptions matching the optional child and status filters, most
    /// recently decided first. Undecided and rejected redemptions sort by
    /// their request time.
    pub fn redemption_history(
        &self,
        child_id: Option<&str>,
        status: Option<RedemptionStatus>,
    ) -> Vec<&Redemption> {
        let mut history: Vec<&Redemption> = self
            .redemptions
            .iter()
            .filter(|r| child_id.map_or(true, |id| r.child_id == id))
            .filter(|r| status.map_or(true, |s| r.status == s))
            .collect();
        history.sort_by_key(|r| std::cmp::Reverse(r.approved_at.unwrap_or(r.requested_at)));
        history
    }

    pub fn point_balance(&self, child_id: &str) -> FamilyResult<PointBalance> {
        let child = self
            .child(child_id)
            .ok_or_else(|| FamilyError::ChildNotFound(child_id.to_string()))?;
        Ok(ledger::point_balance(
            child_id,
            &child.stats,
            &self.tasks,
            &self.redemptions,
        ))
    }

    pub fn remaining_points(&self, child_id: &str) -> FamilyResult<u32> {
        Ok(self.point_balance(child_id)?.remaining())
    }

    /// Available rewards the child could request right now.
    pub fn available_rewards(&self, child_id: &str) -> FamilyResult<Vec<&Reward>> {
        let balance = self.point_balance(child_id)?;
        Ok(self
            .rewards
            .iter()
            .filter(|r| r.is_available && balance.admit(r.points_cost).is_ok())
            .collect())
    }

    /// (tasks awaiting approval, pending redemptions)
    pub fn pending_approvals(&self) -> (usize, usize) {
        ledger::pending_approvals(&self.tasks, &self.redemptions)
    }

    /// Badge count for parents: both approval queues combined
    pub fn pending_approvals_count(&self) -> usize {
        let (tasks, redemptions) = self.pending_approvals();
        tasks + redemptions
    }

    fn child_index(&self, child_id: &str) -> FamilyResult<usize> {
        self.family
            .children
            .iter()
            .position(|c| c.id == child_id)
            .ok_or_else(|| FamilyError::ChildNotFound(child_id.to_string()))
    }

    fn task_index(&self, task_id: &str) -> FamilyResult<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| FamilyError::TaskNotFound(task_id.to_string()))
    }

    fn redemption_index(&self, redemption_id: &str) -> FamilyResult<usize> {
        self.redemptions
            .iter()
            .position(|r| r.id == redemption_id)
            .ok_or_else(|| FamilyError::RedemptionNotFound(redemption_id.to_string()))
    }

    /// Apply one command.
    pub fn apply(&mut self, command: FamilyCommand) -> FamilyResult<Transition> {
        match command {
            FamilyCommand::AddChild(child) => {
                let max = self.family.settings.max_children;
                if self.family.children.len() >= max {
                    return Err(FamilyError::MaxChildrenExceeded(max));
                }
                self.family.children.push(child);
                Ok(Transition::Applied)
            }

            FamilyCommand::UpdateChild {
                child_id,
                update,
                at,
            } => {
                let index = self.child_index(&child_id)?;
                let child = &mut self.family.children[index];
                if let Some(name) = update.name {
                    child.name = name;
                }
                if let Some(age) = update.age {
                    child.age = age;
                }
                if let Some(avatar) = update.avatar {
                    child.avatar = Some(avatar);
                }
                if let Some(preferences) = update.preferences {
                    child.preferences = preferences;
                }
                child.updated_at = at;
                Ok(Transition::Applied)
            }

            FamilyCommand::RemoveChild { child_id } => {
                let index = self.child_index(&child_id)?;
                self.family.children.remove(index);

                let orphaned_tasks = self.tasks.iter().filter(|t| t.child_id == child_id).count();
                let orphaned_redemptions = self
                    .redemptions
                    .iter()
                    .filter(|r| r.child_id == child_id)
                    .count();
                if orphaned_tasks > 0 || orphaned_redemptions > 0 {
                    warn!(
                        "Removed child {} still referenced by {} tasks and {} redemptions",
                        child_id, orphaned_tasks, orphaned_redemptions
                    );
                }
                Ok(Transition::Applied)
            }

            FamilyCommand::AddTask(task) => {
                self.child_index(&task.child_id)?;
                self.tasks.push(task);
                Ok(Transition::Applied)
            }

            FamilyCommand::UpdateTask { task_id, update } => {
                let index = self.task_index(&task_id)?;
                let task = &mut self.tasks[index];
                if let Some(points) = update.points {
                    if task.parent_approved && points != task.points {
                        return Err(ValidationError::PointsOnSettledTask.into());
                    }
                    task.points = points;
                }
                if let Some(title) = update.title {
                    task.title = title;
                }
                if let Some(description) = update.description {
                    task.description = Some(description);
                }
                if let Some(category) = update.category {
                    task.category = category;
                }
                if let Some(difficulty) = update.difficulty {
                    task.difficulty = difficulty;
                }
                if let Some(due_date) = update.due_date {
                    task.due_date = Some(due_date);
                }
                if let Some(icon) = update.icon {
                    task.icon = Some(icon);
                }
                if let Some(color) = update.color {
                    task.color = Some(color);
                }
                Ok(Transition::Applied)
            }

            FamilyCommand::CompleteTask {
                task_id,
                child_id,
                at,
            } => {
                let index = self.task_index(&task_id)?;
                if self.tasks[index].child_id != child_id {
                    return Err(FamilyError::TaskNotAssigned { task_id, child_id });
                }
                Ok(ledger::complete_task(&mut self.tasks[index], at))
            }

            FamilyCommand::ApproveTaskCompletion { task_id, parent_id } => {
                let task_index = self.task_index(&task_id)?;
                if !self.tasks[task_index].is_awaiting_approval() {
                    return Ok(Transition::Ignored);
                }
                let child_index = self.child_index(&self.tasks[task_index].child_id)?;
                let transition = ledger::approve_task(
                    &mut self.tasks[task_index],
                    &mut self.family.children[child_index].stats,
                );
                debug!("Task {} approved by {}", task_id, parent_id);
                Ok(transition)
            }

            FamilyCommand::RejectTaskCompletion { task_id, parent_id } => {
                let index = self.task_index(&task_id)?;
                let transition = ledger::reject_task(&mut self.tasks[index]);
                debug!("Task {} rejected by {}", task_id, parent_id);
                Ok(transition)
            }

            FamilyCommand::ReassignTask { task_id, child_id } => {
                let index = self.task_index(&task_id)?;
                if self.tasks[index].child_id == child_id {
                    return Ok(Transition::Ignored);
                }
                self.child_index(&child_id)?;
                Ok(ledger::reassign_task(&mut self.tasks[index], &child_id))
            }

            FamilyCommand::DeleteTask { task_id } => {
                let index = self.task_index(&task_id)?;
                self.tasks.remove(index);
                Ok(Transition::Applied)
            }

            FamilyCommand::AddReward(reward) => {
                self.rewards.push(reward);
                Ok(Transition::Applied)
            }

            FamilyCommand::RequestRedemption {
                redemption_id,
                reward_id,
                child_id,
                at,
            } => {
                let reward = self
                    .reward(&reward_id)
                    .ok_or_else(|| FamilyError::RewardNotFound(reward_id.clone()))?;
                if !reward.is_available {
                    return Err(FamilyError::RewardUnavailable(reward_id));
                }
                let points_cost = reward.points_cost;

                // Balance before this request: existing escrow already counted.
                self.point_balance(&child_id)?.admit(points_cost)?;

                self.redemptions.push(Redemption {
                    id: redemption_id,
                    reward_id,
                    child_id,
                    points_cost,
                    status: RedemptionStatus::Pending,
                    requested_at: at,
                    approved_at: None,
                    approved_by: None,
                });
                Ok(Transition::Applied)
            }

            FamilyCommand::ApproveRedemption {
                redemption_id,
                parent_id,
                at,
            } => {
                let index = self.redemption_index(&redemption_id)?;
                if self.redemptions[index].status.is_terminal() {
                    return Ok(Transition::Ignored);
                }
                let child_index = self.child_index(&self.redemptions[index].child_id)?;
                Ok(ledger::approve_redemption(
                    &mut self.redemptions[index],
                    &mut self.family.children[child_index].stats,
                    &parent_id,
                    at,
                ))
            }

            FamilyCommand::RejectRedemption {
                redemption_id,
                parent_id,
            } => {
                let index = self.redemption_index(&redemption_id)?;
                let transition = ledger::reject_redemption(&mut self.redemptions[index]);
                debug!("Redemption {} rejected by {}", redemption_id, parent_id);
                Ok(transition)
            }
        }
    }
}

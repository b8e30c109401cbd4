//! Point ledger and approval state machines.
//!
//! Everything here is pure: functions take the entities they touch and never
//! perform I/O. The family state reducer is the only caller that mutates
//! through these functions, which keeps the two approval workflows (task
//! completion and reward redemption) reconciled against the same balance.
//!
//! ## Balance
//!
//! ```text
//! remaining = settled + pending credit - pending debit
//! ```
//!
//! - **settled**: `stats.total_points`, moved only by approvals
//! - **pending credit**: points of the child's completed, unapproved tasks
//! - **pending debit**: costs escrowed by the child's pending redemptions
//!
//! `remaining` is reported clamped at zero. Admission of a new redemption is
//! checked against it so that escrow can never exceed what the child holds.

use chrono::{DateTime, Utc};
use shared::{ChildStats, Redemption, RedemptionStatus, Task, TaskStatus};

use super::errors::{FamilyError, FamilyResult};

/// Whether a state-machine call changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// No-op guard hit, e.g. approving an already-approved task
    Ignored,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Point breakdown for one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointBalance {
    pub settled: u32,
    pub pending_credit: u32,
    pub pending_debit: u32,
}

impl PointBalance {
    /// Unclamped balance; negative only if state has been desynchronized
    /// (e.g. a completed task deleted while its credit backed a request).
    pub fn raw_remaining(&self) -> i64 {
        i64::from(self.settled) + i64::from(self.pending_credit) - i64::from(self.pending_debit)
    }

    /// Spendable points as shown to callers, never below zero
    pub fn remaining(&self) -> u32 {
        u32::try_from(self.raw_remaining().max(0)).unwrap_or(u32::MAX)
    }

    /// Admission check for a new redemption costing `cost`.
    pub fn admit(&self, cost: u32) -> FamilyResult<()> {
        if i64::from(cost) > self.raw_remaining() {
            return Err(FamilyError::InsufficientPoints {
                cost,
                available: self.remaining(),
            });
        }
        Ok(())
    }
}

/// Points of `child_id`'s tasks that are completed but not yet approved.
pub fn pending_credit(child_id: &str, tasks: &[Task]) -> u32 {
    tasks
        .iter()
        .filter(|t| t.child_id == child_id && t.is_awaiting_approval())
        .fold(0u32, |sum, t| sum.saturating_add(t.points))
}

/// Costs escrowed by `child_id`'s pending redemptions.
pub fn pending_debit(child_id: &str, redemptions: &[Redemption]) -> u32 {
    redemptions
        .iter()
        .filter(|r| r.child_id == child_id && r.status == RedemptionStatus::Pending)
        .fold(0u32, |sum, r| sum.saturating_add(r.points_cost))
}

pub fn point_balance(
    child_id: &str,
    stats: &ChildStats,
    tasks: &[Task],
    redemptions: &[Redemption],
) -> PointBalance {
    PointBalance {
        settled: stats.total_points,
        pending_credit: pending_credit(child_id, tasks),
        pending_debit: pending_debit(child_id, redemptions),
    }
}

/// Completed-but-unapproved tasks plus pending redemptions, across the family.
pub fn pending_approvals(tasks: &[Task], redemptions: &[Redemption]) -> (usize, usize) {
    let tasks = tasks.iter().filter(|t| t.is_awaiting_approval()).count();
    let redemptions = redemptions
        .iter()
        .filter(|r| r.status == RedemptionStatus::Pending)
        .count();
    (tasks, redemptions)
}

// ---------------------------------------------------------------------------
// Task lifecycle: created -> completed -> approved | rejected (back to created)
// ---------------------------------------------------------------------------

pub fn complete_task(task: &mut Task, at: DateTime<Utc>) -> Transition {
    if task.is_completed {
        return Transition::Ignored;
    }

    task.is_completed = true;
    task.parent_approved = false;
    task.completed_at = Some(at);
    task.status = TaskStatus::Done;
    Transition::Applied
}

/// Ratify a completion and credit the child's settled balance.
///
/// This is the only place task points enter `total_points`; the approval
/// flag guards against crediting twice.
pub fn approve_task(task: &mut Task, stats: &mut ChildStats) -> Transition {
    if task.parent_approved || !task.is_completed {
        return Transition::Ignored;
    }

    task.parent_approved = true;
    stats.total_points = stats.total_points.saturating_add(task.points);
    stats.completed_tasks = stats.completed_tasks.saturating_add(1);
    stats.current_streak = stats.current_streak.saturating_add(1);
    stats.longest_streak = stats.longest_streak.max(stats.current_streak);
    Transition::Applied
}

/// Send a completion back to the child. Approved tasks are final.
pub fn reject_task(task: &mut Task) -> Transition {
    if task.parent_approved || !task.is_completed {
        return Transition::Ignored;
    }

    task.is_completed = false;
    task.completed_at = None;
    task.status = TaskStatus::InProgress;
    Transition::Applied
}

/// Move a task to another child, restarting its lifecycle.
///
/// Points already credited to the previous assignee stay where they are.
pub fn reassign_task(task: &mut Task, child_id: &str) -> Transition {
    if task.child_id == child_id {
        return Transition::Ignored;
    }

    task.child_id = child_id.to_string();
    task.is_completed = false;
    task.parent_approved = false;
    task.completed_at = None;
    task.status = TaskStatus::New;
    Transition::Applied
}

// ---------------------------------------------------------------------------
// Redemption lifecycle: pending -> approved | rejected
// ---------------------------------------------------------------------------

/// Settle a pending redemption against the child's balance.
pub fn approve_redemption(
    redemption: &mut Redemption,
    stats: &mut ChildStats,
    parent_id: &str,
    at: DateTime<Utc>,
) -> Transition {
    if redemption.status.is_terminal() {
        return Transition::Ignored;
    }

    // Clamp: settled points never go negative even if escrow got out of sync.
    stats.total_points = stats.total_points.saturating_sub(redemption.points_cost);
    redemption.status = RedemptionStatus::Approved;
    redemption.approved_at = Some(at);
    redemption.approved_by = Some(parent_id.to_string());
    Transition::Applied
}

/// Decline a pending redemption; its escrow is released implicitly.
pub fn reject_redemption(redemption: &mut Redemption) -> Transition {
    if redemption.status.is_terminal() {
        return Transition::Ignored;
    }

    redemption.status = RedemptionStatus::Rejected;
    Transition::Applied
}

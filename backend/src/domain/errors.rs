//! Error types surfaced by the family store.

#[derive(Debug, thiserror::Error)]
pub enum FamilyError {
    #[error("Insufficient points: reward costs {cost} but only {available} available")]
    InsufficientPoints { cost: u32, available: u32 },
    #[error("Maximum {0} children allowed")]
    MaxChildrenExceeded(usize),
    #[error("Child not found: {0}")]
    ChildNotFound(String),
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    #[error("Reward not found: {0}")]
    RewardNotFound(String),
    #[error("Redemption not found: {0}")]
    RedemptionNotFound(String),
    #[error("Reward is not available: {0}")]
    RewardUnavailable(String),
    #[error("Task {task_id} is not assigned to child {child_id}")]
    TaskNotAssigned { task_id: String, child_id: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to serialize family data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl FamilyError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FamilyError::ChildNotFound(_)
                | FamilyError::TaskNotFound(_)
                | FamilyError::RewardNotFound(_)
                | FamilyError::RedemptionNotFound(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Child name cannot be empty")]
    EmptyName,
    #[error("Child name cannot exceed 100 characters")]
    NameTooLong,
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Title cannot exceed 256 characters")]
    TitleTooLong,
    #[error("Points cannot change once a parent has approved the task")]
    PointsOnSettledTask,
}

pub type FamilyResult<T> = Result<T, FamilyError>;

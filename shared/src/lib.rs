use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Family
// ---------------------------------------------------------------------------

/// A household: its children, the parents managing it and family-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: String,
    pub name: String,
    pub children: Vec<Child>,
    #[serde(default)]
    pub parents: Vec<Parent>,
    pub settings: FamilySettings,
    #[serde(default)]
    pub subscription: SubscriptionTier,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilySettings {
    pub timezone: String,
    pub language: String,
    pub ai_enabled: bool,
    pub calendar_integration: bool,
    pub classroom_mode: bool,
    /// 3-10 for families, 100+ for classrooms
    pub max_children: usize,
}

impl Default for FamilySettings {
    fn default() -> Self {
        Self {
            timezone: "America/New_York".to_string(),
            language: "en".to_string(),
            ai_enabled: false,
            calendar_integration: false,
            classroom_mode: false,
            max_children: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Family,
    Classroom,
    Enterprise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: ParentRole,
    pub permissions: ParentPermissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentRole {
    Primary,
    Secondary,
    Caregiver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentPermissions {
    pub can_add_child: bool,
    pub can_remove_child: bool,
    pub can_manage_tasks: bool,
    pub can_manage_rewards: bool,
    #[serde(rename = "canViewAI")]
    pub can_view_ai: bool,
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

/// Child ID in format: "child::<epoch_millis>::<suffix>"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: String,
    pub name: String,
    /// 6-12 years
    pub age: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub preferences: ChildPreferences,
    #[serde(default)]
    pub stats: ChildStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildPreferences {
    pub favorite_colors: Vec<String>,
    pub preferred_rewards: Vec<RewardType>,
    pub difficulty_level: Difficulty,
    pub ai_voice_enabled: bool,
    pub ui_theme: UiTheme,
}

impl Default for ChildPreferences {
    fn default() -> Self {
        Self {
            favorite_colors: Vec::new(),
            preferred_rewards: Vec::new(),
            difficulty_level: Difficulty::Easy,
            ai_voice_enabled: false,
            ui_theme: UiTheme::Animals,
        }
    }
}

/// Progress counters for a child.
///
/// `total_points` is the settled balance: it only moves when a parent approves
/// a task completion (credit) or a redemption (debit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildStats {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_points: u32,
    pub level: u32,
    pub badges: Vec<Badge>,
}

impl Default for ChildStats {
    fn default() -> Self {
        Self {
            total_tasks: 0,
            completed_tasks: 0,
            current_streak: 0,
            longest_streak: 0,
            total_points: 0,
            level: 1,
            badges: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub obtained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiTheme {
    Animals,
    Space,
    Nature,
    Sports,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// A chore or activity assigned to one child.
///
/// `parent_approved` may only be true while `is_completed` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub child_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: TaskCategory,
    pub points: u32,
    pub difficulty: Difficulty,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub parent_approved: bool,
    pub created_at: DateTime<Utc>,
    /// Emoji or icon name for visual cue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub status: TaskStatus,
}

impl Task {
    /// Completed by the child but not yet ratified by a parent.
    pub fn is_awaiting_approval(&self) -> bool {
        self.is_completed && !self.parent_approved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Chores,
    Homework,
    Behavior,
    Selfcare,
    Social,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    New,
    InProgress,
    Done,
}

// ---------------------------------------------------------------------------
// Rewards and redemptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub reward_type: RewardType,
    pub points_cost: u32,
    pub is_available: bool,
    pub category: RewardCategory,
    /// Minutes, for experience rewards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    Virtual,
    Experience,
    Privilege,
    Activity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardCategory {
    Fun,
    Educational,
    Physical,
    Social,
    Creative,
}

/// A child's request to spend points on a reward.
///
/// `points_cost` is captured from the reward when the request is made and is
/// never re-read from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: String,
    pub reward_id: String,
    pub child_id: String,
    pub points_cost: u32,
    pub status: RedemptionStatus,
    pub requested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    /// Parent ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    Pending,
    Approved,
    Rejected,
}

impl RedemptionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RedemptionStatus::Pending)
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Entity ID in format: "<kind>::<epoch_millis>::<suffix>"
///
/// The suffix is the first 8 hex characters of a v4 UUID so that entities
/// created within the same millisecond stay distinct.
fn generate_entity_id(kind: &str, epoch_millis: u64) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}::{}::{}", kind, epoch_millis, &suffix[..8])
}

fn parse_entity_id(kind: &str, id: &str) -> Result<u64, EntityIdError> {
    let parts: Vec<&str> = id.split("::").collect();
    if parts.len() != 3 || parts[0] != kind || parts[2].is_empty() {
        return Err(EntityIdError::InvalidFormat);
    }

    parts[1].parse::<u64>().map_err(|_| EntityIdError::InvalidTimestamp)
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for EntityIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityIdError::InvalidFormat => write!(f, "Invalid entity ID format"),
            EntityIdError::InvalidTimestamp => write!(f, "Invalid timestamp in entity ID"),
        }
    }
}

impl std::error::Error for EntityIdError {}

impl Family {
    pub fn generate_id(epoch_millis: u64) -> String {
        generate_entity_id("family", epoch_millis)
    }
}

impl Child {
    /// Generate a child ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        generate_entity_id("child", epoch_millis)
    }

    /// Parse a child ID to extract the timestamp
    pub fn parse_id(id: &str) -> Result<u64, EntityIdError> {
        parse_entity_id("child", id)
    }
}

impl Task {
    pub fn generate_id(epoch_millis: u64) -> String {
        generate_entity_id("task", epoch_millis)
    }

    pub fn parse_id(id: &str) -> Result<u64, EntityIdError> {
        parse_entity_id("task", id)
    }
}

impl Reward {
    pub fn generate_id(epoch_millis: u64) -> String {
        generate_entity_id("reward", epoch_millis)
    }
}

impl Redemption {
    pub fn generate_id(epoch_millis: u64) -> String {
        generate_entity_id("redemption", epoch_millis)
    }
}

// ---------------------------------------------------------------------------
// Request / response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChildRequest {
    pub name: String,
    pub age: u8,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub preferences: Option<ChildPreferences>,
}

/// Partial update; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChildRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub preferences: Option<ChildPreferences>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub child_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: TaskCategory,
    pub points: u32,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<TaskCategory>,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Body for completing or reassigning a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildActionRequest {
    pub child_id: String,
}

/// Body for a parent approving or rejecting a task completion or redemption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentDecisionRequest {
    pub parent_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRewardRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub reward_type: RewardType,
    pub points_cost: u32,
    #[serde(default = "default_true")]
    pub is_available: bool,
    pub category: RewardCategory,
    #[serde(default)]
    pub estimated_time: Option<u32>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRequest {
    pub reward_id: String,
    pub child_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildResponse {
    pub child: Child,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildListResponse {
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub task: Task,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardResponse {
    pub reward: Reward,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardListResponse {
    pub rewards: Vec<Reward>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionResponse {
    pub redemption: Redemption,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionListResponse {
    pub redemptions: Vec<Redemption>,
}

/// Result of an operation that may be a no-op (e.g. approving twice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    /// False when the call was ignored because the entity was already in
    /// the requested (or a terminal) state.
    pub applied: bool,
    pub success_message: String,
}

/// Breakdown of a child's points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub child_id: String,
    /// Parent-approved points (`stats.totalPoints`)
    pub settled_points: u32,
    /// Completed tasks awaiting approval
    pub pending_credit: u32,
    /// Costs escrowed by pending redemptions
    pub pending_debit: u32,
    /// What the child may still spend, never below zero
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingApprovalsResponse {
    pub pending_tasks: usize,
    pub pending_redemptions: usize,
    pub total: usize,
}

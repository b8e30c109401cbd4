//! Storage keys for the four persisted collections.

pub const FAMILY_DATA: &str = "family_data";
pub const FAMILY_TASKS: &str = "family_tasks";
pub const FAMILY_REWARDS: &str = "family_rewards";
pub const FAMILY_REDEMPTIONS: &str = "family_redemptions";

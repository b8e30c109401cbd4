//! Seed data written the first time a store is loaded against empty storage.

use chrono::{DateTime, Utc};
use shared::{Family, FamilySettings, Reward, RewardCategory, RewardType, SubscriptionTier};

/// Values used when no family profile has been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilySeed {
    pub name: String,
    pub timezone: String,
    pub max_children: usize,
}

impl Default for FamilySeed {
    fn default() -> Self {
        let settings = FamilySettings::default();
        Self {
            name: "My Family".to_string(),
            timezone: settings.timezone,
            max_children: settings.max_children,
        }
    }
}

pub fn default_family(seed: &FamilySeed, now: DateTime<Utc>) -> Family {
    Family {
        id: Family::generate_id(now.timestamp_millis() as u64),
        name: seed.name.clone(),
        children: Vec::new(),
        parents: Vec::new(),
        settings: FamilySettings {
            timezone: seed.timezone.clone(),
            max_children: seed.max_children,
            ..FamilySettings::default()
        },
        subscription: SubscriptionTier::Free,
        created_at: now,
    }
}

/// The fixed starter catalog offered before parents add their own rewards.
pub fn starter_rewards(now: DateTime<Utc>) -> Vec<Reward> {
    let millis = now.timestamp_millis() as u64;
    let reward = |title: &str,
                  description: &str,
                  reward_type: RewardType,
                  points_cost: u32,
                  category: RewardCategory,
                  estimated_time: Option<u32>| Reward {
        id: Reward::generate_id(millis),
        title: title.to_string(),
        description: description.to_string(),
        reward_type,
        points_cost,
        is_available: true,
        category,
        estimated_time,
    };

    vec![
        reward(
            "Extra Screen Time",
            "30 minutes of extra device time",
            RewardType::Privilege,
            50,
            RewardCategory::Fun,
            None,
        ),
        reward(
            "Choose Dinner",
            "Pick what the family eats tonight",
            RewardType::Privilege,
            75,
            RewardCategory::Fun,
            None,
        ),
        reward(
            "Movie Night",
            "Watch a movie of your choice",
            RewardType::Experience,
            100,
            RewardCategory::Fun,
            Some(120),
        ),
        reward(
            "New Book",
            "Get a new book from the bookstore",
            RewardType::Virtual,
            150,
            RewardCategory::Educational,
            None,
        ),
        reward(
            "Park Visit",
            "Family trip to the playground",
            RewardType::Experience,
            80,
            RewardCategory::Physical,
            Some(90),
        ),
        reward(
            "Art Supplies",
            "New drawing or craft materials",
            RewardType::Virtual,
            120,
            RewardCategory::Creative,
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_family_uses_seed() {
        let seed = FamilySeed {
            name: "The Smiths".to_string(),
            timezone: "Europe/London".to_string(),
            max_children: 3,
        };
        let family = default_family(&seed, Utc::now());

        assert_eq!(family.name, "The Smiths");
        assert_eq!(family.settings.timezone, "Europe/London");
        assert_eq!(family.settings.max_children, 3);
        assert_eq!(family.settings.language, "en");
        assert!(family.children.is_empty());
        assert_eq!(family.subscription, SubscriptionTier::Free);
    }

    #[test]
    fn test_starter_catalog() {
        let rewards = starter_rewards(Utc::now());
        assert_eq!(rewards.len(), 6);
        assert!(rewards.iter().all(|r| r.is_available));

        let costs: Vec<u32> = rewards.iter().map(|r| r.points_cost).collect();
        assert_eq!(costs, vec![50, 75, 100, 150, 80, 120]);

        let mut ids: Vec<&str> = rewards.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }
}

use crate::models::PlaceId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RewardCategory {
    Discount,
    Experience,
    Food,
    Souvenir,
}

impl fmt::Display for RewardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RewardCategory::Discount => "discount",
            RewardCategory::Experience => "experience",
            RewardCategory::Food => "food",
            RewardCategory::Souvenir => "souvenir",
        };
        write!(f, "{}", s)
    }
}

/// Partner offer that can be bought with coins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub name: String,
    pub description: String,
    pub coin_cost: i64,
    pub category: RewardCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    pub valid_until: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    #[default]
    Active,
    Used,
    Expired,
}

/// Record of coins spent on a reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: String,
    pub user_id: String,
    pub reward_id: String,
    pub cost: i64,
    pub reward_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    pub redeemed_at: String,
    #[serde(default)]
    pub status: RedemptionStatus,
    pub qr_code_data: String,
}

impl Redemption {
    pub fn qr_payload(id: &str, user_id: &str, reward_id: &str) -> String {
        format!("REDEEM:{}:{}:{}", id, user_id, reward_id)
    }
}

/// User review of a place, with the uploaded photo's URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: String,
    pub place_id: PlaceId,
    pub text: String,
    pub photo_url: String,
    pub user_name: String,
    #[serde(default)]
    pub user_photo: Option<String>,
    pub created_at: String,
}

use crate::constants::{REDEMPTIONS_COLLECTION, TOTAL_COINS_FIELD, USERS_COLLECTION};
use crate::error::{AppError, Result};
use crate::models::{PlaceId, Redemption, RedemptionStatus, Reward, UserProfile};
use crate::store::records::parse_user;
use crate::store::{Credit, Debit, DocumentStore};
use serde_json::{json, Value};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

/// Profiles, coin balances, liked places and redemptions
pub struct UserService {
    store: Arc<dyn DocumentStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        UserService { store }
    }

    /// Create the profile on first sign-in, otherwise refresh the display
    /// attributes and leave coins and liked places untouched
    pub async fn sync_user(
        &self,
        user_id: &str,
        display_name: &str,
        picture_url: Option<String>,
    ) -> Result<UserProfile> {
        if user_id.trim().is_empty() {
            return Err(AppError::InvalidRequest("userId must not be empty".to_string()));
        }

        match self.store.get(USERS_COLLECTION, user_id).await? {
            Some(_) => {
                self.store
                    .update(
                        USERS_COLLECTION,
                        user_id,
                        json!({ "displayName": display_name, "pictureUrl": picture_url }),
                    )
                    .await?;
                tracing::debug!("Updated profile for user {}", user_id);
            }
            None => {
                let mut profile = UserProfile::new(user_id, display_name);
                profile.picture_url = picture_url;
                self.store
                    .set(USERS_COLLECTION, user_id, serde_json::to_value(&profile)?)
                    .await?;
                tracing::info!("Created profile for user {}", user_id);
            }
        }

        self.get_user(user_id).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserProfile> {
        let document = self
            .store
            .get(USERS_COLLECTION, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", user_id)))?;
        parse_user(document)
    }

    pub async fn coins(&self, user_id: &str) -> Result<i64> {
        Ok(self.get_user(user_id).await?.total_coins)
    }

    /// Atomically credit (or, with a negative amount, debit) coins.
    /// Returns the new balance.
    pub async fn add_coins(&self, user_id: &str, amount: i64) -> Result<i64> {
        let balance = self
            .store
            .increment(USERS_COLLECTION, user_id, TOTAL_COINS_FIELD, amount)
            .await?;
        tracing::info!("User {} {:+} coins, balance {}", user_id, amount, balance);
        Ok(balance)
    }

    /// Write a record and credit coins for it in one step, so a failed
    /// credit never leaves the record behind. Returns the new balance.
    pub async fn credit_and_record(
        &self,
        user_id: &str,
        amount: i64,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<i64> {
        let credit = Credit {
            collection: USERS_COLLECTION.to_string(),
            id: user_id.to_string(),
            field: TOTAL_COINS_FIELD.to_string(),
            amount,
        };
        let balance = self.store.credit_and_put(credit, collection, id, document).await?;
        tracing::info!(
            "User {} {:+} coins for {}/{}, balance {}",
            user_id,
            amount,
            collection,
            id,
            balance
        );
        Ok(balance)
    }

    pub async fn liked_places(&self, user_id: &str) -> Result<Vec<PlaceId>> {
        Ok(self.get_user(user_id).await?.liked_places)
    }

    /// Returns false when the place was already liked
    pub async fn like(&self, user_id: &str, place_id: PlaceId) -> Result<bool> {
        let mut profile = self.get_user(user_id).await?;
        if !profile.like(place_id) {
            return Ok(false);
        }
        self.save_liked(&profile).await?;
        Ok(true)
    }

    pub async fn unlike(&self, user_id: &str, place_id: &PlaceId) -> Result<bool> {
        let mut profile = self.get_user(user_id).await?;
        if !profile.unlike(place_id) {
            return Ok(false);
        }
        self.save_liked(&profile).await?;
        Ok(true)
    }

    pub async fn set_liked(&self, user_id: &str, place_ids: Vec<PlaceId>) -> Result<Vec<PlaceId>> {
        let mut profile = self.get_user(user_id).await?;
        profile.set_liked(place_ids);
        self.save_liked(&profile).await?;
        Ok(profile.liked_places)
    }

    pub async fn clear_liked(&self, user_id: &str) -> Result<()> {
        self.set_liked(user_id, Vec::new()).await.map(|_| ())
    }

    async fn save_liked(&self, profile: &UserProfile) -> Result<()> {
        self.store
            .update(
                USERS_COLLECTION,
                &profile.user_id,
                json!({ "likedPlaces": profile.liked_places }),
            )
            .await
    }

    pub async fn mark_shortcut_added(&self, user_id: &str) -> Result<()> {
        self.store
            .update(USERS_COLLECTION, user_id, json!({ "hasAddedShortcut": true }))
            .await
    }

    /// Spend coins on `reward`.
    ///
    /// The balance check, the debit and the redemption record happen as one
    /// atomic store operation, so a failed redemption leaves no trace.
    pub async fn redeem_reward(&self, user_id: &str, reward: &Reward) -> Result<Redemption> {
        let id = Uuid::new_v4().to_string();
        let redemption = Redemption {
            qr_code_data: Redemption::qr_payload(&id, user_id, &reward.id),
            id,
            user_id: user_id.to_string(),
            reward_id: reward.id.clone(),
            cost: reward.coin_cost,
            reward_name: reward.name.clone(),
            discount_code: reward.discount_code.clone(),
            redeemed_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_else(|_| "unknown".to_string()),
            status: RedemptionStatus::Active,
        };

        let debit = Debit {
            collection: USERS_COLLECTION.to_string(),
            id: user_id.to_string(),
            field: TOTAL_COINS_FIELD.to_string(),
            amount: reward.coin_cost,
        };

        let remaining = self
            .store
            .debit_and_put(
                debit,
                REDEMPTIONS_COLLECTION,
                &redemption.id,
                serde_json::to_value(&redemption)?,
            )
            .await?;

        tracing::info!(
            "User {} redeemed '{}' for {} coins, {} left",
            user_id,
            reward.name,
            reward.coin_cost,
            remaining
        );
        Ok(redemption)
    }

    /// Newest first
    pub async fn redemptions(&self, user_id: &str) -> Result<Vec<Redemption>> {
        let documents = self
            .store
            .query(REDEMPTIONS_COLLECTION, "userId", &Value::from(user_id))
            .await?;

        let mut redemptions = documents
            .into_iter()
            .map(|doc| {
                serde_json::from_value::<Redemption>(doc)
                    .map_err(|e| AppError::Store(format!("Malformed redemption document: {}", e)))
            })
            .collect::<Result<Vec<_>>>()?;
        redemptions.sort_by(|a, b| b.redeemed_at.cmp(&a.redeemed_at));
        Ok(redemptions)
    }
}

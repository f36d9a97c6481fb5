use crate::config::CoinRules;
use crate::constants::REVIEWS_COLLECTION;
use crate::error::{AppError, Result};
use crate::models::{PlaceId, Review};
use crate::services::catalog::CatalogService;
use crate::services::user_service::UserService;
use crate::store::DocumentStore;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

/// Review submission as received from the client. The photo itself is
/// uploaded elsewhere; only its URL is stored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub user_id: String,
    pub text: String,
    pub photo_url: String,
}

pub struct ReviewService {
    store: Arc<dyn DocumentStore>,
    catalog: Arc<CatalogService>,
    users: Arc<UserService>,
    coins: CoinRules,
}

impl ReviewService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        catalog: Arc<CatalogService>,
        users: Arc<UserService>,
        coins: CoinRules,
    ) -> Self {
        ReviewService {
            store,
            catalog,
            users,
            coins,
        }
    }

    /// Store a review and credit the review bonus as one step. Returns the
    /// stored review and the reviewer's new balance.
    pub async fn add_review(&self, place_id: &PlaceId, review: NewReview) -> Result<(Review, i64)> {
        if review.text.trim().is_empty() {
            return Err(AppError::InvalidRequest("Review text must not be empty".to_string()));
        }
        if review.photo_url.trim().is_empty() {
            return Err(AppError::InvalidRequest("A review needs a photo".to_string()));
        }

        self.catalog.find(place_id).await?;
        let user = self.users.get_user(&review.user_id).await?;

        let id = Uuid::new_v4().to_string();
        let stored = Review {
            id: Some(id.clone()),
            user_id: user.user_id.clone(),
            place_id: place_id.clone(),
            text: review.text.trim().to_string(),
            photo_url: review.photo_url,
            user_name: user.display_name,
            user_photo: user.picture_url,
            created_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_else(|_| "unknown".to_string()),
        };

        let balance = self
            .users
            .credit_and_record(
                &user.user_id,
                i64::from(self.coins.review_bonus),
                REVIEWS_COLLECTION,
                &id,
                serde_json::to_value(&stored)?,
            )
            .await?;

        tracing::info!("User {} reviewed place {}", user.user_id, place_id);
        Ok((stored, balance))
    }

    /// Reviews of a place, newest first
    pub async fn reviews_for_place(&self, place_id: &PlaceId) -> Result<Vec<Review>> {
        let documents = self
            .store
            .query(REVIEWS_COLLECTION, "placeId", &Value::from(place_id.as_str()))
            .await?;

        let mut reviews: Vec<Review> = documents
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<Review>(doc) {
                Ok(review) => Some(review),
                Err(e) => {
                    tracing::warn!("Skipping malformed review for place {}: {}", place_id, e);
                    None
                }
            })
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }
}

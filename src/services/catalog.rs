use crate::constants::PLACES_COLLECTION;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, Place, PlaceId, Reward, RewardCategory};
use crate::store::records::{parse_places, place_document};
use crate::store::DocumentStore;
use std::collections::HashMap;
use std::sync::Arc;

const REWARDS_VALID_UNTIL: &str = "2025-12-31";

/// Built-in Chiang Mai catalog used until the `places` collection is seeded
pub fn builtin_places() -> Vec<Place> {
    vec![
        Place::new("1", "Wat Umong", Coordinates { lat: 18.783636, lng: 98.953588 })
            .with_description(
                "A peaceful forest temple for meditation. Visitors walk through the old tunnels \
                 and pay respect to the Buddha images under large shade trees.",
            )
            .with_rating(4.6)
            .with_tags(&["Culture", "Green", "PM2.5 free"])
            .with_image("https://cms.dmpcdn.com/travel/2020/11/03/9d45da30-1dbc-11eb-9275-d9e61fe8653e_original.jpg"),
        Place::new("2", "Ang Kaew", Coordinates { lat: 18.8020, lng: 98.9446 })
            .with_description(
                "Small reservoir with walking and jogging trails, benches and open lawns for picnics.",
            )
            .with_rating(4.7)
            .with_tags(&["Green", "PM2.5 free"])
            .with_image("https://media.readthecloud.co/wp-content/uploads/2021/12/29133520/angkaew-11-750x500.jpg"),
        Place::new("3", "Chiang Mai PAO Park", Coordinates { lat: 18.7979, lng: 98.9876 })
            .with_description(
                "New public park with a shady natural atmosphere and mountain views, popular for exercise.",
            )
            .with_rating(4.7)
            .with_tags(&["Green", "PM2.5 free"])
            .with_image("https://media.nationthailand.com/uploads/images/contents/w1024/2024/11/NwBTfIZjeNeA3Ec98Sz2.webp"),
        Place::new("4", "Mae Kha Canal", Coordinates { lat: 18.7881, lng: 98.9936 })
            .with_description(
                "Ancient canal that once served as the outer moat and drainage of the old city.",
            )
            .with_rating(4.2)
            .with_tags(&["Culture", "Green"])
            .with_image("https://dynamic-media-cdn.tripadvisor.com/media/photo-o/2e/0e/cd/b2/caption.jpg"),
        Place::new("5", "Ginger Farm", Coordinates { lat: 18.6672, lng: 98.9645 })
            .with_description(
                "Organic farm with rice planting, egg collecting, cooking and other family activities.",
            )
            .with_rating(4.5)
            .with_tags(&["Green", "Culture", "PM2.5 free"])
            .with_image("https://images.squarespace-cdn.com/content/v1/5dcac1b37b75f56509c0a367/c96597eb-4afc-4346-b33c-1669a5281cd4/DSC00016.jpg"),
        Place::new("6", "Hor Kham Luang", Coordinates { lat: 18.752879, lng: 98.922341 })
            .with_description(
                "Lanna-style pavilion on a hill inside the Royal Agricultural Research Center park.",
            )
            .with_rating(4.7)
            .with_tags(&["Culture", "Green", "PM2.5 free"])
            .with_image("https://upload.wikimedia.org/wikipedia/commons/0/0f/Ho_Kum_Luang_%28I%29.jpg"),
        Place::new("7", "One Nimman", Coordinates { lat: 18.80016, lng: 98.96756 })
            .with_description(
                "Designer pieces, local crafts and Chiang Mai souvenirs in the heart of Nimman.",
            )
            .with_rating(4.5)
            .with_tags(&["Street", "Culture"])
            .with_image("https://res.cloudinary.com/pillarshotels/image/upload/f_auto/web/cms/resources/attractions/on-03-1500x1000-w1800h1360.jpeg"),
        Place::new("8", "Think Park", Coordinates { lat: 18.80141, lng: 98.96754 })
            .with_description(
                "Open-air shopping hub with cafés, boutiques, live music and a night market.",
            )
            .with_rating(4.3)
            .with_tags(&["Street", "Culture"])
            .with_image("https://changpuakmagazine.com/images/article/182925ArticleThumpnai_September2018-07-07_resize.jpg"),
        Place::new("10", "สุกี้ช้างเผือก", Coordinates { lat: 18.79581, lng: 98.98533 })
            .with_description("Long-running street food suki stall at the Chang Phueak night market.")
            .with_rating(4.5)
            .with_tags(&["Street", "Culture"])
            .with_image("https://d13q9rhbndrrl0.cloudfront.net/posts/none/2021/8/1640512803955-655157687290318600.jpeg"),
        Place::new("11", "Khao-Sō-i ข้าวโซอิ", Coordinates { lat: 18.80914, lng: 99.00476 })
            .with_description("Fresh khao soi noodles made in front of you, rich broth, Japanese-style room.")
            .with_rating(4.8)
            .with_tags(&["Street", "Culture"])
            .with_image("https://media.readthecloud.co/wp-content/uploads/2021/11/29140911/khao-so-i-31-750x500.jpg"),
        Place::new("12", "Mae Sai Khao Soi Restaurant", Coordinates { lat: 18.7997, lng: 98.9751 })
            .with_description("Rich, aromatic khao soi curry soup with well-balanced flavor.")
            .with_rating(4.5)
            .with_tags(&["Street", "Culture"])
            .with_image("https://www.mytravelbuzzg.com/wp-content/uploads/Khao-Soi-Mae-Sai-Restaurant-e1693473350860.jpg"),
        Place::new("13", "Chang Kei Hong Kong-style breakfast", Coordinates { lat: 18.7903, lng: 98.9785 })
            .with_description("Hong Kong-style breakfast near the walled city.")
            .with_rating(4.8)
            .with_tags(&["Street", "Culture"])
            .with_image("https://images.chiangmaicitylife.com/clg/wp-content/uploads/2018/09/BF-1.jpg"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn reward(
    id: &str,
    name: &str,
    description: &str,
    coin_cost: i64,
    category: RewardCategory,
    discount_code: &str,
    location: &str,
    original_price: Option<&str>,
) -> Reward {
    Reward {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        coin_cost,
        category,
        discount_code: Some(discount_code.to_string()),
        valid_until: REWARDS_VALID_UNTIL.to_string(),
        location: location.to_string(),
        original_price: original_price.map(str::to_string),
    }
}

/// Partner rewards redeemable with coins
pub fn builtin_rewards() -> Vec<Reward> {
    use RewardCategory::*;
    vec![
        reward("1", "20% Off at Khao Soi Mae Sai", "Enjoy authentic Northern Thai cuisine with 20% off your entire bill", 50, Food, "YEEP20KHAO", "Nimman Road, Chiang Mai", Some("150 THB")),
        reward("2", "Free Coffee at One Nimman", "Redeem a free specialty coffee at any participating café in One Nimman", 30, Food, "YEEPFREE", "One Nimman, Chiang Mai", None),
        reward("3", "Ginger Farm Tour", "Get 50% off organic farm tour including lunch and activities", 100, Experience, "YEEPFARM50", "Ginger Farm, Mae Wang", Some("800 THB")),
        reward("4", "Wat Umong Meditation Session", "Free guided meditation session at the ancient temple tunnels", 80, Experience, "YEEPZEN", "Wat Umong, Suthep", None),
        reward("5", "Think Park Night Market Voucher", "100 THB shopping voucher for handmade crafts and local goods", 40, Souvenir, "YEEPCRAFT", "Think Park, Nimman", None),
        reward("6", "Royal Park Bike Rental", "Free 2-hour bicycle rental at Hor Kham Luang Royal Park", 25, Experience, "YEEPBIKE", "Royal Agricultural Research Center", None),
        reward("7", "Suki Chang Phueak Special", "Free extra meat topping with any suki order", 20, Food, "YEEPSUKI", "Chang Phueak Night Market", None),
        reward("8", "Ang Kaew Sunset Picnic Set", "Picnic basket rental with local snacks for sunset viewing", 60, Experience, "YEEPPICNIC", "Ang Kaew Reservoir, CMU", None),
    ]
}

/// Read access to places and rewards
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    rewards: Vec<Reward>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        CatalogService {
            store,
            rewards: builtin_rewards(),
        }
    }

    /// All places, from the store when seeded, otherwise the built-in catalog
    pub async fn places(&self) -> Result<Vec<Place>> {
        let documents = self.store.list(PLACES_COLLECTION).await?;
        if documents.is_empty() {
            return Ok(builtin_places());
        }

        let places = parse_places(documents);
        tracing::debug!("Loaded {} places from {}", places.len(), self.store.backend_name());
        Ok(places)
    }

    pub async fn find(&self, id: &PlaceId) -> Result<Place> {
        self.places()
            .await?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Place '{}' not found", id)))
    }

    /// Places for `ids` in the given order. Unknown ids are skipped.
    pub async fn resolve(&self, ids: &[PlaceId]) -> Result<Vec<Place>> {
        let by_id: HashMap<PlaceId, Place> = self
            .places()
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            match by_id.get(id) {
                Some(place) => resolved.push(place.clone()),
                None => tracing::warn!("Liked place '{}' is not in the catalog, skipping", id),
            }
        }
        Ok(resolved)
    }

    /// Write the built-in catalog into an empty `places` collection.
    /// Returns the number of places written, zero when already seeded.
    pub async fn seed(&self) -> Result<usize> {
        if !self.store.list(PLACES_COLLECTION).await?.is_empty() {
            return Ok(0);
        }

        let places = builtin_places();
        for place in &places {
            self.store
                .set(PLACES_COLLECTION, place.id.as_str(), place_document(place)?)
                .await?;
        }
        tracing::info!("Seeded {} places into {}", places.len(), self.store.backend_name());
        Ok(places.len())
    }

    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    pub fn reward(&self, id: &str) -> Result<&Reward> {
        self.rewards
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Reward '{}' not found", id)))
    }
}

use crate::models::PlaceId;
use serde::{Deserialize, Serialize};

/// Stored profile of a LINE user. Field names follow the document layout
/// shared with the mini app front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub total_coins: i64,
    #[serde(default)]
    pub liked_places: Vec<PlaceId>,
    #[serde(default)]
    pub has_added_shortcut: bool,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        UserProfile {
            user_id: user_id.into(),
            display_name: display_name.into(),
            picture_url: None,
            total_coins: 0,
            liked_places: Vec::new(),
            has_added_shortcut: false,
        }
    }

    /// Returns false when the place was already liked
    pub fn like(&mut self, place_id: PlaceId) -> bool {
        if self.liked_places.contains(&place_id) {
            return false;
        }
        self.liked_places.push(place_id);
        true
    }

    pub fn unlike(&mut self, place_id: &PlaceId) -> bool {
        let before = self.liked_places.len();
        self.liked_places.retain(|id| id != place_id);
        before != self.liked_places.len()
    }

    /// Replace the liked list, dropping repeated ids but keeping first-seen order
    pub fn set_liked(&mut self, place_ids: Vec<PlaceId>) {
        self.liked_places.clear();
        for id in place_ids {
            self.like(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_is_deduplicated() {
        let mut user = UserProfile::new("U1", "Nok");
        assert!(user.like("1".into()));
        assert!(!user.like("1".into()));
        assert!(user.like("2".into()));
        assert_eq!(user.liked_places, vec![PlaceId::new("1"), PlaceId::new("2")]);
    }

    #[test]
    fn test_unlike_and_set() {
        let mut user = UserProfile::new("U1", "Nok");
        user.set_liked(vec!["3".into(), "1".into(), "3".into()]);
        assert_eq!(user.liked_places, vec![PlaceId::new("3"), PlaceId::new("1")]);

        assert!(user.unlike(&"3".into()));
        assert!(!user.unlike(&"3".into()));
        assert_eq!(user.liked_places, vec![PlaceId::new("1")]);
    }

    #[test]
    fn test_document_field_names() {
        let value = serde_json::to_value(UserProfile::new("U1", "Nok")).unwrap();
        assert_eq!(value["userId"], "U1");
        assert_eq!(value["totalCoins"], 0);
        assert!(value["likedPlaces"].as_array().unwrap().is_empty());
    }
}

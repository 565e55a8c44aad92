use std::sync::Arc;

use crate::{
    db::WardrobeStore,
    error::{AppError, AppResult},
    models::{HistoryEntry, Outfit, OutfitId, OutfitLogEntry, Weather},
};

pub const MAX_HISTORY: u32 = 50;

/// Records worn outfits; the only writer of wear counters
#[derive(Clone)]
pub struct OutfitLogger {
    wardrobe: Arc<dyn WardrobeStore>,
}

impl OutfitLogger {
    pub fn new(wardrobe: Arc<dyn WardrobeStore>) -> Self {
        Self { wardrobe }
    }

    /// Logs a suggested outfit as worn
    pub async fn log(
        &self,
        outfit: &Outfit,
        occasion: &str,
        weather: Option<Weather>,
    ) -> AppResult<OutfitId> {
        self.log_entry(OutfitLogEntry {
            slots: outfit.slots(),
            occasion: occasion.to_string(),
            weather,
        })
        .await
    }

    /// Logs an outfit from raw slot ids
    pub async fn log_entry(&self, entry: OutfitLogEntry) -> AppResult<OutfitId> {
        if entry.slots.is_empty() {
            return Err(AppError::InvalidInput(
                "An outfit needs at least one item".to_string(),
            ));
        }
        if entry.occasion.trim().is_empty() {
            return Err(AppError::InvalidInput("occasion cannot be empty".to_string()));
        }

        let id = self.wardrobe.log_outfit(&entry).await?;

        tracing::info!(
            outfit_id = id,
            occasion = %entry.occasion,
            items = ?entry.slots.item_ids(),
            "Outfit logged"
        );

        Ok(id)
    }

    /// Newest outfits first; `limit` is clamped to `1..=MAX_HISTORY`
    pub async fn history(&self, limit: u32) -> AppResult<Vec<HistoryEntry>> {
        self.wardrobe
            .outfit_history(limit.clamp(1, MAX_HISTORY))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{Category, HistorySlot, NewClothingItem, OutfitSlots};

    async fn add(store: &MemoryStore, category: Category) -> crate::models::ClothingItem {
        store
            .insert_item(NewClothingItem {
                image_path: format!("uploads/{}.jpg", category),
                category,
                color_primary: None,
                color_secondary: None,
                pattern: crate::models::Pattern::Solid,
                formality: crate::models::Formality::Casual,
                season_weight: crate::models::SeasonWeight::Medium,
                open_toe: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_log_suggested_outfit_bumps_wear_counts() {
        let store = MemoryStore::new();
        let dress = add(&store, Category::Dress).await;
        let shoes = add(&store, Category::Shoes).await;
        let logger = OutfitLogger::new(Arc::new(store.clone()));

        let outfit = Outfit::Dress {
            dress: dress.clone(),
            shoes: Some(shoes.clone()),
        };
        let id = logger
            .log(&outfit, "party", Some(Weather::new(27.0, "Clear")))
            .await
            .unwrap();

        let logged = store.get_outfit(id).await.unwrap().unwrap();
        assert_eq!(logged.slots.dress_id, Some(dress.id));
        assert_eq!(logged.slots.top_id, None);
        assert_eq!(logged.weather_temp, Some(27.0));

        for item_id in [dress.id, shoes.id] {
            let item = store.get_item(item_id).await.unwrap().unwrap();
            assert_eq!(item.times_worn, 1);
            assert!(item.last_worn.is_some());
        }
    }

    #[tokio::test]
    async fn test_log_rejects_empty_outfit() {
        let logger = OutfitLogger::new(Arc::new(MemoryStore::new()));
        let result = logger
            .log_entry(OutfitLogEntry {
                slots: OutfitSlots::default(),
                occasion: "casual".to_string(),
                weather: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_history_limit_and_unknown_items() {
        let store = MemoryStore::new();
        let top = add(&store, Category::Top).await;
        let bottom = add(&store, Category::Bottom).await;
        let logger = OutfitLogger::new(Arc::new(store.clone()));

        let slots = OutfitSlots {
            top_id: Some(top.id),
            bottom_id: Some(bottom.id),
            ..Default::default()
        };
        for occasion in ["work", "casual", "date"] {
            logger
                .log_entry(OutfitLogEntry {
                    slots,
                    occasion: occasion.to_string(),
                    weather: None,
                })
                .await
                .unwrap();
        }
        store.delete_item(top.id).await.unwrap();

        let history = logger.history(0).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].occasion, "date");
        assert!(matches!(history[0].top, Some(HistorySlot::Unknown { .. })));
        assert!(matches!(history[0].bottom, Some(HistorySlot::Known { .. })));

        assert_eq!(logger.history(500).await.unwrap().len(), 3);
    }
}

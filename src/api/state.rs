use std::sync::Arc;

use crate::{
    db::{MemoryStore, ProfileStore, WardrobeStore},
    models::Weather,
    services::{
        OutfitLogger, OutfitRecommender, StaticWeatherProvider, StyleProfileManager,
        WardrobeService, WeatherProvider,
    },
};

/// Shared application state
///
/// Every service holds `Arc`s to the same stores, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub recommender: OutfitRecommender,
    pub profile: StyleProfileManager,
    pub logger: OutfitLogger,
    pub wardrobe: WardrobeService,
    pub weather: Arc<dyn WeatherProvider>,
    pub default_city: String,
}

impl AppState {
    pub fn new(
        wardrobe: Arc<dyn WardrobeStore>,
        profile: Arc<dyn ProfileStore>,
        weather: Arc<dyn WeatherProvider>,
        default_city: String,
    ) -> Self {
        Self {
            recommender: OutfitRecommender::new(wardrobe.clone(), profile.clone()),
            profile: StyleProfileManager::new(wardrobe.clone(), profile),
            logger: OutfitLogger::new(wardrobe.clone()),
            wardrobe: WardrobeService::new(wardrobe),
            weather,
            default_city,
        }
    }

    /// State over fresh in-memory stores and a fixed weather snapshot
    pub fn in_memory(weather: Weather) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(
            store.clone(),
            store,
            Arc::new(StaticWeatherProvider::new(weather)),
            "Tiruppur".to_string(),
        )
    }
}

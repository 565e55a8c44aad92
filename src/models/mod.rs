use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod clothing;
pub mod outfit;
pub mod profile;

pub use clothing::{
    normalize_color, Category, ClothingItem, ClothingUpdate, Formality, ItemFilter, ItemId,
    NewClothingItem, Pattern, Rgb, SeasonWeight,
};
pub use outfit::{
    HistoryEntry, HistorySlot, LoggedOutfit, Occasion, Outfit, OutfitId, OutfitLogEntry,
    OutfitSlots, ScoredOutfit, TempBand, Weather,
};
pub use profile::{
    clamp_weight, ColorPreference, NewRating, OutfitRating, PreferenceAdjustment, PreferenceKey, PreferenceType,
    PreferenceWeight, Preferences, RatingStats, BASELINE_WEIGHT, FEEDBACK_TAGS, MAX_WEIGHT,
    MIN_WEIGHT,
};

// ============================================================================
// API Types
// ============================================================================

/// Query string of the suggestion endpoint
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default = "default_occasion")]
    pub occasion: String,
    /// Celsius; resolved from the weather provider when absent
    pub temp: Option<f64>,
    pub condition: Option<String>,
    #[serde(default = "default_suggestion_count")]
    pub num: usize,
    /// Fixes the scoring jitter for reproducible results
    pub seed: Option<u64>,
}

fn default_occasion() -> String {
    "casual".to_string()
}

fn default_suggestion_count() -> usize {
    4
}

/// Compact view of an item inside a suggestion
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutfitItemRef {
    pub id: ItemId,
    pub image_path: String,
    pub category: Category,
    pub color_primary: Option<String>,
}

impl From<&ClothingItem> for OutfitItemRef {
    fn from(item: &ClothingItem) -> Self {
        Self {
            id: item.id,
            image_path: item.image_path.clone(),
            category: item.category,
            color_primary: item.color_primary.clone(),
        }
    }
}

/// One suggested outfit as returned to the client
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutfitSuggestion {
    #[serde(rename = "type")]
    pub outfit_type: String,
    pub items: BTreeMap<String, OutfitItemRef>,
    pub score: i32,
}

impl From<&ScoredOutfit> for OutfitSuggestion {
    fn from(scored: &ScoredOutfit) -> Self {
        let mut items = BTreeMap::new();
        match &scored.outfit {
            Outfit::Regular { top, bottom, shoes } => {
                items.insert("top".to_string(), OutfitItemRef::from(top));
                items.insert("bottom".to_string(), OutfitItemRef::from(bottom));
                if let Some(shoes) = shoes {
                    items.insert("shoes".to_string(), OutfitItemRef::from(shoes));
                }
            }
            Outfit::Dress { dress, shoes } => {
                items.insert("dress".to_string(), OutfitItemRef::from(dress));
                if let Some(shoes) = shoes {
                    items.insert("shoes".to_string(), OutfitItemRef::from(shoes));
                }
            }
        }

        Self {
            outfit_type: scored.outfit.kind().to_string(),
            items,
            score: scored.display_score(),
        }
    }
}

/// Response of the suggestion endpoint
#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub occasion: Occasion,
    pub weather: Weather,
    pub suggestions: Vec<OutfitSuggestion>,
}

/// Request body for logging a worn outfit
#[derive(Debug, Deserialize)]
pub struct LogOutfitRequest {
    #[serde(flatten)]
    pub slots: OutfitSlots,
    pub occasion: String,
    pub weather_temp: Option<f64>,
    pub weather_condition: Option<String>,
}

impl From<LogOutfitRequest> for OutfitLogEntry {
    fn from(request: LogOutfitRequest) -> Self {
        let weather = request
            .weather_temp
            .map(|temp| Weather::new(temp, request.weather_condition.unwrap_or_default()));

        Self {
            slots: request.slots,
            occasion: request.occasion,
            weather,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogOutfitResponse {
    pub id: OutfitId,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: u32,
}

fn default_history_limit() -> u32 {
    10
}

/// Request body for rating a logged outfit
#[derive(Debug, Deserialize)]
pub struct RateOutfitRequest {
    pub rating: i64,
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteColorsQuery {
    #[serde(default = "default_favorite_limit")]
    pub limit: usize,
}

fn default_favorite_limit() -> usize {
    5
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

/// Weather as shown to the client
#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub temp: f64,
    pub condition: String,
    pub city: String,
    pub emoji: &'static str,
}

/// Wardrobe-wide counters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WardrobeStats {
    pub total: u64,
    pub by_category: BTreeMap<Category, u64>,
    pub in_laundry: u64,
    pub favorites: u64,
    pub never_worn: u64,
    pub total_outfits: u64,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::clothing::{ClothingItem, ItemId};

/// Database identifier of a logged outfit
pub type OutfitId = i64;

/// Occasions the recommender knows a dress code for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Occasion {
    Casual,
    Work,
    Gym,
    Date,
    Home,
    Party,
    Formal,
}

impl Occasion {
    pub const ALL: [Occasion; 7] = [
        Occasion::Casual,
        Occasion::Work,
        Occasion::Gym,
        Occasion::Date,
        Occasion::Home,
        Occasion::Party,
        Occasion::Formal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Occasion::Casual => "casual",
            Occasion::Work => "work",
            Occasion::Gym => "gym",
            Occasion::Date => "date",
            Occasion::Home => "home",
            Occasion::Party => "party",
            Occasion::Formal => "formal",
        }
    }

    /// Resolves an occasion name, treating anything unrecognized as casual
    pub fn from_name(name: &str) -> Self {
        let wanted = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == wanted)
            .unwrap_or(Occasion::Casual)
    }
}

impl Display for Occasion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved weather the recommender is handed by its caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Weather {
    /// Degrees Celsius
    pub temp: f64,
    /// Provider condition, e.g. "Rain" or "Clear"
    pub condition: String,
}

impl Weather {
    pub fn new(temp: f64, condition: impl Into<String>) -> Self {
        Self {
            temp,
            condition: condition.into(),
        }
    }

    pub fn band(&self) -> TempBand {
        TempBand::from_celsius(self.temp)
    }

    pub fn is_rainy(&self) -> bool {
        self.condition.contains("Rain")
    }
}

/// Temperature bracket used by both weather filtering and scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempBand {
    /// Below 18°C
    Cold,
    /// 18°C to 32°C inclusive
    Moderate,
    /// Above 32°C
    Hot,
}

impl TempBand {
    pub const COLD_BELOW: f64 = 18.0;
    pub const HOT_ABOVE: f64 = 32.0;

    pub fn from_celsius(temp: f64) -> Self {
        if temp < Self::COLD_BELOW {
            TempBand::Cold
        } else if temp > Self::HOT_ABOVE {
            TempBand::Hot
        } else {
            TempBand::Moderate
        }
    }
}

/// A candidate outfit assembled at recommendation time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outfit {
    Regular {
        top: ClothingItem,
        bottom: ClothingItem,
        shoes: Option<ClothingItem>,
    },
    Dress {
        dress: ClothingItem,
        shoes: Option<ClothingItem>,
    },
}

impl Outfit {
    /// Every garment in the outfit, shoes last
    pub fn items(&self) -> Vec<&ClothingItem> {
        match self {
            Outfit::Regular { top, bottom, shoes } => {
                let mut items = vec![top, bottom];
                items.extend(shoes.as_ref());
                items
            }
            Outfit::Dress { dress, shoes } => {
                let mut items = vec![dress];
                items.extend(shoes.as_ref());
                items
            }
        }
    }

    /// The garments that carry the outfit's warmth (shoes excluded)
    pub fn body_items(&self) -> Vec<&ClothingItem> {
        match self {
            Outfit::Regular { top, bottom, .. } => vec![top, bottom],
            Outfit::Dress { dress, .. } => vec![dress],
        }
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items().into_iter().map(|item| item.id).collect()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Outfit::Regular { .. } => "regular",
            Outfit::Dress { .. } => "dress",
        }
    }

    /// Slot ids for logging this outfit
    pub fn slots(&self) -> OutfitSlots {
        match self {
            Outfit::Regular { top, bottom, shoes } => OutfitSlots {
                top_id: Some(top.id),
                bottom_id: Some(bottom.id),
                shoes_id: shoes.as_ref().map(|s| s.id),
                ..Default::default()
            },
            Outfit::Dress { dress, shoes } => OutfitSlots {
                dress_id: Some(dress.id),
                shoes_id: shoes.as_ref().map(|s| s.id),
                ..Default::default()
            },
        }
    }
}

/// A candidate outfit and its score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredOutfit {
    pub outfit: Outfit,
    pub score: i32,
}

impl ScoredOutfit {
    /// Score clipped to the 0-100 range shown to users
    pub fn display_score(&self) -> i32 {
        self.score.clamp(0, 100)
    }
}

/// Item ids per slot of a worn outfit
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutfitSlots {
    pub top_id: Option<ItemId>,
    pub bottom_id: Option<ItemId>,
    pub shoes_id: Option<ItemId>,
    pub dress_id: Option<ItemId>,
    pub outerwear_id: Option<ItemId>,
}

impl OutfitSlots {
    /// All referenced item ids in slot order
    pub fn item_ids(&self) -> Vec<ItemId> {
        [
            self.top_id,
            self.bottom_id,
            self.shoes_id,
            self.dress_id,
            self.outerwear_id,
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids().is_empty()
    }
}

/// A worn outfit as recorded in the history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggedOutfit {
    pub id: OutfitId,
    #[serde(flatten)]
    pub slots: OutfitSlots,
    pub occasion: String,
    pub weather_temp: Option<f64>,
    pub weather_condition: Option<String>,
    pub worn_at: DateTime<Utc>,
}

/// What gets written when an outfit is logged
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutfitLogEntry {
    pub slots: OutfitSlots,
    pub occasion: String,
    pub weather: Option<Weather>,
}

/// A referenced garment in a history entry
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HistorySlot {
    Known {
        id: ItemId,
        image_path: String,
        category: super::clothing::Category,
    },
    /// The item was deleted after the outfit was logged
    Unknown { id: ItemId, label: String },
}

impl HistorySlot {
    pub const UNKNOWN_LABEL: &'static str = "unknown item";

    pub fn resolve(id: ItemId, item: Option<&ClothingItem>) -> Self {
        match item {
            Some(item) => HistorySlot::Known {
                id,
                image_path: item.image_path.clone(),
                category: item.category,
            },
            None => HistorySlot::Unknown {
                id,
                label: Self::UNKNOWN_LABEL.to_string(),
            },
        }
    }
}

/// A history row with its slots resolved against the current wardrobe
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryEntry {
    pub id: OutfitId,
    pub occasion: String,
    pub weather_temp: Option<f64>,
    pub weather_condition: Option<String>,
    pub worn_at: DateTime<Utc>,
    pub top: Option<HistorySlot>,
    pub bottom: Option<HistorySlot>,
    pub shoes: Option<HistorySlot>,
    pub dress: Option<HistorySlot>,
    pub outerwear: Option<HistorySlot>,
}

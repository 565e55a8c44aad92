use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;

use super::outfit::OutfitId;

/// Lower bound of a preference weight
pub const MIN_WEIGHT: f64 = 0.0;
/// Upper bound of a preference weight
pub const MAX_WEIGHT: f64 = 5.0;
/// Weight of a preference that has never been touched
pub const BASELINE_WEIGHT: f64 = 1.0;

/// Clamps a weight into the legal range
pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_nan() {
        return BASELINE_WEIGHT;
    }
    weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
}

/// Which attribute a learned weight is attached to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceType {
    Color,
    Formality,
    Pattern,
    Occasion,
}

impl PreferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceType::Color => "color",
            PreferenceType::Formality => "formality",
            PreferenceType::Pattern => "pattern",
            PreferenceType::Occasion => "occasion",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "color" => Some(PreferenceType::Color),
            "formality" => Some(PreferenceType::Formality),
            "pattern" => Some(PreferenceType::Pattern),
            "occasion" => Some(PreferenceType::Occasion),
            _ => None,
        }
    }
}

impl Display for PreferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique key of a learned weight
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PreferenceKey {
    pub kind: PreferenceType,
    pub value: String,
}

impl PreferenceKey {
    pub fn new(kind: PreferenceType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// A stored preference weight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceWeight {
    pub key: PreferenceKey,
    pub weight: f64,
    pub updated_at: DateTime<Utc>,
}

/// A nudge to apply to one weight
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceAdjustment {
    pub key: PreferenceKey,
    pub delta: f64,
}

impl PreferenceAdjustment {
    /// Weight after applying this nudge to `current` (baseline when unseen)
    pub fn applied_to(&self, current: Option<f64>) -> f64 {
        clamp_weight(current.unwrap_or(BASELINE_WEIGHT) + self.delta)
    }
}

/// A rating about to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewRating {
    pub outfit_id: OutfitId,
    pub rating: u8,
    pub feedback: Option<String>,
}

/// A stored outfit rating
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutfitRating {
    pub id: i64,
    pub outfit_id: OutfitId,
    pub rating: u8,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Learned weights grouped by attribute
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    pub colors: BTreeMap<String, f64>,
    pub formality: BTreeMap<String, f64>,
    pub patterns: BTreeMap<String, f64>,
    pub occasions: BTreeMap<String, f64>,
}

impl Preferences {
    pub fn from_weights<'a>(weights: impl IntoIterator<Item = &'a PreferenceWeight>) -> Self {
        let mut prefs = Self::default();
        for w in weights {
            prefs
                .group_mut(w.key.kind)
                .insert(w.key.value.clone(), w.weight);
        }
        prefs
    }

    pub fn group(&self, kind: PreferenceType) -> &BTreeMap<String, f64> {
        match kind {
            PreferenceType::Color => &self.colors,
            PreferenceType::Formality => &self.formality,
            PreferenceType::Pattern => &self.patterns,
            PreferenceType::Occasion => &self.occasions,
        }
    }

    fn group_mut(&mut self, kind: PreferenceType) -> &mut BTreeMap<String, f64> {
        match kind {
            PreferenceType::Color => &mut self.colors,
            PreferenceType::Formality => &mut self.formality,
            PreferenceType::Pattern => &mut self.patterns,
            PreferenceType::Occasion => &mut self.occasions,
        }
    }

    /// Learned weight for a key, if it was ever touched
    pub fn weight(&self, kind: PreferenceType, value: &str) -> Option<f64> {
        self.group(kind).get(value).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
            && self.formality.is_empty()
            && self.patterns.is_empty()
            && self.occasions.is_empty()
    }
}

/// A learned color and how much it is liked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColorPreference {
    pub color: String,
    pub weight: f64,
}

/// Aggregate rating statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RatingStats {
    pub total_ratings: u64,
    /// Mean rating rounded to one decimal, 0 when nothing was rated
    pub average_rating: f64,
    /// Count of ratings per star value
    pub distribution: BTreeMap<u8, u64>,
}

/// Quick feedback tags offered next to the star rating
pub const FEEDBACK_TAGS: [&str; 10] = [
    "Perfect fit! 👌",
    "Great colors 🎨",
    "Very comfortable 😊",
    "Got compliments! ⭐",
    "Too formal 👔",
    "Too casual 👕",
    "Colors clashed 🚫",
    "Too warm 🥵",
    "Too cold 🥶",
    "Didn't feel right 😐",
];

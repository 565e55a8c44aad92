use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    db::{ProfileStore, WardrobeStore},
    error::{AppError, AppResult},
    models::{
        ClothingItem, ColorPreference, NewRating, Outfit, OutfitId, PreferenceAdjustment,
        PreferenceKey, PreferenceType, Preferences, RatingStats, BASELINE_WEIGHT,
    },
};

/// Weight change per star away from a neutral 3 for item attributes
const ATTRIBUTE_STEP: f64 = 0.5;
/// Weight change per star away from a neutral 3 for the occasion
const OCCASION_STEP: f64 = 0.3;
const NEUTRAL_RATING: i64 = 3;

const COLOR_BONUS_SCALE: f64 = 10.0;
const FORMALITY_BONUS_SCALE: f64 = 8.0;
const PATTERN_BONUS_SCALE: f64 = 5.0;

/// Score bonus an outfit earns from learned preferences
///
/// Only keys that were learned contribute; the sum is truncated toward zero.
pub fn scoring_bonus(outfit: &Outfit, preferences: &Preferences) -> i32 {
    let bonus: f64 = outfit
        .items()
        .into_iter()
        .map(|item| {
            let color = item
                .color_primary
                .as_deref()
                .and_then(|c| preferences.weight(PreferenceType::Color, c))
                .map_or(0.0, |w| (w - BASELINE_WEIGHT) * COLOR_BONUS_SCALE);
            let formality = preferences
                .weight(PreferenceType::Formality, item.formality.as_str())
                .map_or(0.0, |w| (w - BASELINE_WEIGHT) * FORMALITY_BONUS_SCALE);
            let pattern = preferences
                .weight(PreferenceType::Pattern, item.pattern.as_str())
                .map_or(0.0, |w| (w - BASELINE_WEIGHT) * PATTERN_BONUS_SCALE);
            color + formality + pattern
        })
        .sum();

    bonus as i32
}

/// Weight nudges produced by one rating of an outfit
pub fn rating_adjustments(
    rating: u8,
    items: &[ClothingItem],
    occasion: &str,
) -> Vec<PreferenceAdjustment> {
    let stars = i64::from(rating) - NEUTRAL_RATING;
    let attribute_delta = stars as f64 * ATTRIBUTE_STEP;

    let mut adjustments = Vec::with_capacity(items.len() * 3 + 1);
    for item in items {
        if let Some(color) = &item.color_primary {
            adjustments.push(PreferenceAdjustment {
                key: PreferenceKey::new(PreferenceType::Color, color.as_str()),
                delta: attribute_delta,
            });
        }
        adjustments.push(PreferenceAdjustment {
            key: PreferenceKey::new(PreferenceType::Formality, item.formality.as_str()),
            delta: attribute_delta,
        });
        adjustments.push(PreferenceAdjustment {
            key: PreferenceKey::new(PreferenceType::Pattern, item.pattern.as_str()),
            delta: attribute_delta,
        });
    }

    if !occasion.trim().is_empty() {
        adjustments.push(PreferenceAdjustment {
            key: PreferenceKey::new(PreferenceType::Occasion, occasion),
            delta: stars as f64 * OCCASION_STEP,
        });
    }

    adjustments
}

/// Validates a star rating
pub fn validate_rating(rating: i64) -> AppResult<u8> {
    u8::try_from(rating)
        .ok()
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| {
            AppError::InvalidInput(format!("Rating must be between 1 and 5, got {}", rating))
        })
}

/// Learns style preferences from outfit ratings
#[derive(Clone)]
pub struct StyleProfileManager {
    wardrobe: Arc<dyn WardrobeStore>,
    profile: Arc<dyn ProfileStore>,
}

impl StyleProfileManager {
    pub fn new(wardrobe: Arc<dyn WardrobeStore>, profile: Arc<dyn ProfileStore>) -> Self {
        Self { wardrobe, profile }
    }

    /// Records a rating and nudges the weights of everything the outfit was made of
    ///
    /// The rating is stored even when the outfit no longer exists, in which case
    /// no weights move and `NotFound` is returned.
    pub async fn rate(
        &self,
        outfit_id: OutfitId,
        rating: i64,
        feedback: Option<String>,
    ) -> AppResult<()> {
        let rating = validate_rating(rating)?;
        let new_rating = NewRating {
            outfit_id,
            rating,
            feedback: feedback.filter(|f| !f.trim().is_empty()),
        };

        let Some(outfit) = self.wardrobe.get_outfit(outfit_id).await? else {
            self.profile.record_rating(&new_rating, &[]).await?;
            tracing::warn!(outfit_id, rating, "Rated outfit does not exist");
            return Err(AppError::NotFound(format!("Outfit {} not found", outfit_id)));
        };

        let mut items = Vec::new();
        for id in outfit.slots.item_ids() {
            match self.wardrobe.get_item(id).await? {
                Some(item) => items.push(item),
                None => tracing::debug!(outfit_id, item_id = id, "Skipping deleted item"),
            }
        }

        let adjustments = rating_adjustments(rating, &items, &outfit.occasion);
        self.profile.record_rating(&new_rating, &adjustments).await?;

        tracing::info!(
            outfit_id,
            rating,
            adjustments = adjustments.len(),
            "Outfit rating recorded"
        );

        Ok(())
    }

    pub async fn preferences(&self) -> AppResult<Preferences> {
        let weights = self.profile.list_weights().await?;
        Ok(Preferences::from_weights(&weights))
    }

    /// Bonus for an outfit against the currently stored preferences
    pub async fn scoring_bonus(&self, outfit: &Outfit) -> AppResult<i32> {
        Ok(scoring_bonus(outfit, &self.preferences().await?))
    }

    pub async fn stats(&self) -> AppResult<RatingStats> {
        self.profile.rating_stats().await
    }

    /// Forgets every learned weight; ratings are kept
    pub async fn reset(&self) -> AppResult<()> {
        self.profile.clear_weights().await?;
        tracing::info!("Style profile reset");
        Ok(())
    }

    /// Best-liked colors, heaviest first
    pub async fn favorite_colors(&self, limit: usize) -> AppResult<Vec<ColorPreference>> {
        let preferences = self.preferences().await?;

        let mut colors: Vec<ColorPreference> = preferences
            .colors
            .into_iter()
            .map(|(color, weight)| ColorPreference { color, weight })
            .collect();
        colors.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        colors.truncate(limit);

        Ok(colors)
    }

    /// Formality weights as percentages of their total
    pub async fn formality_distribution(&self) -> AppResult<BTreeMap<String, f64>> {
        let preferences = self.preferences().await?;
        Ok(formality_percentages(&preferences.formality))
    }
}

fn formality_percentages(formality: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    let total: f64 = formality.values().sum();
    if formality.is_empty() || total <= 0.0 {
        return BTreeMap::from([
            ("casual".to_string(), 33.0),
            ("business-casual".to_string(), 33.0),
            ("formal".to_string(), 34.0),
        ]);
    }

    formality
        .iter()
        .map(|(name, weight)| (name.clone(), (weight / total * 1000.0).round() / 10.0))
        .collect()
}

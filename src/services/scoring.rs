use rand::Rng;

use crate::{
    models::{ClothingItem, Outfit, Pattern, Preferences, Rgb, SeasonWeight, TempBand, Weather},
    services::profile::scoring_bonus,
};

/// Every candidate starts here before bonuses and penalties
pub const BASE_SCORE: i32 = 50;
/// Upper bound (inclusive) of the random jitter added per candidate
pub const MAX_JITTER: i32 = 10;

/// Colors that always count as neutral
const NEUTRAL_PALETTE: [&str; 7] = [
    "#000000", "#ffffff", "#808080", "#d3d3d3", "#a9a9a9", "#2f4f4f", "#696969",
];
/// Colors closer than this to mid-gray are neutral too
const NEUTRAL_GRAY_RADIUS: f64 = 50.0;
const SIMILAR_BELOW: f64 = 30.0;
const CONTRAST_ABOVE: f64 = 150.0;
/// Distance assumed when a color cannot be parsed
const UNPARSEABLE_DISTANCE: f64 = 100.0;

/// Per-factor breakdown of a candidate's deterministic score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBreakdown {
    pub weather: i32,
    pub color: i32,
    pub freshness: i32,
    pub pattern: i32,
    pub style: i32,
}

impl ScoreBreakdown {
    pub fn compute(outfit: &Outfit, weather: &Weather, preferences: &Preferences) -> Self {
        Self {
            weather: weather_fit(outfit, weather.band()),
            color: color_coordination(outfit),
            freshness: freshness(outfit),
            pattern: pattern_balance(outfit),
            style: scoring_bonus(outfit, preferences),
        }
    }

    /// Base score plus every factor, without jitter
    pub fn total(&self) -> i32 {
        BASE_SCORE + self.weather + self.color + self.freshness + self.pattern + self.style
    }
}

/// Scores a candidate, adding a uniform jitter in `0..=MAX_JITTER` drawn from `rng`
pub fn score_outfit<R: Rng + ?Sized>(
    outfit: &Outfit,
    weather: &Weather,
    preferences: &Preferences,
    rng: &mut R,
) -> i32 {
    ScoreBreakdown::compute(outfit, weather, preferences).total() + rng.gen_range(0..=MAX_JITTER)
}

/// Rewards garments whose weight suits the temperature; shoes do not count
pub fn weather_fit(outfit: &Outfit, band: TempBand) -> i32 {
    outfit
        .body_items()
        .into_iter()
        .map(|item| match (band, item.season_weight) {
            (TempBand::Cold, SeasonWeight::Heavy) => 15,
            (TempBand::Cold, SeasonWeight::Medium) => 8,
            (TempBand::Cold, SeasonWeight::Light) => -10,
            (TempBand::Hot, SeasonWeight::Light) => 15,
            (TempBand::Hot, SeasonWeight::Medium) => 8,
            (TempBand::Hot, SeasonWeight::Heavy) => -10,
            (TempBand::Moderate, SeasonWeight::Medium) => 10,
            (TempBand::Moderate, _) => 5,
        })
        .sum()
}

/// Top/bottom color harmony; a dress coordinates with itself
pub fn color_coordination(outfit: &Outfit) -> i32 {
    let (top, bottom) = match outfit {
        Outfit::Regular { top, bottom, .. } => (top, bottom),
        Outfit::Dress { .. } => return 15,
    };

    let top_color = top.color_primary.as_deref();
    let bottom_color = bottom.color_primary.as_deref();
    let top_neutral = is_neutral(top_color);
    let bottom_neutral = is_neutral(bottom_color);

    let mut score = 0;
    if top_neutral || bottom_neutral {
        score += 15;
    }
    if top_neutral && bottom_neutral {
        score += 5;
    }

    if let (Some(a), Some(b)) = (top_color, bottom_color) {
        let distance = color_distance(a, b);
        if distance < SIMILAR_BELOW {
            score += 10;
        }
        if distance > CONTRAST_ABOVE {
            score += 8;
        }
    }

    score
}

/// Favors garments that have not been worn much
pub fn freshness(outfit: &Outfit) -> i32 {
    outfit
        .items()
        .into_iter()
        .map(|item: &ClothingItem| match item.times_worn {
            0 => 10,
            1..=2 => 5,
            3..=9 => 0,
            _ => -5,
        })
        .sum()
}

/// Solid pieces are safe, two patterns are risky
pub fn pattern_balance(outfit: &Outfit) -> i32 {
    let (top, bottom) = match outfit {
        Outfit::Regular { top, bottom, .. } => (top, bottom),
        Outfit::Dress { .. } => return 5,
    };

    match (top.pattern == Pattern::Solid, bottom.pattern == Pattern::Solid) {
        (true, true) => 10,
        (true, false) | (false, true) => 8,
        (false, false) => -5,
    }
}

/// A missing color is treated as neutral
pub fn is_neutral(color: Option<&str>) -> bool {
    let Some(color) = color.filter(|c| !c.trim().is_empty()) else {
        return true;
    };

    let lowered = color.trim().to_lowercase();
    NEUTRAL_PALETTE.contains(&lowered.as_str())
        || color_distance(&lowered, &Rgb::MID_GRAY.to_hex()) < NEUTRAL_GRAY_RADIUS
}

/// RGB distance between two hex colors, with a moderate default for bad input
pub fn color_distance(a: &str, b: &str) -> f64 {
    match (Rgb::from_hex(a), Rgb::from_hex(b)) {
        (Some(a), Some(b)) => a.distance(&b),
        _ => UNPARSEABLE_DISTANCE,
    }
}

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    db::{ProfileStore, WardrobeStore},
    error::AppResult,
    models::{
        Category, ClothingItem, Formality, ItemFilter, ItemId, Occasion, Outfit, Preferences,
        ScoredOutfit, SeasonWeight, TempBand, Weather,
    },
    services::scoring::score_outfit,
};

/// Smallest wardrobe that can produce any outfit
const MIN_WARDROBE_ITEMS: usize = 2;

/// Dress code per occasion
///
/// Adding an occasion means adding a row here; the filters only read the table.
pub const OCCASION_RULES: [(Occasion, &[Formality]); 7] = [
    (Occasion::Gym, &[Formality::Athletic, Formality::Casual]),
    (
        Occasion::Work,
        &[Formality::Business, Formality::BusinessCasual, Formality::Formal],
    ),
    (Occasion::Casual, &[Formality::Casual, Formality::BusinessCasual]),
    (
        Occasion::Date,
        &[Formality::BusinessCasual, Formality::Formal, Formality::Casual],
    ),
    (Occasion::Home, &[Formality::Casual, Formality::Athletic]),
    (
        Occasion::Party,
        &[Formality::Formal, Formality::BusinessCasual, Formality::Casual],
    ),
    (Occasion::Formal, &[Formality::Formal, Formality::Business]),
];

/// Formality levels acceptable for an occasion
pub fn allowed_formality(occasion: Occasion) -> &'static [Formality] {
    OCCASION_RULES
        .iter()
        .find(|(o, _)| *o == occasion)
        .map(|(_, allowed)| *allowed)
        .unwrap_or(&[Formality::Casual, Formality::BusinessCasual])
}

/// Candidate garments split by category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub tops: Vec<ClothingItem>,
    pub bottoms: Vec<ClothingItem>,
    pub shoes: Vec<ClothingItem>,
    pub dresses: Vec<ClothingItem>,
    pub outerwear: Vec<ClothingItem>,
}

impl Buckets {
    /// Whether at least one outfit type can still be assembled
    pub fn can_dress(&self) -> bool {
        (!self.tops.is_empty() && !self.bottoms.is_empty()) || !self.dresses.is_empty()
    }
}

/// Buckets the items whose formality suits the occasion
pub fn filter_by_occasion(items: Vec<ClothingItem>, occasion: Occasion) -> Buckets {
    let allowed = allowed_formality(occasion);
    let mut buckets = Buckets::default();

    for item in items.into_iter().filter(|i| allowed.contains(&i.formality)) {
        let bucket = match item.category {
            Category::Top => &mut buckets.tops,
            Category::Bottom => &mut buckets.bottoms,
            Category::Shoes => &mut buckets.shoes,
            Category::Dress => &mut buckets.dresses,
            Category::Outerwear => &mut buckets.outerwear,
        };
        bucket.push(item);
    }

    buckets
}

/// Drops garments that are wrong for the weather
///
/// Only extreme temperatures exclude anything, and only tops and bottoms;
/// moderate weight mismatches are left to scoring.
pub fn filter_by_weather(buckets: &mut Buckets, weather: &Weather) {
    let excluded = match weather.band() {
        TempBand::Cold => Some(SeasonWeight::Light),
        TempBand::Hot => Some(SeasonWeight::Heavy),
        TempBand::Moderate => None,
    };

    if let Some(excluded) = excluded {
        buckets.tops.retain(|i| i.season_weight != excluded);
        buckets.bottoms.retain(|i| i.season_weight != excluded);
    }

    if weather.is_rainy() {
        buckets.shoes.retain(|i| !i.is_open_footwear());
    }
}

/// Every regular and dress combination; shoes are left out when there are none
pub fn create_combinations(buckets: &Buckets) -> Vec<Outfit> {
    let shoe_options: Vec<Option<&ClothingItem>> = if buckets.shoes.is_empty() {
        vec![None]
    } else {
        buckets.shoes.iter().map(Some).collect()
    };

    let mut outfits = Vec::new();

    for top in &buckets.tops {
        for bottom in &buckets.bottoms {
            for shoes in &shoe_options {
                outfits.push(Outfit::Regular {
                    top: top.clone(),
                    bottom: bottom.clone(),
                    shoes: shoes.cloned(),
                });
            }
        }
    }

    for dress in &buckets.dresses {
        for shoes in &shoe_options {
            outfits.push(Outfit::Dress {
                dress: dress.clone(),
                shoes: shoes.cloned(),
            });
        }
    }

    outfits
}

/// Picks up to `count` outfits, preferring ones that share no garments
///
/// The first pass greedily takes non-overlapping outfits by score; the second
/// tops up with the best remaining candidates. The result is score-descending.
pub fn select_diverse(mut scored: Vec<ScoredOutfit>, count: usize) -> Vec<ScoredOutfit> {
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    if scored.len() <= count {
        return scored;
    }

    let mut picked = vec![false; scored.len()];
    let mut used: HashSet<ItemId> = HashSet::new();
    let mut selected = 0;

    for (idx, candidate) in scored.iter().enumerate() {
        if selected == count {
            break;
        }
        let ids = candidate.outfit.item_ids();
        if ids.iter().any(|id| used.contains(id)) {
            continue;
        }
        used.extend(ids);
        picked[idx] = true;
        selected += 1;
    }

    for flag in picked.iter_mut() {
        if selected == count {
            break;
        }
        if !*flag {
            *flag = true;
            selected += 1;
        }
    }

    scored
        .into_iter()
        .zip(picked)
        .filter_map(|(outfit, keep)| keep.then_some(outfit))
        .collect()
}

/// Runs the whole pipeline over a wardrobe snapshot
///
/// Returns an empty list when the wardrobe cannot dress the occasion.
pub fn recommend<R: Rng + ?Sized>(
    items: Vec<ClothingItem>,
    occasion: Occasion,
    weather: &Weather,
    count: usize,
    preferences: &Preferences,
    rng: &mut R,
) -> Vec<ScoredOutfit> {
    if items.len() < MIN_WARDROBE_ITEMS {
        tracing::debug!(items = items.len(), "Wardrobe too small to suggest outfits");
        return Vec::new();
    }

    let mut buckets = filter_by_occasion(items, occasion);
    if !buckets.can_dress() {
        tracing::debug!(%occasion, "No tops and bottoms or dresses suit the occasion");
        return Vec::new();
    }

    filter_by_weather(&mut buckets, weather);

    let candidates = create_combinations(&buckets);
    let candidate_count = candidates.len();

    let scored = candidates
        .into_iter()
        .map(|outfit| {
            let score = score_outfit(&outfit, weather, preferences, rng);
            ScoredOutfit { outfit, score }
        })
        .collect();

    let selected = select_diverse(scored, count);

    tracing::debug!(
        %occasion,
        candidates = candidate_count,
        selected = selected.len(),
        "Scored outfit candidates"
    );

    selected
}

/// Outfit recommendations over the stored wardrobe and learned profile
#[derive(Clone)]
pub struct OutfitRecommender {
    wardrobe: Arc<dyn WardrobeStore>,
    profile: Arc<dyn ProfileStore>,
}

impl OutfitRecommender {
    pub fn new(wardrobe: Arc<dyn WardrobeStore>, profile: Arc<dyn ProfileStore>) -> Self {
        Self { wardrobe, profile }
    }

    /// Suggests up to `count` outfits for an occasion name and resolved weather
    ///
    /// Unknown occasion names use the casual dress code. A `seed` makes the
    /// scoring jitter reproducible; otherwise it is drawn from entropy.
    pub async fn suggest(
        &self,
        occasion: &str,
        weather: &Weather,
        count: usize,
        seed: Option<u64>,
    ) -> AppResult<Vec<ScoredOutfit>> {
        let occasion = Occasion::from_name(occasion);

        let items = self.wardrobe.list_items(&ItemFilter::wearable()).await?;
        let weights = self.profile.list_weights().await?;
        let preferences = Preferences::from_weights(&weights);

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        tracing::info!(
            %occasion,
            temp = weather.temp,
            condition = %weather.condition,
            wardrobe_size = items.len(),
            "Generating outfit suggestions"
        );

        Ok(recommend(
            items,
            occasion,
            weather,
            count,
            &preferences,
            &mut rng,
        ))
    }
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::{
    error::{AppError, AppResult},
    models::{
        ClothingItem, ClothingUpdate, ColorPreference, FavoriteColorsQuery, HistoryEntry,
        HistoryQuery, ItemFilter, ItemId, LogOutfitRequest, LogOutfitResponse, NewClothingItem,
        Occasion, OutfitId, OutfitSuggestion, Preferences, RateOutfitRequest, RatingStats,
        SuggestQuery, SuggestResponse, WardrobeStats, Weather, WeatherQuery, WeatherResponse,
        FEEDBACK_TAGS,
    },
    services::providers::{condition_emoji, resolve_weather},
};

use super::AppState;

/// Most suggestions a single request may ask for
pub const MAX_SUGGESTIONS: usize = 6;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

// Outfits

/// Suggests outfits for an occasion
///
/// An explicit `temp` skips the weather provider; otherwise the default city's
/// current weather is used, falling back to a fixed snapshot when unavailable.
pub async fn suggest_outfits(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> AppResult<Json<SuggestResponse>> {
    if !(1..=MAX_SUGGESTIONS).contains(&query.num) {
        return Err(AppError::InvalidInput(format!(
            "num must be between 1 and {}",
            MAX_SUGGESTIONS
        )));
    }

    let weather = match query.temp {
        Some(temp) => Weather::new(
            temp,
            query.condition.unwrap_or_else(|| "Clear".to_string()),
        ),
        None => {
            let mut weather = resolve_weather(state.weather.as_ref(), &state.default_city).await;
            if let Some(condition) = query.condition {
                weather.condition = condition;
            }
            weather
        }
    };

    let scored = state
        .recommender
        .suggest(&query.occasion, &weather, query.num, query.seed)
        .await?;

    Ok(Json(SuggestResponse {
        occasion: Occasion::from_name(&query.occasion),
        weather,
        suggestions: scored.iter().map(OutfitSuggestion::from).collect(),
    }))
}

/// Logs a worn outfit
pub async fn log_outfit(
    State(state): State<AppState>,
    Json(request): Json<LogOutfitRequest>,
) -> AppResult<(StatusCode, Json<LogOutfitResponse>)> {
    let id = state.logger.log_entry(request.into()).await?;
    Ok((StatusCode::CREATED, Json(LogOutfitResponse { id })))
}

pub async fn outfit_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    Ok(Json(state.logger.history(query.limit).await?))
}

/// Rates a logged outfit
pub async fn rate_outfit(
    State(state): State<AppState>,
    Path(outfit_id): Path<OutfitId>,
    Json(request): Json<RateOutfitRequest>,
) -> AppResult<Json<Value>> {
    state
        .profile
        .rate(outfit_id, request.rating, request.feedback)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

// Style profile

pub async fn get_profile(State(state): State<AppState>) -> AppResult<Json<Preferences>> {
    Ok(Json(state.profile.preferences().await?))
}

/// Forgets learned preferences; ratings are kept
pub async fn reset_profile(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.profile.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn profile_stats(State(state): State<AppState>) -> AppResult<Json<RatingStats>> {
    Ok(Json(state.profile.stats().await?))
}

pub async fn favorite_colors(
    State(state): State<AppState>,
    Query(query): Query<FavoriteColorsQuery>,
) -> AppResult<Json<Vec<ColorPreference>>> {
    Ok(Json(state.profile.favorite_colors(query.limit).await?))
}

pub async fn formality_distribution(
    State(state): State<AppState>,
) -> AppResult<Json<BTreeMap<String, f64>>> {
    Ok(Json(state.profile.formality_distribution().await?))
}

pub async fn feedback_tags() -> Json<&'static [&'static str]> {
    Json(&FEEDBACK_TAGS)
}

// Wardrobe

pub async fn list_clothes(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> AppResult<Json<Vec<ClothingItem>>> {
    Ok(Json(state.wardrobe.list(&filter).await?))
}

pub async fn create_clothing(
    State(state): State<AppState>,
    Json(request): Json<NewClothingItem>,
) -> AppResult<(StatusCode, Json<ClothingItem>)> {
    let item = state.wardrobe.add(request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_clothing(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> AppResult<Json<ClothingItem>> {
    Ok(Json(state.wardrobe.get(id).await?))
}

pub async fn update_clothing(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(update): Json<ClothingUpdate>,
) -> AppResult<Json<ClothingItem>> {
    Ok(Json(state.wardrobe.update(id, update).await?))
}

pub async fn delete_clothing(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> AppResult<StatusCode> {
    state.wardrobe.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_laundry(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> AppResult<Json<Value>> {
    let in_laundry = state.wardrobe.toggle_laundry(id).await?;
    Ok(Json(json!({ "id": id, "in_laundry": in_laundry })))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> AppResult<Json<Value>> {
    let favorite = state.wardrobe.toggle_favorite(id).await?;
    Ok(Json(json!({ "id": id, "favorite": favorite })))
}

/// Items that have not been worn for a month
pub async fn forgotten_clothes(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ClothingItem>>> {
    Ok(Json(state.wardrobe.forgotten().await?))
}

/// Deletes every item and the outfit history
pub async fn clear_all(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.wardrobe.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn wardrobe_stats(State(state): State<AppState>) -> AppResult<Json<WardrobeStats>> {
    Ok(Json(state.wardrobe.stats().await?))
}

// Weather

/// Current weather for a city (default city when omitted)
pub async fn current_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Json<WeatherResponse> {
    let city = query
        .city
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| state.default_city.clone());

    let weather = resolve_weather(state.weather.as_ref(), &city).await;

    Json(WeatherResponse {
        emoji: condition_emoji(&weather.condition),
        temp: weather.temp,
        condition: weather.condition,
        city,
    })
}

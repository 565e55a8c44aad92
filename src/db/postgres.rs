use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};

use super::store::{round_one_decimal, ProfileStore, WardrobeStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        Category, ClothingItem, ClothingUpdate, HistoryEntry, HistorySlot, ItemFilter, ItemId,
        LoggedOutfit, NewClothingItem, NewRating, OutfitId, OutfitLogEntry, OutfitSlots,
        PreferenceAdjustment, PreferenceKey, PreferenceType, PreferenceWeight, RatingStats,
        WardrobeStats, MAX_WEIGHT, MIN_WEIGHT,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations in `migrations/`
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const CLOTHES_COLUMNS: &str = "id, image_path, category, color_primary, color_secondary, \
    pattern, formality, season_weight, open_toe, times_worn, last_worn, in_laundry, favorite, created_at";

/// Postgres-backed wardrobe and style profile
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_item(row: &PgRow) -> AppResult<ClothingItem> {
        let integrity = |e: AppError| AppError::DataIntegrity(e.to_string());
        let times_worn: i32 = row.try_get("times_worn")?;

        Ok(ClothingItem {
            id: row.try_get("id")?,
            image_path: row.try_get("image_path")?,
            category: row.try_get::<String, _>("category")?.parse().map_err(integrity)?,
            color_primary: row.try_get("color_primary")?,
            color_secondary: row.try_get("color_secondary")?,
            pattern: row.try_get::<String, _>("pattern")?.parse().map_err(integrity)?,
            formality: row.try_get::<String, _>("formality")?.parse().map_err(integrity)?,
            season_weight: row
                .try_get::<String, _>("season_weight")?
                .parse()
                .map_err(integrity)?,
            open_toe: row.try_get("open_toe")?,
            times_worn: u32::try_from(times_worn).map_err(|_| {
                AppError::DataIntegrity(format!("Negative wear count {}", times_worn))
            })?,
            last_worn: row.try_get("last_worn")?,
            in_laundry: row.try_get("in_laundry")?,
            favorite: row.try_get("favorite")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_outfit(row: &PgRow) -> AppResult<LoggedOutfit> {
        Ok(LoggedOutfit {
            id: row.try_get("id")?,
            slots: Self::row_to_slots(row)?,
            occasion: row.try_get("occasion")?,
            weather_temp: row.try_get("weather_temp")?,
            weather_condition: row.try_get("weather_condition")?,
            worn_at: row.try_get("worn_at")?,
        })
    }

    fn row_to_slots(row: &PgRow) -> AppResult<OutfitSlots> {
        Ok(OutfitSlots {
            top_id: row.try_get("top_id")?,
            bottom_id: row.try_get("bottom_id")?,
            shoes_id: row.try_get("shoes_id")?,
            dress_id: row.try_get("dress_id")?,
            outerwear_id: row.try_get("outerwear_id")?,
        })
    }

    /// Builds a history slot from the joined `<slot>_img` / `<slot>_category` columns
    fn joined_slot(row: &PgRow, id: Option<ItemId>, slot: &str) -> AppResult<Option<HistorySlot>> {
        let Some(id) = id else {
            return Ok(None);
        };

        let image_path: Option<String> = row.try_get(format!("{}_img", slot).as_str())?;
        let category: Option<String> = row.try_get(format!("{}_category", slot).as_str())?;

        let slot = match (image_path, category) {
            (Some(image_path), Some(category)) => HistorySlot::Known {
                id,
                image_path,
                category: category
                    .parse::<Category>()
                    .map_err(|e| AppError::DataIntegrity(e.to_string()))?,
            },
            _ => HistorySlot::resolve(id, None),
        };

        Ok(Some(slot))
    }
}

#[async_trait::async_trait]
impl WardrobeStore for PgStore {
    async fn list_items(&self, filter: &ItemFilter) -> AppResult<Vec<ClothingItem>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM clothes WHERE TRUE", CLOTHES_COLUMNS));

        if let Some(category) = filter.category {
            query.push(" AND category = ").push_bind(category.as_str());
        }
        if filter.exclude_laundry {
            query.push(" AND in_laundry = FALSE");
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_item).collect()
    }

    async fn get_item(&self, id: ItemId) -> AppResult<Option<ClothingItem>> {
        let row = sqlx::query(&format!("SELECT {} FROM clothes WHERE id = $1", CLOTHES_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_item).transpose()
    }

    async fn insert_item(&self, item: NewClothingItem) -> AppResult<ClothingItem> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO clothes (image_path, category, color_primary, color_secondary,
                                 pattern, formality, season_weight, open_toe)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            CLOTHES_COLUMNS
        ))
        .bind(&item.image_path)
        .bind(item.category.as_str())
        .bind(&item.color_primary)
        .bind(&item.color_secondary)
        .bind(item.pattern.as_str())
        .bind(item.formality.as_str())
        .bind(item.season_weight.as_str())
        .bind(item.open_toe)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_item(&row)
    }

    async fn update_item(
        &self,
        id: ItemId,
        update: &ClothingUpdate,
    ) -> AppResult<Option<ClothingItem>> {
        if update.is_empty() {
            return self.get_item(id).await;
        }

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE clothes SET ");
        {
            let mut fields = query.separated(", ");
            if let Some(category) = update.category {
                fields.push("category = ").push_bind_unseparated(category.as_str());
            }
            if let Some(color) = &update.color_primary {
                fields.push("color_primary = ").push_bind_unseparated(color.clone());
            }
            if let Some(color) = &update.color_secondary {
                fields.push("color_secondary = ").push_bind_unseparated(color.clone());
            }
            if let Some(pattern) = update.pattern {
                fields.push("pattern = ").push_bind_unseparated(pattern.as_str());
            }
            if let Some(formality) = update.formality {
                fields.push("formality = ").push_bind_unseparated(formality.as_str());
            }
            if let Some(season_weight) = update.season_weight {
                fields
                    .push("season_weight = ")
                    .push_bind_unseparated(season_weight.as_str());
            }
            if let Some(open_toe) = update.open_toe {
                fields.push("open_toe = ").push_bind_unseparated(open_toe);
            }
            if let Some(in_laundry) = update.in_laundry {
                fields.push("in_laundry = ").push_bind_unseparated(in_laundry);
            }
            if let Some(favorite) = update.favorite {
                fields.push("favorite = ").push_bind_unseparated(favorite);
            }
        }
        query.push(" WHERE id = ").push_bind(id);
        query.push(format!(" RETURNING {}", CLOTHES_COLUMNS));

        let row = query.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(Self::row_to_item).transpose()
    }

    async fn delete_item(&self, id: ItemId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM clothes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle_laundry(&self, id: ItemId) -> AppResult<Option<bool>> {
        let value = sqlx::query_scalar(
            "UPDATE clothes SET in_laundry = NOT in_laundry WHERE id = $1 RETURNING in_laundry",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn toggle_favorite(&self, id: ItemId) -> AppResult<Option<bool>> {
        let value = sqlx::query_scalar(
            "UPDATE clothes SET favorite = NOT favorite WHERE id = $1 RETURNING favorite",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn log_outfit(&self, entry: &OutfitLogEntry) -> AppResult<OutfitId> {
        let mut tx = self.pool.begin().await?;

        let outfit_id: OutfitId = sqlx::query_scalar(
            r#"
            INSERT INTO outfits (top_id, bottom_id, shoes_id, dress_id, outerwear_id,
                                 occasion, weather_temp, weather_condition)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(entry.slots.top_id)
        .bind(entry.slots.bottom_id)
        .bind(entry.slots.shoes_id)
        .bind(entry.slots.dress_id)
        .bind(entry.slots.outerwear_id)
        .bind(&entry.occasion)
        .bind(entry.weather.as_ref().map(|w| w.temp))
        .bind(entry.weather.as_ref().map(|w| w.condition.clone()))
        .fetch_one(&mut *tx)
        .await?;

        // One bump per slot, so an item filling two slots counts twice
        for item_id in entry.slots.item_ids() {
            sqlx::query(
                "UPDATE clothes SET times_worn = times_worn + 1, last_worn = NOW() WHERE id = $1",
            )
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(outfit_id)
    }

    async fn get_outfit(&self, id: OutfitId) -> AppResult<Option<LoggedOutfit>> {
        let row = sqlx::query(
            r#"
            SELECT id, top_id, bottom_id, shoes_id, dress_id, outerwear_id,
                   occasion, weather_temp, weather_condition, worn_at
            FROM outfits WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_outfit).transpose()
    }

    async fn outfit_history(&self, limit: u32) -> AppResult<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT o.id, o.top_id, o.bottom_id, o.shoes_id, o.dress_id, o.outerwear_id,
                   o.occasion, o.weather_temp, o.weather_condition, o.worn_at,
                   t.image_path AS top_img, t.category AS top_category,
                   b.image_path AS bottom_img, b.category AS bottom_category,
                   s.image_path AS shoes_img, s.category AS shoes_category,
                   d.image_path AS dress_img, d.category AS dress_category,
                   w.image_path AS outerwear_img, w.category AS outerwear_category
            FROM outfits o
            LEFT JOIN clothes t ON o.top_id = t.id
            LEFT JOIN clothes b ON o.bottom_id = b.id
            LEFT JOIN clothes s ON o.shoes_id = s.id
            LEFT JOIN clothes d ON o.dress_id = d.id
            LEFT JOIN clothes w ON o.outerwear_id = w.id
            ORDER BY o.worn_at DESC, o.id DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let outfit = Self::row_to_outfit(row)?;
                Ok(HistoryEntry {
                    top: Self::joined_slot(row, outfit.slots.top_id, "top")?,
                    bottom: Self::joined_slot(row, outfit.slots.bottom_id, "bottom")?,
                    shoes: Self::joined_slot(row, outfit.slots.shoes_id, "shoes")?,
                    dress: Self::joined_slot(row, outfit.slots.dress_id, "dress")?,
                    outerwear: Self::joined_slot(row, outfit.slots.outerwear_id, "outerwear")?,
                    id: outfit.id,
                    occasion: outfit.occasion,
                    weather_temp: outfit.weather_temp,
                    weather_condition: outfit.weather_condition,
                    worn_at: outfit.worn_at,
                })
            })
            .collect()
    }

    async fn wardrobe_stats(&self) -> AppResult<WardrobeStats> {
        let totals = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE in_laundry) AS in_laundry,
                   COUNT(*) FILTER (WHERE favorite) AS favorites,
                   COUNT(*) FILTER (WHERE times_worn = 0) AS never_worn
            FROM clothes
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let by_category_rows =
            sqlx::query("SELECT category, COUNT(*) AS count FROM clothes GROUP BY category")
                .fetch_all(&self.pool)
                .await?;

        let mut by_category = BTreeMap::new();
        for row in &by_category_rows {
            let category: Category = row
                .try_get::<String, _>("category")?
                .parse()
                .map_err(|e: AppError| AppError::DataIntegrity(e.to_string()))?;
            let count: i64 = row.try_get("count")?;
            by_category.insert(category, count as u64);
        }

        let total_outfits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM outfits")
            .fetch_one(&self.pool)
            .await?;

        Ok(WardrobeStats {
            total: totals.try_get::<i64, _>("total")? as u64,
            by_category,
            in_laundry: totals.try_get::<i64, _>("in_laundry")? as u64,
            favorites: totals.try_get::<i64, _>("favorites")? as u64,
            never_worn: totals.try_get::<i64, _>("never_worn")? as u64,
            total_outfits: total_outfits as u64,
        })
    }

    async fn forgotten_items(
        &self,
        worn_before: DateTime<Utc>,
        limit: u32,
    ) -> AppResult<Vec<ClothingItem>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM clothes
            WHERE (last_worn < $1 OR last_worn IS NULL) AND in_laundry = FALSE
            ORDER BY times_worn ASC, id ASC
            LIMIT $2
            "#,
            CLOTHES_COLUMNS
        ))
        .bind(worn_before)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn clear_wardrobe(&self) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM outfits").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM clothes").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileStore for PgStore {
    async fn record_rating(
        &self,
        rating: &NewRating,
        adjustments: &[PreferenceAdjustment],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO outfit_ratings (outfit_id, rating, feedback) VALUES ($1, $2, $3)")
            .bind(rating.outfit_id)
            .bind(i16::from(rating.rating))
            .bind(&rating.feedback)
            .execute(&mut *tx)
            .await?;

        // Row locks taken by the upsert serialize concurrent updates of the same key
        for adjustment in adjustments {
            sqlx::query(
                r#"
                INSERT INTO style_profile (preference_type, preference_value, weight, updated_at)
                VALUES ($1, $2, GREATEST($4, LEAST($5, 1.0 + $3)), NOW())
                ON CONFLICT (preference_type, preference_value) DO UPDATE SET
                    weight = GREATEST($4, LEAST($5, style_profile.weight + $3)),
                    updated_at = NOW()
                "#,
            )
            .bind(adjustment.key.kind.as_str())
            .bind(&adjustment.key.value)
            .bind(adjustment.delta)
            .bind(MIN_WEIGHT)
            .bind(MAX_WEIGHT)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_weights(&self) -> AppResult<Vec<PreferenceWeight>> {
        let rows = sqlx::query(
            r#"
            SELECT preference_type, preference_value, weight, updated_at
            FROM style_profile
            ORDER BY preference_type, preference_value
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut weights = Vec::with_capacity(rows.len());
        for row in &rows {
            let kind_name: String = row.try_get("preference_type")?;
            let Some(kind) = PreferenceType::from_name(&kind_name) else {
                tracing::warn!(preference_type = %kind_name, "Skipping unknown preference type");
                continue;
            };

            weights.push(PreferenceWeight {
                key: PreferenceKey::new(kind, row.try_get::<String, _>("preference_value")?),
                weight: row.try_get("weight")?,
                updated_at: row.try_get("updated_at")?,
            });
        }

        Ok(weights)
    }

    async fn clear_weights(&self) -> AppResult<()> {
        sqlx::query("DELETE FROM style_profile")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn rating_stats(&self) -> AppResult<RatingStats> {
        let rows = sqlx::query(
            "SELECT rating, COUNT(*) AS count FROM outfit_ratings GROUP BY rating ORDER BY rating",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut distribution = BTreeMap::new();
        let mut total = 0u64;
        let mut sum = 0u64;
        for row in &rows {
            let rating: i16 = row.try_get("rating")?;
            let count: i64 = row.try_get("count")?;
            let rating = u8::try_from(rating)
                .map_err(|_| AppError::DataIntegrity(format!("Stored rating {} out of range", rating)))?;

            distribution.insert(rating, count as u64);
            total += count as u64;
            sum += u64::from(rating) * count as u64;
        }

        let average_rating = if total == 0 {
            0.0
        } else {
            round_one_decimal(sum as f64 / total as f64)
        };

        Ok(RatingStats {
            total_ratings: total,
            average_rating,
            distribution,
        })
    }
}

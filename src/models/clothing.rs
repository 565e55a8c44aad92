use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::AppError;

/// Database identifier of a clothing item
pub type ItemId = i64;

/// Garment category, which decides the bucket an item lands in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Top,
    Bottom,
    Dress,
    Shoes,
    Outerwear,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    Solid,
    Striped,
    Checkered,
    Floral,
    Printed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Formality {
    Casual,
    BusinessCasual,
    Business,
    Formal,
    Athletic,
}

/// How warm a garment is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SeasonWeight {
    Light,
    Medium,
    Heavy,
}

macro_rules! string_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(AppError::InvalidInput(format!(
                        "Unknown {} '{}'",
                        stringify!($ty).to_lowercase(),
                        other
                    ))),
                }
            }
        }
    };
}

string_enum!(Category {
    Top => "top",
    Bottom => "bottom",
    Dress => "dress",
    Shoes => "shoes",
    Outerwear => "outerwear",
});

string_enum!(Pattern {
    Solid => "solid",
    Striped => "striped",
    Checkered => "checkered",
    Floral => "floral",
    Printed => "printed",
});

string_enum!(Formality {
    Casual => "casual",
    BusinessCasual => "business-casual",
    Business => "business",
    Formal => "formal",
    Athletic => "athletic",
});

string_enum!(SeasonWeight {
    Light => "light",
    Medium => "medium",
    Heavy => "heavy",
});

/// 8-bit RGB triple parsed from a `#rrggbb` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const MID_GRAY: Rgb = Rgb {
        r: 0x80,
        g: 0x80,
        b: 0x80,
    };

    /// Parses `#rrggbb` (leading `#` optional, case-insensitive)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();

        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Euclidean distance in RGB space
    pub fn distance(&self, other: &Rgb) -> f64 {
        let dr = f64::from(self.r) - f64::from(other.r);
        let dg = f64::from(self.g) - f64::from(other.g);
        let db = f64::from(self.b) - f64::from(other.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Normalizes a user supplied color to lowercase `#rrggbb`
pub fn normalize_color(color: &str) -> Result<String, AppError> {
    Rgb::from_hex(color)
        .map(|rgb| rgb.to_hex())
        .ok_or_else(|| AppError::InvalidInput(format!("Invalid hex color '{}'", color)))
}

/// A digitized garment in the wardrobe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClothingItem {
    pub id: ItemId,
    /// Storage reference of the item's photo
    pub image_path: String,
    pub category: Category,
    pub color_primary: Option<String>,
    pub color_secondary: Option<String>,
    pub pattern: Pattern,
    pub formality: Formality,
    pub season_weight: SeasonWeight,
    /// Explicit footwear style; `None` means unknown
    #[serde(default)]
    pub open_toe: Option<bool>,
    pub times_worn: u32,
    pub last_worn: Option<DateTime<Utc>>,
    pub in_laundry: bool,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl ClothingItem {
    /// Whether this pair of shoes should stay home on a rainy day.
    ///
    /// Uses the explicit `open_toe` attribute when it is set and falls back to
    /// looking for "sandal" in the image path otherwise.
    pub fn is_open_footwear(&self) -> bool {
        match self.open_toe {
            Some(open) => open,
            None => self.image_path.to_lowercase().contains("sandal"),
        }
    }
}

/// Attributes for a new clothing item
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewClothingItem {
    pub image_path: String,
    pub category: Category,
    pub color_primary: Option<String>,
    #[serde(default)]
    pub color_secondary: Option<String>,
    #[serde(default = "default_pattern")]
    pub pattern: Pattern,
    #[serde(default = "default_formality")]
    pub formality: Formality,
    #[serde(default = "default_season_weight")]
    pub season_weight: SeasonWeight,
    #[serde(default)]
    pub open_toe: Option<bool>,
}

fn default_pattern() -> Pattern {
    Pattern::Solid
}

fn default_formality() -> Formality {
    Formality::Casual
}

fn default_season_weight() -> SeasonWeight {
    SeasonWeight::Medium
}

impl NewClothingItem {
    /// Validates and normalizes color fields
    pub fn normalized(mut self) -> Result<Self, AppError> {
        if self.image_path.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "image_path cannot be empty".to_string(),
            ));
        }
        self.color_primary = self.color_primary.as_deref().map(normalize_color).transpose()?;
        self.color_secondary = self
            .color_secondary
            .as_deref()
            .map(normalize_color)
            .transpose()?;
        Ok(self)
    }
}

/// Partial update of a clothing item; `None` fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClothingUpdate {
    pub category: Option<Category>,
    pub color_primary: Option<String>,
    pub color_secondary: Option<String>,
    pub pattern: Option<Pattern>,
    pub formality: Option<Formality>,
    pub season_weight: Option<SeasonWeight>,
    pub open_toe: Option<bool>,
    pub in_laundry: Option<bool>,
    pub favorite: Option<bool>,
}

impl ClothingUpdate {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.color_primary.is_none()
            && self.color_secondary.is_none()
            && self.pattern.is_none()
            && self.formality.is_none()
            && self.season_weight.is_none()
            && self.open_toe.is_none()
            && self.in_laundry.is_none()
            && self.favorite.is_none()
    }

    pub fn normalized(mut self) -> Result<Self, AppError> {
        if self.is_empty() {
            return Err(AppError::InvalidInput("No fields to update".to_string()));
        }
        self.color_primary = self.color_primary.as_deref().map(normalize_color).transpose()?;
        self.color_secondary = self
            .color_secondary
            .as_deref()
            .map(normalize_color)
            .transpose()?;
        Ok(self)
    }

    /// Applies the update to an in-memory item
    pub fn apply(&self, item: &mut ClothingItem) {
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(color) = &self.color_primary {
            item.color_primary = Some(color.clone());
        }
        if let Some(color) = &self.color_secondary {
            item.color_secondary = Some(color.clone());
        }
        if let Some(pattern) = self.pattern {
            item.pattern = pattern;
        }
        if let Some(formality) = self.formality {
            item.formality = formality;
        }
        if let Some(season_weight) = self.season_weight {
            item.season_weight = season_weight;
        }
        if let Some(open_toe) = self.open_toe {
            item.open_toe = Some(open_toe);
        }
        if let Some(in_laundry) = self.in_laundry {
            item.in_laundry = in_laundry;
        }
        if let Some(favorite) = self.favorite {
            item.favorite = favorite;
        }
    }
}

/// Query over the wardrobe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemFilter {
    pub category: Option<Category>,
    #[serde(default)]
    pub exclude_laundry: bool,
}

impl ItemFilter {
    /// Everything that is currently wearable
    pub fn wearable() -> Self {
        Self {
            category: None,
            exclude_laundry: true,
        }
    }

    pub fn matches(&self, item: &ClothingItem) -> bool {
        if self.exclude_laundry && item.in_laundry {
            return false;
        }
        self.category.map_or(true, |c| c == item.category)
    }
}

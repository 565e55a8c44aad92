pub mod outfit_log;
pub mod profile;
pub mod providers;
pub mod recommender;
pub mod scoring;
pub mod wardrobe;

pub use outfit_log::OutfitLogger;
pub use profile::StyleProfileManager;
pub use providers::{resolve_weather, StaticWeatherProvider, WeatherProvider};
pub use recommender::OutfitRecommender;
pub use wardrobe::WardrobeService;

//! Business logic services for the Plantation Management System

pub mod analytics;
pub mod auth;
pub mod health_log;
pub mod image;
pub mod plant_lot;
pub mod species;
pub mod user;
pub mod zone;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use health_log::HealthLogService;
pub use image::ImageService;
pub use plant_lot::PlantLotService;
pub use species::SpeciesService;
pub use user::UserService;
pub use zone::ZoneService;

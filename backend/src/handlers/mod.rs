//! HTTP request handlers

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod health;
pub mod health_log;
pub mod plant_lot;
pub mod qr;
pub mod species;
pub mod user;
pub mod zone;

pub use admin::*;
pub use analytics::*;
pub use auth::*;
pub use health::*;
pub use health_log::*;
pub use plant_lot::*;
pub use qr::*;
pub use species::*;
pub use user::*;
pub use zone::*;

//! Shared types, models and analytics for the Plantation Management System
//!
//! This crate contains everything that is shared between the backend and the
//! frontend (via WASM): the domain records, input validation, and the pure
//! reporting computations (harvest readiness, health trends, dashboard).

pub mod analytics;
pub mod images;
pub mod models;
pub mod qr;
pub mod types;
pub mod validation;

pub use analytics::*;
pub use models::*;
pub use types::*;
pub use validation::*;

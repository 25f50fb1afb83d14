//! Domain models for the Plantation Management System

mod health;
mod plant_lot;
mod species;
mod user;
mod zone;

pub use health::*;
pub use plant_lot::*;
pub use species::*;
pub use user::*;
pub use zone::*;

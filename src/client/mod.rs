//! Client side of the meal planner: a mirror of the server's week that
//! applies edits optimistically and falls back to a reload when a save fails.

pub mod api;
pub mod controller;
pub mod render;

pub use api::{ClientError, HttpMealsApi, MealsApi};
pub use controller::{MealController, ReloadTrigger, StatusKind, StatusMessage, RELOAD_INTERVAL};

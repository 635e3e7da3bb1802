//! HTTP handlers for the SiteCast scheduling engine

pub mod analytics;
pub mod health;
pub mod schedule;
pub mod weather;

pub use analytics::*;
pub use health::*;
pub use schedule::*;
pub use weather::*;

//! Domain models for the SiteCast scheduling platform

mod analytics;
mod schedule;
mod weather;

pub use analytics::*;
pub use schedule::*;
pub use weather::*;

//! Business logic services for the SiteCast scheduling engine

pub mod analytics;
pub mod schedule;
pub mod weather;

pub use analytics::AnalyticsService;
pub use schedule::ScheduleService;
pub use weather::WeatherService;

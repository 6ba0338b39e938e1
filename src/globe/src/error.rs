use thiserror::Error;

/// Rejected [`GlobeConfig`](crate::config::GlobeConfig) values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },

    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: u32,
        value: u32,
    },

    #[error("{field} is not a usable number of seconds: {value}")]
    InvalidSeconds { field: &'static str, value: f32 },

    #[error("nudge orb schedule is empty")]
    EmptyOrbSchedule,
}

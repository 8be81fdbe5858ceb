//! Configuration errors
//!
//! The simulation itself is total over valid inputs. Everything that can go
//! wrong is caught when a session is built from a [`Tuning`](crate::Tuning)
//! and a [`WorldBounds`](crate::sim::WorldBounds).

/// Rejected tuning or world configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Spawn interval range is inverted: min {min} ms > max {max} ms")]
    SpawnIntervalRange { min: f64, max: f64 },

    #[error("`{field}` must be a finite, non-negative number (got {value})")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("`{field}` must be in (0, 1) (got {value})")]
    FactorOutOfRange { field: &'static str, value: f64 },

    #[error("No enemy type has a non-zero spawn weight")]
    NoSpawnableEnemies,

    #[error("Spawn weights sum past {}", u32::MAX)]
    SpawnWeightOverflow,

    #[error("World bounds {width}x{height} are invalid (need finite sizes taller than {min_height})")]
    WorldBounds { width: f32, height: f32, min_height: f32 },
}

/// Check that a tuning value is finite and not negative
pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value })
    }
}

/// Check that a shrinking factor lies in (0, 1). 1.0 would never shrink.
pub(crate) fn unit_factor(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::FactorOutOfRange { field, value })
    }
}

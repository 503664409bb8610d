//! Runtime configuration for vehicles and engines.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::ChainOrder;
use crate::constants::DEFAULT_DEBUG_PERIOD_S;

/// Errors produced while loading [`EngineSettings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The document is not valid JSON for the settings schema.
    #[error("invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),
    /// The debug period must be a positive, finite number of seconds.
    #[error("debug period must be positive and finite, got {0}")]
    InvalidDebugPeriod(f64),
}

/// Tunables applied when an engine wires itself into the host.
///
/// Every field has a default, so `{}` is a valid document.
///
/// # Examples
///
/// ```rust
/// use rail_frp::chain::ChainOrder;
/// use rail_frp::settings::EngineSettings;
///
/// let settings = EngineSettings::from_json_str(r#"{"chain_order": "new_first"}"#)
///     .expect("valid settings");
/// assert_eq!(settings.chain_order, ChainOrder::NewFirst);
/// assert!((settings.debug_period_s - 0.5).abs() < f64::EPSILON);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Throttle period for [`Stream::debug`](crate::frp::Stream::debug).
    pub debug_period_s: f64,
    /// Order used when chaining onto host hooks already holding a handler.
    pub chain_order: ChainOrder,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            debug_period_s: DEFAULT_DEBUG_PERIOD_S,
            chain_order: ChainOrder::PriorFirst,
        }
    }
}

impl EngineSettings {
    /// Parses and validates settings from JSON.
    ///
    /// # Errors
    /// Returns [`SettingsError::Parse`] for malformed JSON and
    /// [`SettingsError::InvalidDebugPeriod`] for a non-positive period.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidDebugPeriod`] for a non-positive or
    /// non-finite period.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.debug_period_s.is_finite() && self.debug_period_s > 0.0 {
            Ok(())
        } else {
            Err(SettingsError::InvalidDebugPeriod(self.debug_period_s))
        }
    }

    /// Debug throttle period in milliseconds of simulated time.
    #[must_use]
    pub fn debug_period_ms(&self) -> f64 {
        self.debug_period_s * 1000.0
    }
}

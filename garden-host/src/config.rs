//! Host configuration and frame budget tracking.
//!
//! A host config file is a garden config with an extra `[host]` table:
//!
//! ```toml
//! [host]
//! frame_interval_ms = 16
//! database = "garden.db"
//!
//! [logging]
//! level = "debug"
//!
//! [plants]
//! initial_population = 12
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use garden_core::config::GardenConfig;
use garden_core::error::Result;
use garden_core::GardenError;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Host Settings
// ---------------------------------------------------------------------------

/// Settings for the driver task itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Milliseconds between render frames.
    pub frame_interval_ms: u64,
    /// Capacity of the control event channel.
    pub channel_capacity: usize,
    /// Capacity of the plant diff broadcast.
    pub diff_capacity: usize,
    /// SQLite file for memories; in-memory storage when absent.
    pub database: Option<PathBuf>,
    /// Seed for the random stream; OS entropy when absent.
    pub seed: Option<u64>,
    /// Per-frame budget in microseconds before a slow frame is logged.
    pub frame_budget_us: u64,
}

impl HostSettings {
    /// Frame interval as a `Duration`, never zero.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            channel_capacity: 64,
            diff_capacity: 256,
            database: None,
            seed: None,
            frame_budget_us: 2000,
        }
    }
}

// ---------------------------------------------------------------------------
// Host Configuration
// ---------------------------------------------------------------------------

/// Garden configuration plus host settings, loaded from one TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Driver settings.
    #[serde(default)]
    pub host: HostSettings,
    /// Simulation configuration.
    #[serde(flatten)]
    pub garden: GardenConfig,
}

impl HostConfig {
    /// Parse a host config from TOML.
    ///
    /// # Errors
    /// Returns `GardenError::Config` if the TOML is invalid or a garden
    /// value is out of range.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| GardenError::Config(e.to_string()))?;
        config.garden.validate()?;
        Ok(config)
    }

    /// Load a host config from a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Frame Budget Tracker
// ---------------------------------------------------------------------------

/// Tracks how long frames take against a fixed budget.
#[derive(Debug, Clone, Default)]
pub struct FrameBudget {
    /// Budget per frame (μs).
    pub budget_us: u64,
    /// Duration of the most recent frame (μs).
    pub last_us: u64,
    /// Slowest frame seen so far (μs).
    pub worst_us: u64,
    /// Frames measured.
    pub frames: u64,
    /// Frames that went over budget.
    pub over_budget: u64,
}

impl FrameBudget {
    /// A tracker with the given budget.
    #[must_use]
    pub fn new(budget_us: u64) -> Self {
        Self {
            budget_us,
            ..Self::default()
        }
    }

    /// Record one frame. Returns `true` if it stayed within budget.
    pub fn record(&mut self, elapsed: Duration) -> bool {
        let us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.last_us = us;
        self.worst_us = self.worst_us.max(us);
        self.frames += 1;
        let within = us <= self.budget_us;
        if !within {
            self.over_budget += 1;
        }
        within
    }

    /// Reset counters, keeping the budget.
    pub fn reset(&mut self) {
        *self = Self::new(self.budget_us);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

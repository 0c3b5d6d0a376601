//! Runtime configuration

use crate::error::RenderResult;
use serde::Deserialize;
use std::time::Duration;

/// What happens to rendered output when the runtime is unmounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitMode {
    /// Leave everything visible.
    #[default]
    Persist,
    /// Erase the dynamic region and all static lines written.
    Clear,
    /// Erase only the dynamic region.
    ClearDynamic,
}

/// Rendering options. Every key is optional when loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderConfig {
    /// Minimum milliseconds between renders
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// Dynamic region cap before truncation with a marker line; 0 disables
    /// the cap
    #[serde(default = "default_max_dynamic_lines")]
    pub max_dynamic_lines: usize,
    /// Retained static history; unbounded when absent
    #[serde(default)]
    pub max_static_lines: Option<usize>,
    #[serde(default)]
    pub exit_mode: ExitMode,
}

fn default_throttle_ms() -> u64 { 16 }
fn default_max_dynamic_lines() -> usize { 100 }

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 16,
            max_dynamic_lines: 100,
            max_static_lines: None,
            exit_mode: ExitMode::Persist,
        }
    }
}

impl RenderConfig {
    pub fn from_toml_str(source: &str) -> RenderResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn with_throttle_ms(mut self, ms: u64) -> Self {
        self.throttle_ms = ms;
        self
    }

    pub fn with_max_dynamic_lines(mut self, lines: usize) -> Self {
        self.max_dynamic_lines = lines;
        self
    }

    pub fn with_max_static_lines(mut self, lines: usize) -> Self {
        self.max_static_lines = Some(lines);
        self
    }

    pub fn with_exit_mode(mut self, mode: ExitMode) -> Self {
        self.exit_mode = mode;
        self
    }
}

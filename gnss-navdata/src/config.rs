//! Store and decoder configuration
//!
//! [`NavConfig`] holds the emission toggles consumed by format decoders and
//! the validity and type filters applied when messages enter a store. It can
//! be built in code or read from a TOML file.

use crate::types::{NavError, NavMessageType, NavValidity, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Configuration for decoding and storing navigation data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavConfig {
    /// Emit ephemeris messages
    #[serde(default = "default_true")]
    pub process_eph: bool,

    /// Emit almanac, health, time offset and ionospheric messages
    #[serde(default = "default_true")]
    pub process_alm: bool,

    /// Which messages to keep according to their own validity check
    #[serde(default = "default_validity")]
    pub validity: NavValidity,

    /// Message kinds to keep
    #[serde(default = "default_types")]
    pub types: BTreeSet<NavMessageType>,
}

fn default_true() -> bool {
    true
}

fn default_validity() -> NavValidity {
    NavValidity::ValidOnly
}

fn default_types() -> BTreeSet<NavMessageType> {
    NavMessageType::ALL.into_iter().collect()
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            process_eph: true,
            process_alm: true,
            validity: default_validity(),
            types: default_types(),
        }
    }
}

impl NavConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable ephemeris emission
    pub fn with_ephemeris(mut self, enabled: bool) -> Self {
        self.process_eph = enabled;
        self
    }

    /// Builder method: enable or disable almanac/health/time offset emission
    pub fn with_almanac(mut self, enabled: bool) -> Self {
        self.process_alm = enabled;
        self
    }

    /// Builder method: set the validity filter
    pub fn with_validity(mut self, validity: NavValidity) -> Self {
        self.validity = validity;
        self
    }

    /// Builder method: set the message kinds to keep
    pub fn with_types(mut self, types: impl IntoIterator<Item = NavMessageType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    /// Decoder toggles after combining the explicit flags with the type filter
    pub fn effective_toggles(&self) -> (bool, bool) {
        let (eph, alm) = toggles_for_types(&self.types);
        (self.process_eph && eph, self.process_alm && alm)
    }

    /// Check that the configuration can produce any data at all
    pub fn validate(&self) -> Result<()> {
        if self.types.is_empty() {
            return Err(NavError::InvalidConfig("type filter is empty".to_string()));
        }
        Ok(())
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: NavConfig = toml::from_str(content).context("Failed to parse nav config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config file: {:?}", path))
    }
}

/// Decoder toggles implied by a type filter: (ephemeris, almanac-class)
pub fn toggles_for_types(types: &BTreeSet<NavMessageType>) -> (bool, bool) {
    let eph = types.contains(&NavMessageType::Ephemeris);
    let alm = [
        NavMessageType::Almanac,
        NavMessageType::Health,
        NavMessageType::TimeOffset,
        NavMessageType::Iono,
    ]
    .iter()
    .any(|t| types.contains(t));
    (eph, alm)
}

//! Engine configuration

use std::path::{Path, PathBuf};

use hermes_core::Exchange;
use hermes_risk_manager::RiskLimits;
use serde::Deserialize;

/// Configuration for one engine instance
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Which adapter implementation the engine is wired to
    pub exchange: Exchange,
    /// Pre-trade risk limits
    pub risk: RiskLimits,
    /// Directory holding the strategy log and fill journal
    pub data_dir: PathBuf,
    /// Attempts per exchange submission (including the first)
    pub submit_attempts: u32,
}

impl EngineConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_limits(mut self, risk: RiskLimits) -> Self {
        self.risk = risk;
        self
    }

    pub fn strategy_log_path(&self) -> PathBuf {
        self.data_dir.join("strategies.log")
    }

    pub fn fill_journal_path(&self) -> PathBuf {
        self.data_dir.join("fills.log")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exchange: Exchange::Sim,
            risk: RiskLimits::default(),
            data_dir: PathBuf::from("data"),
            submit_attempts: 3,
        }
    }
}

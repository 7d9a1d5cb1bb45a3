use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::sampler::default_workers;

/// Which charts the simulation report renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartSelection {
    Both,
    Freq,
    #[default]
    Sum,
}

impl ChartSelection {
    pub fn shows_frequency(&self) -> bool {
        matches!(self, ChartSelection::Both | ChartSelection::Freq)
    }

    pub fn shows_sum(&self) -> bool {
        matches!(self, ChartSelection::Both | ChartSelection::Sum)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated games (60 choose 6 = 50_063_860 covers every combination).
    pub total_draws: usize,
    /// Worker threads; `None` means host parallelism.
    pub workers: Option<usize>,
    /// Fixed seed for reproducible runs; `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub histogram_bins: usize,
    pub scenario_sizes: Vec<usize>,
    pub show: ChartSelection,
    pub history_path: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_draws: 1_000_000,
            workers: None,
            seed: None,
            histogram_bins: 30,
            scenario_sizes: vec![10_000, 1_000_000],
            show: ChartSelection::Sum,
            history_path: None,
        }
    }
}

impl SimulationConfig {
    pub fn load(path: &Path) -> AnalysisResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::InvalidConfig(format!("leitura de {:?}: {}", path, e))
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> AnalysisResult<Self> {
        let config: SimulationConfig = serde_json::from_str(json)
            .map_err(|e| AnalysisError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if self.workers == Some(0) {
            return Err(AnalysisError::InvalidConfig("workers deve ser >= 1".into()));
        }
        if self.histogram_bins == 0 {
            return Err(AnalysisError::InvalidConfig(
                "histogram_bins deve ser >= 1".into(),
            ));
        }
        Ok(())
    }

    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.total_draws, 1_000_000);
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(config.scenario_sizes, vec![10_000, 1_000_000]);
        assert_eq!(config.show, ChartSelection::Sum);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimulationConfig::from_json(r#"{"total_draws": 5000, "show": "both"}"#).unwrap();
        assert_eq!(config.total_draws, 5000);
        assert_eq!(config.show, ChartSelection::Both);
        assert_eq!(config.histogram_bins, 30);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = SimulationConfig::from_json(r#"{"workers": 0}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(SimulationConfig::from_json("{ total_draws: }").is_err());
    }

    #[test]
    fn test_effective_workers() {
        let config = SimulationConfig {
            workers: Some(3),
            ..Default::default()
        };
        assert_eq!(config.effective_workers(), 3);
        assert!(SimulationConfig::default().effective_workers() >= 1);
    }

    #[test]
    fn test_chart_selection() {
        assert!(ChartSelection::Both.shows_frequency());
        assert!(ChartSelection::Both.shows_sum());
        assert!(!ChartSelection::Sum.shows_frequency());
        assert!(!ChartSelection::Freq.shows_sum());
    }
}

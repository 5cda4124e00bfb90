//! Engine tuning loaded from TOML (all optional): the candidate over-fetch
//! factor and named difficulty-mix presets.
//!
//! See `EngineConfig` for the expected schema.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::MixWeights;

/// Tuning knobs for one engine instance. Defaults are sensible for a
/// repository of a few hundred questions per subject.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Buckets fetch roughly this many times their target to leave room for
  /// shuffling and topic diversity.
  pub overfetch_factor: usize,
  /// Named mixes that override or extend the built-ins in `mix`.
  pub mix_presets: HashMap<String, MixPresetCfg>,
}

/// Mix preset entry accepted in TOML configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct MixPresetCfg {
  pub easy: f64,
  pub medium: f64,
  pub hard: f64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      overfetch_factor: 3,
      mix_presets: HashMap::new(),
    }
  }
}

impl EngineConfig {
  /// Named mix lookup: config entries first, then the built-ins.
  pub fn preset_weights(&self, name: &str) -> Option<MixWeights> {
    if let Some(p) = self.mix_presets.get(name) {
      return Some(MixWeights { easy: p.easy, medium: p.medium, hard: p.hard });
    }
    crate::mix::builtin_preset(name)
  }

  /// Over-fetch factor with a floor of 1 so a zeroed config entry cannot
  /// starve every bucket.
  pub fn overfetch(&self) -> usize {
    self.overfetch_factor.max(1)
  }
}

/// Attempt to load `EngineConfig` from ENGINE_CONFIG_PATH. On any
/// parsing/IO error, returns None and the caller keeps the defaults.
pub fn load_engine_config_from_env() -> Option<EngineConfig> {
  let path = std::env::var("ENGINE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<EngineConfig>(&s) {
      Ok(cfg) => {
        info!(target: "examset", %path, "Loaded engine config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "examset", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "examset", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn toml_overrides_merge_over_defaults() {
    let cfg: EngineConfig = toml::from_str(
      r#"
        overfetch_factor = 5

        [mix_presets.finals_week]
        easy = 0.2
        medium = 0.5
        hard = 0.3
      "#,
    )
    .expect("config");
    assert_eq!(cfg.overfetch(), 5);
    let weights = cfg.preset_weights("finals_week").expect("preset");
    assert_eq!((weights.easy, weights.medium, weights.hard), (0.2, 0.5, 0.3));
    // Built-ins stay reachable.
    assert!(cfg.preset_weights("balanced").is_some());
  }

  #[test]
  fn empty_toml_keeps_defaults() {
    let cfg: EngineConfig = toml::from_str("").expect("config");
    assert_eq!(cfg.overfetch(), 3);
    assert!(cfg.mix_presets.is_empty());
  }

  #[test]
  fn zero_overfetch_is_floored() {
    let cfg: EngineConfig = toml::from_str("overfetch_factor = 0").expect("config");
    assert_eq!(cfg.overfetch(), 1);
  }

  #[test]
  fn env_loader_reads_a_toml_file_and_survives_a_bad_one() {
    // No other test touches ENGINE_CONFIG_PATH, so mutating it here is safe
    // even with the parallel test runner.
    let path = std::env::temp_dir().join("examset-config-test.toml");
    std::fs::write(&path, "overfetch_factor = 7\n").expect("write config");
    std::env::set_var("ENGINE_CONFIG_PATH", &path);
    let cfg = load_engine_config_from_env().expect("config should load");
    assert_eq!(cfg.overfetch(), 7);

    std::fs::write(&path, "overfetch_factor = \"seven\"\n").expect("write config");
    assert!(load_engine_config_from_env().is_none());

    std::env::remove_var("ENGINE_CONFIG_PATH");
    assert!(load_engine_config_from_env().is_none());
    let _ = std::fs::remove_file(&path);
  }
}

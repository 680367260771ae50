//! Step tracker settings, loaded from an optional YAML file.
//!
//! The file is looked up in the working directory as
//! `concise_steps.<env>.yaml` first (when an environment is given or set in
//! `CONCISE_ENV` / `APP_ENV`) and then as `concise_steps.yaml`. A missing
//! file means defaults.
//!
//! ```yaml
//! performance_failure_policy: mark_inconclusive
//! default_max_duration: 2s
//! ```

use crate::error::ConfigError;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const BASE_NAME: &str = "concise_steps";

/// What a context does when every step passed functionally but at least one
/// exceeded its max duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceFailurePolicy {
  /// Fail the test.
  #[default]
  FailTest,
  /// Report the test as inconclusive.
  MarkInconclusive,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepSettings {
  #[serde(default)]
  pub performance_failure_policy: PerformanceFailurePolicy,

  /// Applied to steps declared without their own max duration.
  #[serde(default, deserialize_with = "deserialize_optional_duration")]
  pub default_max_duration: Option<Duration>,
}

static GLOBAL_SETTINGS: Lazy<StepSettings> = Lazy::new(|| match StepSettings::load() {
  Ok(settings) => settings,
  Err(err) => {
    warn!(%err, "ignoring invalid step settings; using defaults");
    StepSettings::default()
  }
});

impl StepSettings {
  pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
    serde_yaml::from_str(yaml).map_err(|e| ConfigError::ConfigParse(e.to_string()))
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let contents = fs::read_to_string(path)?;
    Self::from_yaml_str(&contents).map_err(|err| match err {
      ConfigError::ConfigParse(message) => {
        ConfigError::ConfigParse(format!("{}: {}", path.display(), message))
      }
      other => other,
    })
  }

  /// Finds the settings file in the current directory.
  pub fn find_config_file(environment_suffix: Option<&str>) -> Result<PathBuf, ConfigError> {
    let current_dir = env::current_dir()?;
    Self::find_config_file_in(&current_dir, environment_suffix)
  }

  pub fn find_config_file_in(
    dir: &Path,
    environment_suffix: Option<&str>,
  ) -> Result<PathBuf, ConfigError> {
    let suffix = environment_suffix
      .map(str::to_string)
      .or_else(|| env::var("CONCISE_ENV").ok())
      .or_else(|| env::var("APP_ENV").ok())
      .filter(|suffix| !suffix.is_empty());

    let mut candidates = Vec::with_capacity(2);
    if let Some(suffix) = suffix {
      candidates.push(dir.join(format!("{}.{}.yaml", BASE_NAME, suffix)));
    }
    candidates.push(dir.join(format!("{}.yaml", BASE_NAME)));

    for candidate in &candidates {
      debug!(path = %candidate.display(), "checking for step settings");
      if candidate.is_file() {
        return Ok(candidate.clone());
      }
    }

    Err(ConfigError::ConfigNotFound(format!(
      "no {}.yaml in {}",
      BASE_NAME,
      dir.display()
    )))
  }

  /// Loads settings from the discovered file, or defaults when there is none.
  pub fn load() -> Result<Self, ConfigError> {
    match Self::find_config_file(None) {
      Ok(path) => {
        debug!(path = %path.display(), "loading step settings");
        Self::from_file(&path)
      }
      Err(ConfigError::ConfigNotFound(_)) => Ok(Self::default()),
      Err(err) => Err(err),
    }
  }

  /// Process-wide settings, loaded on first use.
  pub fn global() -> &'static StepSettings {
    &GLOBAL_SETTINGS
  }
}

fn deserialize_optional_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let raw: Option<String> = Option::deserialize(deserializer)?;
  raw
    .map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
    .transpose()
}

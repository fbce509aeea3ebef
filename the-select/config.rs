//! Command configuration, loaded from TOML.
//!
//! ```toml
//! [merge]
//! coalesce-overlapping = true
//!
//! [filter]
//! case-insensitive = false
//! smart-case = true
//! ```

use std::{
  fs,
  io::Error as IOError,
  path::Path,
};

use serde::Deserialize;
use thiserror::Error;
use toml::{
  Value,
  de::Error as TomlError,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
  pub merge:  MergeConfig,
  pub filter: FilterConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct MergeConfig {
  /// Merge overlapping selections before joining selections across line
  /// breaks. Hosts that already merge overlaps on their own can turn this off.
  pub coalesce_overlapping: bool,
}

impl Default for MergeConfig {
  fn default() -> Self {
    Self {
      coalesce_overlapping: true,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilterConfig {
  /// Always match patterns case-insensitively.
  pub case_insensitive: bool,
  /// Match case-insensitively unless the pattern contains an uppercase char.
  pub smart_case:       bool,
}

impl Default for FilterConfig {
  fn default() -> Self {
    Self {
      case_insensitive: false,
      smart_case:       true,
    }
  }
}

impl FilterConfig {
  pub fn is_case_insensitive(&self, pattern: &str) -> bool {
    self.case_insensitive || (self.smart_case && !pattern.chars().any(char::is_uppercase))
  }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
  #[error("failed to parse config: {0}")]
  BadConfig(#[from] TomlError),
  #[error("failed to read config: {0}")]
  Error(#[from] IOError),
}

impl Config {
  pub fn from_toml(contents: &str) -> Result<Config, ConfigLoadError> {
    Ok(toml::from_str(contents)?)
  }

  /// Loads a global and a workspace-local config. Keys set locally win.
  ///
  /// A source that failed to read is skipped; a source that failed to parse
  /// fails the whole load.
  pub fn load(
    global: Result<String, ConfigLoadError>,
    local: Result<String, ConfigLoadError>,
  ) -> Result<Config, ConfigLoadError> {
    let global: Result<Value, ConfigLoadError> =
      global.and_then(|file| toml::from_str(&file).map_err(ConfigLoadError::BadConfig));
    let local: Result<Value, ConfigLoadError> =
      local.and_then(|file| toml::from_str(&file).map_err(ConfigLoadError::BadConfig));

    let value = match (global, local) {
      (Ok(global), Ok(local)) => merge_toml_values(global, local, 2),
      (_, Err(ConfigLoadError::BadConfig(err))) | (Err(ConfigLoadError::BadConfig(err)), _) => {
        return Err(ConfigLoadError::BadConfig(err));
      },
      (Ok(config), Err(_)) | (Err(_), Ok(config)) => config,
      (Err(_), Err(_)) => {
        tracing::debug!("no config found, using defaults");
        return Ok(Config::default());
      },
    };

    Ok(value.try_into()?)
  }

  pub fn load_file(path: impl AsRef<Path>) -> Result<Config, ConfigLoadError> {
    let contents = fs::read_to_string(path)?;
    Self::from_toml(&contents)
  }
}

/// Merges `right` into `left`, recursing into tables up to `merge_depth`
/// levels. Anything else is replaced by the right value.
fn merge_toml_values(left: Value, right: Value, merge_depth: usize) -> Value {
  match (left, right) {
    (Value::Table(mut left_map), Value::Table(right_map)) if merge_depth > 0 => {
      for (rname, rvalue) in right_map {
        let merged = match left_map.remove(&rname) {
          Some(lvalue) => merge_toml_values(lvalue, rvalue, merge_depth - 1),
          None => rvalue,
        };
        left_map.insert(rname, merged);
      }
      Value::Table(left_map)
    },
    (_, value) => value,
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::from_toml("").unwrap();
    assert_eq!(config, Config::default());
    assert!(config.merge.coalesce_overlapping);
    assert!(config.filter.smart_case);
    assert!(!config.filter.case_insensitive);
  }

  #[test]
  fn test_parse() {
    let config = Config::from_toml(
      r#"
      [merge]
      coalesce-overlapping = false

      [filter]
      smart-case = false
      "#,
    )
    .unwrap();
    assert!(!config.merge.coalesce_overlapping);
    assert!(!config.filter.smart_case);
  }

  #[test]
  fn test_unknown_field() {
    let err = Config::from_toml("[merge]\ncoalesce = true\n").unwrap_err();
    assert!(matches!(err, ConfigLoadError::BadConfig(_)));
  }

  #[test]
  fn test_load_local_overrides_global() {
    let global = Ok("[filter]\ncase-insensitive = true\nsmart-case = false\n".to_string());
    let local = Ok("[filter]\nsmart-case = true\n".to_string());
    let config = Config::load(global, local).unwrap();
    assert!(config.filter.case_insensitive);
    assert!(config.filter.smart_case);
    assert!(config.merge.coalesce_overlapping);
  }

  #[test]
  fn test_load_missing_sources() {
    let missing = || Err(ConfigLoadError::Error(IOError::from(std::io::ErrorKind::NotFound)));

    assert_eq!(Config::load(missing(), missing()).unwrap(), Config::default());

    let local = Ok("[merge]\ncoalesce-overlapping = false\n".to_string());
    let config = Config::load(missing(), local).unwrap();
    assert!(!config.merge.coalesce_overlapping);

    let bad = Ok("[merge\n".to_string());
    assert!(matches!(
      Config::load(bad, missing()),
      Err(ConfigLoadError::BadConfig(_))
    ));
  }

  #[test]
  fn test_smart_case() {
    let filter = FilterConfig::default();
    assert!(filter.is_case_insensitive("foo"));
    assert!(!filter.is_case_insensitive("Foo"));

    let filter = FilterConfig {
      case_insensitive: true,
      smart_case:       false,
    };
    assert!(filter.is_case_insensitive("Foo"));

    let filter = FilterConfig {
      case_insensitive: false,
      smart_case:       false,
    };
    assert!(!filter.is_case_insensitive("foo"));
  }
}

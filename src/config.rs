//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/classtree/classtree.toml`
//! 3. Local config: `<project_dir>/.classtree.toml`
//! 4. Environment variables: `CLASSTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Unified configuration for classtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Name of the root node when the rule set does not name one
    pub root_name: String,
    /// Rule-set file used when none is given on the command line
    pub rules_file: Option<PathBuf>,
    /// List records beneath their nodes in tree output
    pub show_data: bool,
    /// Show subtree record counts next to node names
    pub record_count: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_name: "root".into(),
            rules_file: None,
            show_data: false,
            record_count: true,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_name: Option<String>,
    pub rules_file: Option<PathBuf>,
    pub show_data: Option<bool>,
    pub record_count: Option<bool>,
}

/// Get the XDG config directory for classtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "classtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("classtree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".classtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    ///
    /// A relative rules file is resolved against `base` (the directory of
    /// the config that named it, or the project directory).
    fn expand_paths(&mut self, base: Option<&Path>) {
        if let Some(rules) = &self.rules_file {
            let expanded = PathBuf::from(expand_path(rules.to_string_lossy().as_ref()));
            self.rules_file = Some(match base {
                Some(dir) if expanded.is_relative() => dir.join(expanded),
                _ => expanded,
            });
        }
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_name: overlay
                .root_name
                .clone()
                .unwrap_or_else(|| self.root_name.clone()),
            rules_file: overlay
                .rules_file
                .clone()
                .or_else(|| self.rules_file.clone()),
            show_data: overlay.show_data.unwrap_or(self.show_data),
            record_count: overlay.record_count.unwrap_or(self.record_count),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory holding `.classtree.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
                current.expand_paths(global_path.parent());
            }
        }

        // 3. Project-local config
        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
                current.expand_paths(Some(dir));
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;
        current.expand_paths(project_dir);

        Ok(current)
    }

    /// Apply CLASSTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(Environment::with_prefix("CLASSTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root_name") {
            settings.root_name = val;
        }
        if let Ok(val) = config.get_string("rules_file") {
            settings.rules_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("show_data") {
            settings.show_data = val;
        }
        if let Ok(val) = config.get_bool("record_count") {
            settings.record_count = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# classtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/classtree/classtree.toml
#   Local:  <project_dir>/.classtree.toml
#   Env:    CLASSTREE_* environment variables (explicit overrides)

# Root node name when the rule set does not define `root`
# root_name = "root"

# Default rule-set file (relative paths resolve against this file's directory)
# rules_file = "rules.toml"

# List records beneath their nodes in `classtree tree`
# show_data = false

# Show subtree record counts next to node names
# record_count = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_created_then_has_expected_values() {
        let settings = Settings::default();
        assert_eq!(settings.root_name, "root");
        assert!(settings.rules_file.is_none());
        assert!(!settings.show_data);
        assert!(settings.record_count);
    }

    #[test]
    fn given_overlay_when_merging_then_specified_fields_win() {
        let base = Settings::default();
        let overlay = RawSettings {
            root_name: Some("customers".into()),
            rules_file: None,
            show_data: Some(true),
            record_count: None,
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.root_name, "customers");
        assert!(merged.rules_file.is_none());
        assert!(merged.show_data);
        assert!(merged.record_count);
    }

    #[test]
    fn given_relative_rules_file_when_expand_paths_then_resolves_against_base() {
        let mut settings = Settings {
            rules_file: Some(PathBuf::from("rules.toml")),
            ..Settings::default()
        };

        settings.expand_paths(Some(Path::new("/projects/demo")));

        assert_eq!(
            settings.rules_file,
            Some(PathBuf::from("/projects/demo/rules.toml"))
        );
    }

    #[test]
    fn given_tilde_in_rules_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            rules_file: Some(PathBuf::from("~/rules.toml")),
            ..Settings::default()
        };

        settings.expand_paths(None);

        let home = std::env::var("HOME").expect("HOME should be set");
        let rules = settings.rules_file.unwrap();
        assert!(rules.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("parse template");
        assert!(raw.root_name.is_none());
    }
}

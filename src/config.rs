//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/scenetree/scenetree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `SCENETREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Unified configuration for scenetree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Identifier and object name of the root node (default: "scene")
    pub root_id: String,
    /// Give components declared without an object one named after their id
    pub implicit_objects: bool,
    /// Treat orphaned nodes and rejected registrations as a failed mount
    pub strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_id: "scene".into(),
            implicit_objects: false,
            strict: false,
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_id: Option<String>,
    pub implicit_objects: Option<bool>,
    pub strict: Option<bool>,
}

/// Get the XDG config directory for scenetree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "scenetree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("scenetree.toml"))
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

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_id: overlay
                .root_id
                .clone()
                .unwrap_or_else(|| self.root_id.clone()),
            implicit_objects: overlay.implicit_objects.unwrap_or(self.implicit_objects),
            strict: overlay.strict.unwrap_or(self.strict),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; must exist when given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config, if present
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit config file
        if let Some(path) = config_file {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables (explicit override)
        Self::apply_env_overrides(current)
    }

    /// Apply SCENETREE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("SCENETREE").try_parsing(true))
            .build()
            .map_err(config_err)?;
        Ok(Self::apply_config(settings, &config))
    }

    fn apply_config(mut settings: Self, config: &Config) -> Self {
        if let Ok(val) = config.get_string("root_id") {
            settings.root_id = val;
        }
        if let Ok(val) = config.get_bool("implicit_objects") {
            settings.implicit_objects = val;
        }
        if let Ok(val) = config.get_bool("strict") {
            settings.strict = val;
        }
        settings
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# scenetree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/scenetree/scenetree.toml
#   File:   --config <file>
#   Env:    SCENETREE_* environment variables

# Identifier (and object name) of the root every parentless node attaches to
# root_id = "scene"

# Create a scene object, named after the node id, for nodes declared without one
# implicit_objects = false

# Fail the mount when a node is orphaned or an id is registered twice
# strict = false
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
    use std::io::Write;

    use config::File;
    use tempfile::NamedTempFile;

    #[test]
    fn given_defaults_when_created_then_root_is_scene() {
        let settings = Settings::default();
        assert_eq!(settings.root_id, "scene");
        assert!(!settings.implicit_objects);
        assert!(!settings.strict);
    }

    #[test]
    fn given_explicit_file_when_loading_then_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "root_id = \"world\"\nstrict = true").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.root_id, "world");
        assert!(settings.strict);
    }

    #[test]
    fn given_missing_explicit_file_when_loading_then_config_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/scenetree.toml"))).unwrap_err();
        assert!(matches!(err, ApplicationError::Config { .. }));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_fields() {
        let base = Settings {
            root_id: "world".into(),
            implicit_objects: true,
            strict: false,
        };
        let overlay = RawSettings {
            strict: Some(true),
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.root_id, "world");
        assert!(merged.implicit_objects);
        assert!(merged.strict);
    }

    #[test]
    fn given_config_source_when_applying_then_values_replace_settings() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "implicit_objects = true\nroot_id = \"stage\"").unwrap();
        let config = Config::builder()
            .add_source(File::from(file.path()))
            .build()
            .unwrap();

        let settings = Settings::apply_config(Settings::default(), &config);

        assert_eq!(settings.root_id, "stage");
        assert!(settings.implicit_objects);
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips_through_template_keys() {
        let toml = Settings::default().to_toml().unwrap();
        assert!(toml.contains("root_id = \"scene\""));
        assert!(Settings::template().contains("# root_id"));
    }
}

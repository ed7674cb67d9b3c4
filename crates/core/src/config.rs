//! Mixer configuration.
//!
//! The plugin takes no host parameters, so the transition to run comes from
//! a JSON file named by `GLMIX_CONFIG`, overridden field by field by the
//! `GLMIX_SHADER`, `GLMIX_TRANSITION` and `GLMIX_LOG` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::builtin;
use crate::error::MixError;
use crate::shader::{Dialect, FragmentShader};

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV: &str = "GLMIX_CONFIG";
/// Environment variable naming a fragment shader file.
pub const SHADER_ENV: &str = "GLMIX_SHADER";
/// Environment variable naming a builtin transition.
pub const TRANSITION_ENV: &str = "GLMIX_TRANSITION";
/// Environment variable holding a log filter directive.
pub const LOG_ENV: &str = "GLMIX_LOG";

/// Default log filter when neither environment nor config set one.
pub const DEFAULT_LOG: &str = "warn";

fn default_log() -> String {
    DEFAULT_LOG.to_string()
}

/// Which transition the mixer runs, and how loudly it logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MixerConfig {
    /// Builtin transition name. Ignored when `shader` is set.
    #[serde(default)]
    pub transition: Option<String>,
    /// Path to a fragment shader source file.
    #[serde(default)]
    pub shader: Option<PathBuf>,
    /// Dialect of `shader`; detected from its `#version` line when absent.
    #[serde(default)]
    pub dialect: Option<Dialect>,
    /// `tracing` filter directive.
    #[serde(default = "default_log")]
    pub log: String,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            transition: None,
            shader: None,
            dialect: None,
            log: default_log(),
        }
    }
}

impl MixerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, MixError> {
        serde_json::from_str(json).map_err(|e| MixError::Config(e.to_string()))
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, MixError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MixError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, MixError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MixError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = match var(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(shader) = var(SHADER_ENV) {
            config.shader = Some(PathBuf::from(shader));
        }
        if let Some(transition) = var(TRANSITION_ENV) {
            config.transition = Some(transition);
        }
        if let Some(log) = var(LOG_ENV) {
            config.log = log;
        }
        Ok(config)
    }

    /// Resolves the fragment shader this configuration selects.
    ///
    /// A shader file wins over a transition name; with neither set the
    /// default builtin is used.
    pub fn resolve_shader(&self) -> Result<FragmentShader, MixError> {
        if let Some(path) = &self.shader {
            let source = std::fs::read_to_string(path)
                .map_err(|e| MixError::Io(format!("{}: {e}", path.display())))?;
            return Ok(match self.dialect {
                Some(Dialect::Native) => FragmentShader::native(source),
                Some(Dialect::WebGl) => FragmentShader::webgl(source),
                None => FragmentShader::detect(source),
            });
        }
        let name = self
            .transition
            .as_deref()
            .unwrap_or(builtin::DEFAULT_TRANSITION);
        builtin::from_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn default_runs_fade_at_warn() {
        let config = MixerConfig::default();
        assert_eq!(config.log, "warn");
        let shader = config.resolve_shader().unwrap();
        assert_eq!(shader, builtin::from_name("fade").unwrap());
    }

    #[test]
    fn empty_json_object_uses_defaults() {
        let config = MixerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, MixerConfig::default());
    }

    #[test]
    fn json_fields_are_parsed() {
        let config = MixerConfig::from_json_str(
            r#"{"transition": "wipe", "dialect": "webgl", "log": "debug"}"#,
        )
        .unwrap();
        assert_eq!(config.transition.as_deref(), Some("wipe"));
        assert_eq!(config.dialect, Some(Dialect::WebGl));
        assert_eq!(config.log, "debug");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = MixerConfig::from_json_str(r#"{"transtion": "wipe"}"#).unwrap_err();
        assert!(matches!(err, MixError::Config(_)), "got {err:?}");
    }

    #[test]
    fn load_reports_missing_file_as_io() {
        let err = MixerConfig::load(Path::new("/nonexistent/glmix.json")).unwrap_err();
        assert!(matches!(err, MixError::Io(_)), "got {err:?}");
    }

    #[test]
    fn environment_overrides_config_file() {
        let file = write_temp(r#"{"transition": "wipe", "log": "info"}"#);
        let path = file.path().to_string_lossy().into_owned();
        let config = MixerConfig::from_lookup(lookup(&[
            (CONFIG_ENV, path.as_str()),
            (TRANSITION_ENV, "circle"),
        ]))
        .unwrap();
        assert_eq!(config.transition.as_deref(), Some("circle"));
        assert_eq!(config.log, "info");
    }

    #[test]
    fn empty_variables_count_as_unset() {
        let config =
            MixerConfig::from_lookup(lookup(&[(CONFIG_ENV, ""), (LOG_ENV, "  ")])).unwrap();
        assert_eq!(config, MixerConfig::default());
    }

    #[test]
    fn unknown_transition_fails_to_resolve() {
        let config = MixerConfig {
            transition: Some("spiral".into()),
            ..MixerConfig::default()
        };
        assert!(matches!(
            config.resolve_shader(),
            Err(MixError::UnknownTransition(_))
        ));
    }

    #[test]
    fn shader_file_wins_and_dialect_is_detected() {
        let file = write_temp("void main() { gl_FragColor = vec4(1.0); }\n");
        let config = MixerConfig {
            transition: Some("wipe".into()),
            shader: Some(file.path().to_path_buf()),
            ..MixerConfig::default()
        };
        let shader = config.resolve_shader().unwrap();
        assert_eq!(shader.dialect(), Dialect::WebGl);
        assert!(shader.source().contains("gl_FragColor"));
    }

    #[test]
    fn explicit_dialect_overrides_detection() {
        let file = write_temp("void main() {}\n");
        let config = MixerConfig {
            shader: Some(file.path().to_path_buf()),
            dialect: Some(Dialect::Native),
            ..MixerConfig::default()
        };
        assert_eq!(config.resolve_shader().unwrap().dialect(), Dialect::Native);
    }
}

//! Shader diagnostics and fragment source descriptions.
//!
//! Everything here is pure string processing; the GL side of the pipeline
//! lives in `render::program`. A [`FragmentShader`] carries the source text
//! together with the [`Dialect`] it is written in, so the pipeline knows
//! whether it must run the translation step first.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Programmable stage a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors that can occur while turning shader text into a linked program.
#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    /// The portable-dialect source could not be translated.
    #[error("shader translation error:\n{0}")]
    TranslateError(String),
    /// A shader stage failed to compile.
    #[error("shader compile error ({stage}):\n{log}")]
    CompileError {
        /// The shader stage that failed.
        stage: ShaderStage,
        /// The driver's info log, prefixed with the numbered source.
        log: String,
    },
    /// The program failed to link.
    #[error("shader link error:\n{0}")]
    LinkError(String),
}

/// Formats a shader compilation error for human-readable debugging.
///
/// Prepends right-aligned line numbers to each line of `source`, then
/// appends the driver's error `log`, so driver messages that reference line
/// numbers can be matched against the GLSL that was actually compiled
/// (which, after translation, differs from what the user wrote).
pub fn format_shader_error(source: &str, log: &str) -> String {
    let source_lines: Vec<&str> = source.lines().collect();
    let width = source_lines.len().max(1).to_string().len();

    let numbered = source_lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    match (numbered.is_empty(), log.is_empty()) {
        (true, true) => String::new(),
        (true, false) => log.to_string(),
        (false, true) => numbered,
        (false, false) => format!("{numbered}\n\n{log}"),
    }
}

/// Shading language flavour a fragment source is written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Desktop GLSL 1.50 core, compiled as-is.
    #[default]
    Native,
    /// WebGL / GLSL ES 1.00 transition source (glsl.io style), translated
    /// before compilation.
    #[serde(rename = "webgl")]
    WebGl,
}

impl Dialect {
    /// Guesses the dialect of `source` from its `#version` directive.
    ///
    /// Sources declaring version 150 or later are native; everything else
    /// (no directive, `#version 100`, `#version 300 es`) is treated as WebGL.
    pub fn detect(source: &str) -> Dialect {
        let version = source
            .lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix("#version"))
            .map(str::trim);

        match version {
            Some(rest) if !rest.ends_with("es") => {
                let number = rest.split_whitespace().next().unwrap_or("");
                match number.parse::<u32>() {
                    Ok(v) if v >= 150 => Dialect::Native,
                    _ => Dialect::WebGl,
                }
            }
            _ => Dialect::WebGl,
        }
    }

    /// Parses a dialect name as used in configuration and on the CLI.
    pub fn from_name(name: &str) -> Option<Dialect> {
        match name {
            "native" | "glsl" => Some(Dialect::Native),
            "webgl" | "gles" => Some(Dialect::WebGl),
            _ => None,
        }
    }
}

/// Fragment source text plus the dialect it is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentShader {
    source: String,
    dialect: Dialect,
}

impl FragmentShader {
    /// Wraps source already written in native GLSL 1.50 core.
    pub fn native(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dialect: Dialect::Native,
        }
    }

    /// Wraps a WebGL-dialect transition that must be translated first.
    pub fn webgl(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dialect: Dialect::WebGl,
        }
    }

    /// Wraps `source`, choosing the dialect with [`Dialect::detect`].
    pub fn detect(source: impl Into<String>) -> Self {
        let source = source.into();
        let dialect = Dialect::detect(&source);
        Self { source, dialect }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- format_shader_error ---

    #[test]
    fn format_shader_error_prepends_line_numbers() {
        let source = "#version 150 core\nvoid main() {\n}\n";
        let log = "ERROR: 0:2: syntax error";
        let formatted = format_shader_error(source, log);

        assert!(formatted.contains("1: #version 150 core"), "got:\n{formatted}");
        assert!(formatted.contains("2: void main() {"), "got:\n{formatted}");
        assert!(formatted.contains("3: }"), "got:\n{formatted}");
        assert!(formatted.ends_with(log), "got:\n{formatted}");
    }

    #[test]
    fn format_shader_error_handles_empty_inputs() {
        assert_eq!(format_shader_error("", "some error"), "some error");
        assert_eq!(format_shader_error("void main() {}", ""), "1: void main() {}");
        assert!(format_shader_error("", "").is_empty());
    }

    #[test]
    fn format_shader_error_right_aligns_line_numbers() {
        let source = (1..=12)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let formatted = format_shader_error(&source, "err");
        let lines: Vec<&str> = formatted.lines().collect();

        assert!(lines[0].starts_with(" 1: "), "got: '{}'", lines[0]);
        assert!(lines[9].starts_with("10: "), "got: '{}'", lines[9]);
    }

    // --- ShaderError ---

    #[test]
    fn compile_error_display_includes_stage_and_log() {
        let err = ShaderError::CompileError {
            stage: ShaderStage::Fragment,
            log: "undeclared identifier".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("fragment"), "missing stage in: {msg}");
        assert!(msg.contains("undeclared identifier"), "missing log in: {msg}");
    }

    #[test]
    fn translate_error_display_includes_reason() {
        let msg = ShaderError::TranslateError("no main".into()).to_string();
        assert!(msg.contains("translation"), "got: {msg}");
        assert!(msg.contains("no main"), "got: {msg}");
    }

    // --- Dialect ---

    #[test]
    fn detect_treats_missing_version_as_webgl() {
        let src = "uniform sampler2D from, to;\nvoid main() { gl_FragColor = vec4(1.0); }";
        assert_eq!(Dialect::detect(src), Dialect::WebGl);
    }

    #[test]
    fn detect_recognizes_core_profile_sources() {
        assert_eq!(Dialect::detect("#version 150 core\nvoid main() {}"), Dialect::Native);
        assert_eq!(Dialect::detect("  #version 330\nvoid main() {}"), Dialect::Native);
    }

    #[test]
    fn detect_treats_es_and_legacy_versions_as_webgl() {
        assert_eq!(Dialect::detect("#version 100\n"), Dialect::WebGl);
        assert_eq!(Dialect::detect("#version 300 es\n"), Dialect::WebGl);
        assert_eq!(Dialect::detect("#version 120\n"), Dialect::WebGl);
    }

    #[test]
    fn dialect_names_parse() {
        assert_eq!(Dialect::from_name("native"), Some(Dialect::Native));
        assert_eq!(Dialect::from_name("webgl"), Some(Dialect::WebGl));
        assert_eq!(Dialect::from_name("hlsl"), None);
    }

    #[test]
    fn dialect_serializes_as_snake_case_names() {
        assert_eq!(serde_json::to_string(&Dialect::WebGl).unwrap(), "\"webgl\"");
        let parsed: Dialect = serde_json::from_str("\"native\"").unwrap();
        assert_eq!(parsed, Dialect::Native);
    }

    #[test]
    fn fragment_shader_detect_keeps_source() {
        let shader = FragmentShader::detect("#version 150 core\nvoid main() {}");
        assert_eq!(shader.dialect(), Dialect::Native);
        assert!(shader.source().starts_with("#version 150"));
    }
}

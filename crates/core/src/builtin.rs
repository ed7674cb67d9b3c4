//! Builtin transition shaders, addressable by name.
//!
//! All builtins are native GLSL 1.50 core sources using the standard
//! `from` / `to` / `progress` / `resolution` interface.

use crate::error::MixError;
use crate::shader::FragmentShader;

/// All builtin transition names.
const TRANSITION_NAMES: &[&str] = &["fade", "wipe", "circle"];

/// Name of the transition used when nothing else is configured.
pub const DEFAULT_TRANSITION: &str = "fade";

/// Linear cross-fade: `mix(from, to, progress)`.
pub const FADE: &str = r#"#version 150 core
out vec4 color;
uniform sampler2D from, to;
uniform float progress;
uniform vec2 resolution;
void main() {
    vec2 p = gl_FragCoord.xy / resolution.xy;
    color = mix(texture(from, p), texture(to, p), progress);
}
"#;

/// Hard-edged wipe from left to right.
pub const WIPE: &str = r#"#version 150 core
out vec4 color;
uniform sampler2D from, to;
uniform float progress;
uniform vec2 resolution;
void main() {
    vec2 p = gl_FragCoord.xy / resolution.xy;
    color = p.x < progress ? texture(to, p) : texture(from, p);
}
"#;

/// Circle opening from the centre, aspect-corrected.
pub const CIRCLE: &str = r#"#version 150 core
out vec4 color;
uniform sampler2D from, to;
uniform float progress;
uniform vec2 resolution;
void main() {
    vec2 p = gl_FragCoord.xy / resolution.xy;
    vec2 d = (p - 0.5) * vec2(resolution.x / resolution.y, 1.0);
    float radius = progress * length(vec2(resolution.x / resolution.y, 1.0)) * 0.5;
    color = length(d) <= radius ? texture(to, p) : texture(from, p);
}
"#;

/// Looks up a builtin transition by name.
pub fn from_name(name: &str) -> Result<FragmentShader, MixError> {
    let source = match name {
        "fade" => FADE,
        "wipe" => WIPE,
        "circle" => CIRCLE,
        _ => return Err(MixError::UnknownTransition(name.to_string())),
    };
    Ok(FragmentShader::native(source))
}

/// Returns a slice of all builtin transition names.
pub fn list() -> &'static [&'static str] {
    TRANSITION_NAMES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fullscreen::{FROM_SAMPLER, PROGRESS_UNIFORM, RESOLUTION_UNIFORM, TO_SAMPLER};
    use crate::shader::Dialect;

    #[test]
    fn every_listed_name_resolves() {
        for name in list() {
            let shader = from_name(name).unwrap();
            assert_eq!(shader.dialect(), Dialect::Native, "{name}");
            assert_eq!(Dialect::detect(shader.source()), Dialect::Native, "{name}");
        }
    }

    #[test]
    fn unknown_name_returns_error() {
        assert!(matches!(
            from_name("spiral"),
            Err(MixError::UnknownTransition(n)) if n == "spiral"
        ));
    }

    #[test]
    fn default_transition_is_listed() {
        assert!(list().contains(&DEFAULT_TRANSITION));
    }

    #[test]
    fn builtins_declare_the_standard_interface() {
        for name in list() {
            let source = from_name(name).unwrap().source().to_string();
            for uniform in [FROM_SAMPLER, TO_SAMPLER, PROGRESS_UNIFORM, RESOLUTION_UNIFORM] {
                assert!(source.contains(uniform), "{name} lacks {uniform}");
            }
        }
    }
}

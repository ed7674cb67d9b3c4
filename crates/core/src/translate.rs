//! Translation of portable (WebGL) transition sources into native GLSL.
//!
//! The pipeline treats translation as a pure function: text in, native text
//! or a diagnostic out. [`WebGlTranslator`] handles the two shapes of
//! portable transition source found in the wild:
//!
//! - glsl.io style: a complete GLSL ES 1.00 fragment shader with `main()`,
//!   `gl_FragColor`, `texture2D` and `uniform sampler2D from, to`.
//! - gl-transitions style: a `vec4 transition(vec2 uv)` function using
//!   `getFromColor` / `getToColor` / `ratio`, with tunables declared as
//!   `uniform float name; // = default`.
//!
//! Both shapes write color through `gl_FragColor` or a returned `vec4`. A
//! source declaring its own `out` variable (GLSL ES 3.00 and later) is
//! rejected, since the translated shader supplies the only fragment output.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

use crate::shader::{Dialect, FragmentShader, ShaderError};

/// Converts shader text from a portable dialect to native GLSL 1.50 core.
pub trait ShaderTranslator: Send + Sync {
    fn translate(&self, source: &str) -> Result<String, ShaderError>;
}

impl<F> ShaderTranslator for F
where
    F: Fn(&str) -> Result<String, ShaderError> + Send + Sync,
{
    fn translate(&self, source: &str) -> Result<String, ShaderError> {
        self(source)
    }
}

/// Returns the translator a dialect needs, or `None` for native sources.
pub fn translator_for(dialect: Dialect) -> Option<&'static dyn ShaderTranslator> {
    match dialect {
        Dialect::Native => None,
        Dialect::WebGl => Some(&WebGlTranslator),
    }
}

/// Produces the native source for `shader`, translating when needed.
pub fn native_source(shader: &FragmentShader) -> Result<Cow<'_, str>, ShaderError> {
    match translator_for(shader.dialect()) {
        None => Ok(Cow::Borrowed(shader.source())),
        Some(translator) => translator.translate(shader.source()).map(Cow::Owned),
    }
}

/// Name of the fragment output that replaces `gl_FragColor`.
pub const FRAG_OUTPUT: &str = "glmix_FragColor";

const NATIVE_HEADER: &str = "#version 150 core\nout vec4 glmix_FragColor;\n";

const TRANSITION_PRELUDE: &str = "\
uniform sampler2D from, to;
uniform float progress;
uniform vec2 resolution;
#define ratio (resolution.x / resolution.y)
vec4 getFromColor(vec2 uv) { return texture(from, uv); }
vec4 getToColor(vec2 uv) { return texture(to, uv); }
";

const TRANSITION_MAIN: &str =
    "void main() { glmix_FragColor = transition(gl_FragCoord.xy / resolution); }\n";

static VERSION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#version[^\n]*\n?").expect("valid regex"));
static MAIN_FN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bvoid\s+main\s*\(").expect("valid regex"));
static TRANSITION_FN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bvec4\s+transition\s*\(").expect("valid regex"));
static OUTPUT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:layout\s*\([^)]*\)\s*)?out\s+\w+").expect("valid regex")
});
static UNIFORM_DEFAULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*uniform\s+(\w+)\s+(\w+)\s*;\s*//\s*=\s*(.+?)\s*;?[ \t]*$")
        .expect("valid regex")
});

/// Word-level renames from GLSL ES 1.00 to GLSL 1.50 core.
const RENAMES: &[(&str, &str)] = &[
    ("gl_FragColor", FRAG_OUTPUT),
    ("texture2DProj", "textureProj"),
    ("texture2D", "texture"),
    ("textureCube", "texture"),
    ("varying", "in"),
];

static RENAME_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    RENAMES
        .iter()
        .filter_map(|(from, to)| {
            Regex::new(&format!(r"\b{from}\b"))
                .ok()
                .map(|re| (re, *to))
        })
        .collect()
});

/// Translator for glsl.io and gl-transitions style WebGL sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebGlTranslator;

impl ShaderTranslator for WebGlTranslator {
    fn translate(&self, source: &str) -> Result<String, ShaderError> {
        if let Some(decl) = OUTPUT_DECL.find(source) {
            return Err(ShaderError::TranslateError(format!(
                "source declares its own fragment output `{}`",
                decl.as_str().trim()
            )));
        }

        let body = VERSION_LINE.replace_all(source, "");
        let body = rename_builtins(&body);

        if MAIN_FN.is_match(&body) {
            return Ok(format!("{NATIVE_HEADER}{body}\n"));
        }

        if TRANSITION_FN.is_match(&body) {
            let body = UNIFORM_DEFAULT.replace_all(&body, "const $1 $2 = $1($3);");
            return Ok(format!(
                "{NATIVE_HEADER}{TRANSITION_PRELUDE}{body}\n{TRANSITION_MAIN}"
            ));
        }

        Err(ShaderError::TranslateError(
            "source defines neither main() nor vec4 transition(vec2)".to_string(),
        ))
    }
}

fn rename_builtins(source: &str) -> String {
    RENAME_PATTERNS
        .iter()
        .fold(source.to_string(), |acc, (re, to)| {
            re.replace_all(&acc, *to).into_owned()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLSL_IO_FADE: &str = "\
#ifdef GL_ES
precision highp float;
#endif
uniform sampler2D from, to;
uniform float progress;
uniform vec2 resolution;

void main() {
  vec2 p = gl_FragCoord.xy / resolution.xy;
  gl_FragColor = mix(texture2D(from, p), texture2D(to, p), progress);
}
";

    const GL_TRANSITION_WIPE: &str = "\
uniform vec2 direction; // = vec2(1.0, 0.0)
uniform float smoothness; // = 0.5

vec4 transition(vec2 uv) {
  float m = smoothstep(-smoothness, 0.0, uv.x - progress * (1.0 + smoothness));
  return mix(getToColor(uv), getFromColor(uv), m);
}
";

    #[test]
    fn translates_glsl_io_source_to_core_profile() {
        let out = WebGlTranslator.translate(GLSL_IO_FADE).unwrap();
        assert!(out.starts_with("#version 150 core\n"), "got:\n{out}");
        assert!(out.contains("out vec4 glmix_FragColor;"), "got:\n{out}");
        assert!(out.contains("glmix_FragColor = mix(texture(from, p), texture(to, p), progress);"));
        assert!(!out.contains("gl_FragColor"), "leftover builtin in:\n{out}");
        assert!(!out.contains("texture2D"), "leftover texture2D in:\n{out}");
    }

    #[test]
    fn strips_existing_version_directive() {
        let src = "#version 100\nvoid main() { gl_FragColor = vec4(0.0); }";
        let out = WebGlTranslator.translate(src).unwrap();
        assert_eq!(out.matches("#version").count(), 1, "got:\n{out}");
        assert!(!out.contains("#version 100"));
    }

    #[test]
    fn renames_whole_words_only() {
        let src = "varying vec2 uv; float my_texture2Dx = 1.0; void main() { gl_FragColor = texture2D(from, uv); }";
        let out = WebGlTranslator.translate(src).unwrap();
        assert!(out.contains("in vec2 uv;"), "got:\n{out}");
        assert!(out.contains("my_texture2Dx"), "identifier mangled in:\n{out}");
        assert!(out.contains("= texture(from, uv)"), "got:\n{out}");
    }

    #[test]
    fn wraps_transition_function_with_prelude_and_main() {
        let out = WebGlTranslator.translate(GL_TRANSITION_WIPE).unwrap();
        assert!(out.contains("uniform sampler2D from, to;"), "got:\n{out}");
        assert!(out.contains("vec4 getFromColor(vec2 uv)"), "got:\n{out}");
        assert!(out.trim_end().ends_with(
            "void main() { glmix_FragColor = transition(gl_FragCoord.xy / resolution); }"
        ));
    }

    #[test]
    fn uniform_defaults_become_constants() {
        let out = WebGlTranslator.translate(GL_TRANSITION_WIPE).unwrap();
        assert!(
            out.contains("const vec2 direction = vec2(vec2(1.0, 0.0));"),
            "got:\n{out}"
        );
        assert!(out.contains("const float smoothness = float(0.5);"), "got:\n{out}");
        assert!(!out.contains("uniform float smoothness"), "got:\n{out}");
    }

    #[test]
    fn rejects_source_without_entry_point() {
        let err = WebGlTranslator.translate("float helper() { return 1.0; }").unwrap_err();
        assert!(matches!(err, ShaderError::TranslateError(_)));
    }

    #[test]
    fn rejects_source_with_its_own_fragment_output() {
        let es3 = "#version 300 es\nprecision highp float;\nout vec4 color;\n\
                   void main() { color = vec4(1.0); }\n";
        let err = WebGlTranslator.translate(es3).unwrap_err();
        match err {
            ShaderError::TranslateError(msg) => assert!(msg.contains("out vec4"), "got {msg}"),
            other => panic!("expected TranslateError, got {other:?}"),
        }

        let located = "layout(location = 0) out vec4 color;\nvoid main() { color = vec4(1.0); }";
        assert!(WebGlTranslator.translate(located).is_err());
    }

    #[test]
    fn out_parameters_are_not_fragment_outputs() {
        let src = "void shade(out vec4 c) { c = vec4(1.0); }\n\
                   void main() { shade(gl_FragColor); }";
        let out = WebGlTranslator.translate(src).unwrap();
        assert_eq!(out.matches("out vec4 glmix_FragColor").count(), 1, "got:\n{out}");
    }

    #[test]
    fn native_sources_pass_through_untouched() {
        let shader = FragmentShader::native("#version 150 core\nvoid main() {}");
        let out = native_source(&shader).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, shader.source());
    }

    #[test]
    fn webgl_sources_are_translated() {
        let shader = FragmentShader::webgl(GLSL_IO_FADE);
        let out = native_source(&shader).unwrap();
        assert!(out.starts_with("#version 150 core"));
    }

    #[test]
    fn closures_implement_the_translator_interface() {
        let upper = |src: &str| -> Result<String, ShaderError> { Ok(src.to_uppercase()) };
        let translator: &dyn ShaderTranslator = &upper;
        assert_eq!(translator.translate("abc").unwrap(), "ABC");
    }
}

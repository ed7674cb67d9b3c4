//! Fixed vertex stage and output-covering geometry.
//!
//! Every instance draws the same rectangle: two counter-clockwise triangles
//! over the unit square, mapped to clip space by the vertex shader. The
//! fragment shader then runs exactly once per output pixel, and locates
//! itself with `gl_FragCoord.xy / resolution`.
//!
//! Orientation: GL's window origin is the bottom-left pixel and the first
//! row of an uploaded texture is its bottom row, and readback starts from
//! the bottom row too. Host row `r` therefore maps to output row `r`: no
//! flip happens anywhere, and `gl_FragCoord.y` grows with the host row index.

/// GLSL 1.50 core vertex shader mapping unit-square positions to clip space.
pub const VERTEX_SHADER: &str = r#"#version 150 core
in vec2 position;
void main() {
    gl_Position = vec4(2.0 * position - 1.0, 0.0, 1.0);
}
"#;

/// Vertex attribute fed with [`QUAD_VERTICES`].
pub const POSITION_ATTRIBUTE: &str = "position";

/// Sampler bound to texture unit 0, holding the outgoing frame.
pub const FROM_SAMPLER: &str = "from";
/// Sampler bound to texture unit 1, holding the incoming frame.
pub const TO_SAMPLER: &str = "to";
/// `vec2` uniform set once to the output size in pixels.
pub const RESOLUTION_UNIFORM: &str = "resolution";
/// `float` uniform set every frame; optional in the fragment shader.
pub const PROGRESS_UNIFORM: &str = "progress";

/// Two triangles covering the unit square, counter-clockwise, as `(x, y)` pairs.
pub const QUAD_VERTICES: [f32; 12] = [
    0.0, 0.0, //
    1.0, 0.0, //
    0.0, 1.0, //
    0.0, 1.0, //
    1.0, 0.0, //
    1.0, 1.0, //
];

/// Number of vertices drawn per frame.
pub const QUAD_VERTEX_COUNT: i32 = (QUAD_VERTICES.len() / 2) as i32;

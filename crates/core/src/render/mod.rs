//! OpenGL side of the mixer.
//!
//! This module is only available when the `render` feature is enabled.
//! Every function here expects to run while a [`ContextGuard`] is held;
//! they receive a [`GlScope`] borrowed from that guard, so the borrow
//! checker keeps GL calls inside the critical section.
//!
//! # Module overview
//!
//! - [`program`] -- Shader compilation and linking with ledger accounting.
//! - [`texture`] -- Source textures for the two input frames.
//! - [`target`] -- Offscreen framebuffer + renderbuffer the output is drawn to.
//! - [`geometry`] -- Vertex array and buffer for the output rectangle.
//! - [`instance`] -- Construction and destruction of a transition instance.
//! - [`frame`] -- The per-frame upload, draw and readback protocol.
//! - `surface` -- Hidden GLFW window backing the device (`glfw` feature).

pub mod frame;
pub mod geometry;
pub mod instance;
pub mod program;
#[cfg(feature = "glfw")]
pub mod surface;
pub mod target;
pub mod texture;

pub use geometry::QuadGeometry;
pub use instance::Instance;
pub use program::{compile_program, compile_shader, delete_program, link_program};
#[cfg(feature = "glfw")]
pub use surface::GlfwSurface;
pub use target::RenderTarget;
pub use texture::SourceTexture;

use crate::context::{ContextGuard, Surface};
use crate::ledger::ResourceLedger;

/// Stop draining after this many flags; a broken driver may never clear.
const MAX_DRAINED_ERRORS: usize = 16;

/// The GL API and resource ledger of a held [`ContextGuard`].
#[derive(Clone, Copy)]
pub struct GlScope<'a> {
    pub gl: &'a glow::Context,
    pub ledger: &'a ResourceLedger,
}

impl<'a> GlScope<'a> {
    pub fn new<S>(guard: &'a ContextGuard<'_, S>) -> Self
    where
        S: Surface<Api = glow::Context>,
    {
        Self {
            gl: guard.api(),
            ledger: guard.ledger(),
        }
    }
}

/// Pops every pending GL error flag, oldest first.
#[allow(unsafe_code)]
pub fn drain_errors(gl: &glow::Context) -> Vec<u32> {
    use glow::HasContext;

    let mut errors = Vec::new();
    while errors.len() < MAX_DRAINED_ERRORS {
        // SAFETY: glGetError has no preconditions beyond a current context,
        // which the caller's guard provides.
        let error = unsafe { gl.get_error() };
        if error == glow::NO_ERROR {
            break;
        }
        errors.push(error);
    }
    errors
}

/// Pops every pending GL error flag, logs each one against `during` and
/// counts them on the ledger.
pub fn report_errors(scope: &GlScope<'_>, during: &str) -> Vec<u32> {
    let errors = drain_errors(scope.gl);
    if !errors.is_empty() {
        scope.ledger.errors_raised(errors.len());
    }
    for &code in &errors {
        tracing::error!("GL error during {during}: {} (0x{code:04X})", error_name(code));
    }
    errors
}

/// Human-readable name of a GL error code.
pub fn error_name(code: u32) -> &'static str {
    match code {
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        _ => "unknown GL error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names_cover_core_codes() {
        assert_eq!(error_name(glow::INVALID_VALUE), "GL_INVALID_VALUE");
        assert_eq!(error_name(glow::OUT_OF_MEMORY), "GL_OUT_OF_MEMORY");
        assert_eq!(error_name(0xFFFF), "unknown GL error");
    }

    #[test]
    fn gl_scope_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<GlScope<'static>>();
    }
}

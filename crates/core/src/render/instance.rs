//! Construction and destruction of transition instances.
//!
//! An [`Instance`] owns every GL object one transition needs. It is built
//! under a single context scope: each successful step pushes its undo
//! action onto a [`Rollback`], and the first failure unwinds them all, so
//! either a complete instance comes back or nothing stays allocated.

use super::geometry::QuadGeometry;
use super::program::{compile_program, delete_program};
use super::target::RenderTarget;
use super::texture::SourceTexture;
use super::{report_errors, GlScope};
use crate::context::{Device, Surface};
use crate::error::MixError;
use crate::frame::FrameSize;
use crate::fullscreen::{
    FROM_SAMPLER, POSITION_ATTRIBUTE, PROGRESS_UNIFORM, RESOLUTION_UNIFORM, TO_SAMPLER,
    VERTEX_SHADER,
};
use crate::rollback::Rollback;
use crate::shader::{FragmentShader, ShaderError};
use crate::translate::translator_for;

/// Texture unit the outgoing frame is bound to.
pub const FROM_UNIT: u32 = 0;
/// Texture unit the incoming frame is bound to.
pub const TO_UNIT: u32 = 1;

/// Uniform locations looked up once after linking.
///
/// Drivers drop uniforms the shader never reads, so any of these may be
/// absent; setting an absent uniform is simply skipped.
#[derive(Debug, Clone, Default)]
pub struct Uniforms {
    pub from: Option<glow::UniformLocation>,
    pub to: Option<glow::UniformLocation>,
    pub resolution: Option<glow::UniformLocation>,
    pub progress: Option<glow::UniformLocation>,
}

/// GPU resources of one live transition.
///
/// Release with [`Instance::destroy`]; dropping an instance without it
/// leaks its GL objects until the device is torn down.
#[derive(Debug)]
pub struct Instance {
    pub(super) size: FrameSize,
    pub(super) target: RenderTarget,
    pub(super) sources: [SourceTexture; 2],
    pub(super) program: glow::Program,
    pub(super) uniforms: Uniforms,
    pub(super) quad: QuadGeometry,
}

impl Instance {
    /// Builds a transition instance drawing `fragment` at `size`.
    ///
    /// Fails with the first error encountered: framebuffer allocation or
    /// completeness, texture allocation, shader translation, compilation or
    /// linking, geometry allocation, or a raised GL error flag. Every
    /// failure is logged and rolled back.
    pub fn new<S>(
        device: &Device<S>,
        size: FrameSize,
        fragment: &FragmentShader,
    ) -> Result<Self, MixError>
    where
        S: Surface<Api = glow::Context>,
    {
        let guard = device.acquire();
        let scope = GlScope::new(&guard);

        report_errors(&scope, "earlier GL work");

        let mut rollback = Rollback::new();
        match Self::build(&scope, size, fragment, &mut rollback) {
            Ok(instance) => {
                rollback.commit();
                tracing::debug!(
                    width = size.width(),
                    height = size.height(),
                    "transition instance constructed"
                );
                Ok(instance)
            }
            Err(err) => {
                tracing::error!(
                    width = size.width(),
                    height = size.height(),
                    "transition instance construction failed: {err}"
                );
                rollback.unwind(&scope);
                Err(err)
            }
        }
    }

    #[allow(unsafe_code)]
    fn build<'s>(
        scope: &GlScope<'s>,
        size: FrameSize,
        fragment: &FragmentShader,
        rollback: &mut Rollback<'_, GlScope<'s>>,
    ) -> Result<Self, MixError> {
        use glow::HasContext;
        let gl = scope.gl;

        let target = RenderTarget::new(scope, size)?;
        rollback.push("render target", move |s: &GlScope<'s>| target.destroy(s));

        let from = SourceTexture::new(scope, size)?;
        rollback.push("from texture", move |s: &GlScope<'s>| from.destroy(s));
        let to = SourceTexture::new(scope, size)?;
        rollback.push("to texture", move |s: &GlScope<'s>| to.destroy(s));

        let program = compile_program(
            scope,
            VERTEX_SHADER,
            fragment.source(),
            translator_for(fragment.dialect()),
        )?;
        rollback.push("program", move |s: &GlScope<'s>| delete_program(s, program));

        // SAFETY: glow wraps raw GL calls as unsafe. `program` is a freshly
        // linked program and the caller holds the context guard.
        let uniforms = unsafe {
            Uniforms {
                from: gl.get_uniform_location(program, FROM_SAMPLER),
                to: gl.get_uniform_location(program, TO_SAMPLER),
                resolution: gl.get_uniform_location(program, RESOLUTION_UNIFORM),
                progress: gl.get_uniform_location(program, PROGRESS_UNIFORM),
            }
        };
        for (name, location) in [
            (FROM_SAMPLER, &uniforms.from),
            (TO_SAMPLER, &uniforms.to),
            (RESOLUTION_UNIFORM, &uniforms.resolution),
            (PROGRESS_UNIFORM, &uniforms.progress),
        ] {
            if location.is_none() {
                tracing::debug!(uniform = name, "uniform not active in transition shader");
            }
        }

        unsafe {
            gl.use_program(Some(program));
            gl.uniform_1_i32(uniforms.from.as_ref(), FROM_UNIT as i32);
            gl.uniform_1_i32(uniforms.to.as_ref(), TO_UNIT as i32);
            gl.uniform_2_f32(
                uniforms.resolution.as_ref(),
                size.width() as f32,
                size.height() as f32,
            );
            gl.use_program(None);
        }

        let location = unsafe { gl.get_attrib_location(program, POSITION_ATTRIBUTE) }.ok_or_else(
            || {
                ShaderError::LinkError(format!(
                    "vertex attribute '{POSITION_ATTRIBUTE}' is not active"
                ))
            },
        )?;
        let quad = QuadGeometry::new(scope, location)?;
        rollback.push("geometry", move |s: &GlScope<'s>| quad.destroy(s));

        if let Some(&code) = report_errors(scope, "instance construction").first() {
            return Err(MixError::Gl(code));
        }

        Ok(Self {
            size,
            target,
            sources: [from, to],
            program,
            uniforms,
            quad,
        })
    }

    /// Releases every GL object the instance owns.
    pub fn destroy<S>(self, device: &Device<S>)
    where
        S: Surface<Api = glow::Context>,
    {
        let guard = device.acquire();
        let scope = GlScope::new(&guard);

        self.target.destroy(&scope);
        self.quad.destroy(&scope);
        delete_program(&scope, self.program);
        for source in &self.sources {
            source.destroy(&scope);
        }
        report_errors(&scope, "instance destruction");
        tracing::debug!(
            width = self.size.width(),
            height = self.size.height(),
            "transition instance destroyed"
        );
    }

    pub fn size(&self) -> FrameSize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_and_to_use_distinct_units() {
        assert_ne!(FROM_UNIT, TO_UNIT);
    }

    #[test]
    fn instance_can_move_between_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<Instance>();
    }
}

//! Offscreen render target (FBO + renderbuffer).
//!
//! A `RenderTarget` pairs a framebuffer object with an RGBA8 renderbuffer
//! as its only color attachment. Transitions draw into it and the result is
//! read straight back to the host, so a renderbuffer is enough; nothing
//! ever samples it.

use super::GlScope;
use crate::error::MixError;
use crate::frame::FrameSize;
use crate::ledger::GpuResource;

/// An offscreen framebuffer with an RGBA8 color renderbuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    fbo: glow::Framebuffer,
    rbo: glow::Renderbuffer,
    size: FrameSize,
}

impl RenderTarget {
    /// Creates the framebuffer and renderbuffer and verifies completeness.
    ///
    /// # Errors
    ///
    /// Returns `MixError::Allocation` if either object cannot be created and
    /// `MixError::FramebufferIncomplete` if the completeness check fails.
    /// Nothing stays allocated on error.
    #[allow(unsafe_code)]
    pub fn new(scope: &GlScope<'_>, size: FrameSize) -> Result<Self, MixError> {
        use glow::HasContext;
        let gl = scope.gl;

        // SAFETY: glow wraps raw GL calls as unsafe. The caller holds the
        // context guard; objects created here are deleted on every error
        // path below.
        let fbo = unsafe {
            gl.create_framebuffer()
                .map_err(|message| MixError::Allocation {
                    resource: GpuResource::Framebuffer,
                    message,
                })?
        };
        scope.ledger.allocated(GpuResource::Framebuffer);

        let rbo = match unsafe { gl.create_renderbuffer() } {
            Ok(rbo) => rbo,
            Err(message) => {
                unsafe { gl.delete_framebuffer(fbo) };
                scope.ledger.released(GpuResource::Framebuffer);
                return Err(MixError::Allocation {
                    resource: GpuResource::Renderbuffer,
                    message,
                });
            }
        };
        scope.ledger.allocated(GpuResource::Renderbuffer);

        let target = Self { fbo, rbo, size };
        let status = unsafe {
            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(rbo));
            gl.renderbuffer_storage(
                glow::RENDERBUFFER,
                glow::RGBA8,
                size.width() as i32,
                size.height() as i32,
            );
            gl.bind_renderbuffer(glow::RENDERBUFFER, None);

            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::RENDERBUFFER,
                Some(rbo),
            );
            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            status
        };

        if status != glow::FRAMEBUFFER_COMPLETE {
            target.destroy(scope);
            return Err(MixError::FramebufferIncomplete(status));
        }

        Ok(target)
    }

    /// Binds the framebuffer for drawing and reading, and sets the viewport
    /// to cover it.
    #[allow(unsafe_code)]
    pub fn bind(&self, scope: &GlScope<'_>) {
        use glow::HasContext;

        // SAFETY: self.fbo is a valid framebuffer handle created in new().
        unsafe {
            scope.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            scope
                .gl
                .viewport(0, 0, self.size.width() as i32, self.size.height() as i32);
        }
    }

    /// Reads the color attachment into `out` as RGBA bytes, bottom row first.
    ///
    /// The target must be bound. `out` must hold exactly one frame.
    #[allow(unsafe_code)]
    pub fn read_into(&self, scope: &GlScope<'_>, out: &mut [u32]) {
        use glow::HasContext;

        debug_assert_eq!(out.len(), self.size.pixel_count());
        // SAFETY: `out` holds width * height 4-byte pixels, matching the
        // RGBA / UNSIGNED_BYTE readback of the whole attachment.
        unsafe {
            scope.gl.pixel_store_i32(glow::PACK_ALIGNMENT, 4);
            scope.gl.read_buffer(glow::COLOR_ATTACHMENT0);
            scope.gl.read_pixels(
                0,
                0,
                self.size.width() as i32,
                self.size.height() as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(Some(bytemuck::cast_slice_mut(out))),
            );
        }
    }

    /// Deletes the framebuffer and renderbuffer.
    #[allow(unsafe_code)]
    pub fn destroy(&self, scope: &GlScope<'_>) {
        use glow::HasContext;

        // SAFETY: self.fbo and self.rbo are valid handles from new().
        unsafe {
            scope.gl.delete_framebuffer(self.fbo);
            scope.gl.delete_renderbuffer(self.rbo);
        }
        scope.ledger.released(GpuResource::Framebuffer);
        scope.ledger.released(GpuResource::Renderbuffer);
    }
}

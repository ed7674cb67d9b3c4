//! Source textures holding the two input frames.
//!
//! Storage is allocated once at the instance size as RGBA8 and refilled in
//! full on every frame from host pixels in (B, G, R, A) byte order; the
//! driver swizzles on upload so shaders always sample RGBA.

use super::GlScope;
use crate::error::MixError;
use crate::frame::FrameSize;
use crate::ledger::GpuResource;

/// Host pixel layout of uploaded frames.
pub const UPLOAD_FORMAT: u32 = glow::BGRA;
/// GPU-side storage format of source textures.
pub const INTERNAL_FORMAT: u32 = glow::RGBA8;

/// A 2D texture sized to one input frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTexture {
    texture: glow::Texture,
    size: FrameSize,
}

impl SourceTexture {
    /// Creates the texture and allocates its storage.
    ///
    /// Clamp-to-edge on both axes, linear filtering, one mip level.
    #[allow(unsafe_code)]
    pub fn new(scope: &GlScope<'_>, size: FrameSize) -> Result<Self, MixError> {
        use glow::HasContext;
        let gl = scope.gl;

        // SAFETY: glow wraps raw GL calls as unsafe. The caller holds the
        // context guard and every parameter below is a valid enum for a
        // 2D texture.
        let texture = unsafe {
            gl.create_texture().map_err(|message| MixError::Allocation {
                resource: GpuResource::Texture,
                message,
            })?
        };
        scope.ledger.allocated(GpuResource::Texture);

        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_BASE_LEVEL, 0);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAX_LEVEL, 0);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                INTERNAL_FORMAT as i32,
                size.width() as i32,
                size.height() as i32,
                0,
                UPLOAD_FORMAT,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(None),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);
        }

        Ok(Self { texture, size })
    }

    /// Binds the texture to texture unit `unit`.
    #[allow(unsafe_code)]
    pub fn bind(&self, scope: &GlScope<'_>, unit: u32) {
        use glow::HasContext;

        // SAFETY: self.texture is live until destroy().
        unsafe {
            scope.gl.active_texture(glow::TEXTURE0 + unit);
            scope.gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
        }
    }

    /// Binds the texture to `unit` and replaces its whole contents.
    ///
    /// `pixels` must hold exactly one frame; callers check this first.
    #[allow(unsafe_code)]
    pub fn upload(&self, scope: &GlScope<'_>, unit: u32, pixels: &[u32]) {
        use glow::HasContext;

        debug_assert_eq!(pixels.len(), self.size.pixel_count());
        self.bind(scope, unit);
        // SAFETY: the texture was allocated at self.size, and `pixels`
        // covers exactly that many 4-byte pixels.
        unsafe {
            scope.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
            scope.gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                0,
                0,
                self.size.width() as i32,
                self.size.height() as i32,
                UPLOAD_FORMAT,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(bytemuck::cast_slice(pixels))),
            );
        }
    }

    /// Deletes the texture.
    #[allow(unsafe_code)]
    pub fn destroy(&self, scope: &GlScope<'_>) {
        use glow::HasContext;

        // SAFETY: self.texture is a valid handle from new().
        unsafe { scope.gl.delete_texture(self.texture) };
        scope.ledger.released(GpuResource::Texture);
    }
}

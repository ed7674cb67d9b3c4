//! Per-frame render protocol: upload, draw, read back.

use super::instance::{Instance, FROM_UNIT, TO_UNIT};
use super::{report_errors, GlScope};
use crate::context::{Device, Surface};
use crate::error::MixError;

impl Instance {
    /// Renders one output frame.
    ///
    /// `from` and `to` are packed (B, G, R, A) frames at the instance size;
    /// `out` receives the result as (R, G, B, A). `progress` is handed to
    /// the shader as-is, without clamping.
    ///
    /// # Errors
    ///
    /// Only a buffer of the wrong length is reported, before any GL work.
    /// GL errors raised while drawing are logged and counted on the
    /// device ledger.
    #[allow(unsafe_code)]
    pub fn render<S>(
        &self,
        device: &Device<S>,
        progress: f64,
        from: &[u32],
        to: &[u32],
        out: &mut [u32],
    ) -> Result<(), MixError>
    where
        S: Surface<Api = glow::Context>,
    {
        use glow::HasContext;

        self.size.check_buffer(from)?;
        self.size.check_buffer(to)?;
        self.size.check_buffer(out)?;

        let guard = device.acquire();
        let scope = GlScope::new(&guard);
        let gl = scope.gl;

        let [from_texture, to_texture] = &self.sources;
        from_texture.upload(&scope, FROM_UNIT, from);
        to_texture.upload(&scope, TO_UNIT, to);

        // SAFETY: glow wraps raw GL calls as unsafe. Every handle used
        // here belongs to this instance and stays live until destroy().
        unsafe {
            gl.use_program(Some(self.program));
            if let Some(location) = &self.uniforms.progress {
                gl.uniform_1_f32(Some(location), progress as f32);
            }

            self.target.bind(&scope);
            gl.clear_color(0.0, 0.0, 0.0, 0.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
        }

        self.quad.draw(&scope);
        self.target.read_into(&scope, out);

        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            gl.use_program(None);
        }

        report_errors(&scope, "frame render");
        tracing::trace!(progress, "frame rendered");
        Ok(())
    }
}

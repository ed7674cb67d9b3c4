//! Hidden GLFW window providing the device's GL 3.2 core context.

use glfw::Context as _;
use std::ptr;

use crate::context::Surface;
use crate::error::MixError;

/// A 1x1 invisible window whose context backs the render device.
///
/// Field order matters: the GL function table is dropped first, then the
/// window, then the GLFW library handle.
pub struct GlfwSurface {
    gl: glow::Context,
    window: glfw::PWindow,
    _events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    _glfw: glfw::Glfw,
}

// SAFETY: the GLFW handles are not Send because most GLFW calls must happen
// on the main thread. The surface only makes its context current or not
// current, which GLFW allows from any thread, and the owning `Device`
// serialises every access behind its mutex.
#[allow(unsafe_code)]
unsafe impl Send for GlfwSurface {}

fn log_glfw_error(error: glfw::Error, description: String) {
    tracing::error!(?error, "GLFW: {description}");
}

impl GlfwSurface {
    /// Initialises GLFW and opens the hidden window.
    ///
    /// The context is left not-current, ready to hand to `Device::new`.
    #[allow(unsafe_code)]
    pub fn create() -> Result<Self, MixError> {
        let mut glfw =
            glfw::init(log_glfw_error).map_err(|e| MixError::Surface(format!("glfw init: {e}")))?;

        glfw.window_hint(glfw::WindowHint::Visible(false));
        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 2));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(
            glfw::OpenGlProfileHint::Core,
        ));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));

        let (mut window, events) = glfw
            .create_window(1, 1, "glmix", glfw::WindowMode::Windowed)
            .ok_or_else(|| MixError::Surface("could not create hidden GL 3.2 core window".into()))?;

        window.make_current();
        // SAFETY: the window's context is current on this thread, so the
        // loader returns entry points valid for it.
        let gl = unsafe {
            glow::Context::from_loader_function(|name| {
                window
                    .get_proc_address(name)
                    .map_or(ptr::null(), |f| f as *const _)
            })
        };
        glfw::make_context_current(None);

        tracing::debug!("hidden GLFW surface created");
        Ok(Self {
            gl,
            window,
            _events: events,
            _glfw: glfw,
        })
    }
}

impl Surface for GlfwSurface {
    type Api = glow::Context;

    fn make_current(&mut self) {
        self.window.make_current();
    }

    fn release_current(&mut self) {
        glfw::make_context_current(None);
    }

    fn api(&self) -> &glow::Context {
        &self.gl
    }
}

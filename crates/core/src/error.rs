//! Error types for the glmix core.

use thiserror::Error;

use crate::ledger::GpuResource;
use crate::params::ParamKind;
use crate::shader::ShaderError;

/// Errors produced by device, instance and host-plumbing operations.
#[derive(Debug, Error)]
pub enum MixError {
    /// Width or height was zero, or `width * height` overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A caller-supplied pixel buffer did not hold `width * height` pixels.
    #[error("frame buffer holds {got} pixels, expected {expected}")]
    FrameSize { expected: usize, got: usize },

    /// The hidden rendering surface could not be created.
    #[error("rendering surface unavailable: {0}")]
    Surface(String),

    /// An operation needed the device but global init never succeeded.
    #[error("render device is not initialized")]
    NotInitialized,

    /// Teardown was attempted off the thread that owns the device.
    #[error("device teardown refused: calling thread does not own the render context")]
    ForeignThread,

    /// Teardown was attempted while instance operations still hold the device.
    #[error("device teardown refused: {0} other handle(s) still alive")]
    DeviceBusy(usize),

    /// The GL driver refused to create an object.
    #[error("failed to allocate {resource}: {message}")]
    Allocation {
        resource: GpuResource,
        message: String,
    },

    /// The offscreen framebuffer failed its completeness check.
    #[error("framebuffer incomplete: status 0x{0:04X}")]
    FramebufferIncomplete(u32),

    /// Translation, compilation or linking of the transition program failed.
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// The GL error flag was raised while building an instance.
    #[error("GL error 0x{0:04X}")]
    Gl(u32),

    /// A builtin transition name was not recognized.
    #[error("unknown transition: {0}")]
    UnknownTransition(String),

    /// A parameter index was outside the parameter table.
    #[error("parameter index {0} out of range")]
    ParamIndex(usize),

    /// A parameter value had the wrong kind for its slot.
    #[error("parameter '{name}' expects {expected}, got {got}")]
    ParamType {
        name: String,
        expected: ParamKind,
        got: ParamKind,
    },

    /// Configuration could not be parsed or resolved.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading a shader or configuration file failed.
    #[error("I/O error: {0}")]
    Io(String),
}

#![deny(unsafe_code)]
//! Core of the glmix GPU transition mixer.
//!
//! Provides the shared rendering [`Device`](context::Device) and its scoped
//! [`ContextGuard`](context::ContextGuard), the shader pipeline
//! ([`shader`], [`translate`]), the per-instance GPU resource lifecycle and
//! frame renderer ([`render`], behind the `render` feature), plus the
//! host-facing plumbing shared by the plugin and the CLI: plugin metadata,
//! parameter tables, configuration and builtin transitions.

pub mod builtin;
pub mod config;
pub mod context;
pub mod error;
pub mod frame;
pub mod fullscreen;
pub mod ledger;
pub mod params;
pub mod plugin;
pub mod rollback;
pub mod shader;
pub mod translate;

#[cfg(feature = "render")]
pub mod render;

pub use config::MixerConfig;
pub use context::{ContextGuard, Device, Surface};
pub use error::MixError;
pub use frame::FrameSize;
pub use ledger::{GpuResource, LedgerSnapshot, ResourceLedger};
pub use params::{ParamKind, ParamSpec, ParamTable, ParamValue};
pub use plugin::PluginInfo;
pub use shader::{Dialect, FragmentShader, ShaderError, ShaderStage};

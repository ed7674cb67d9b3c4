#![deny(unsafe_code)]
//! frei0r `mixer2` plugin exposing the glmix transition mixer.
//!
//! Build the `cdylib` and drop `libglmix.so` into a frei0r plugin path.
//! The transition is chosen through the environment (see
//! [`glmix_core::config`]); by default the builtin `fade` runs.

pub mod ffi;
pub mod runtime;

pub use runtime::{deinit, init, PluginInstance};

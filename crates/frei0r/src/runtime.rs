//! Process-wide plugin state and the safe operations behind each entry point.
//!
//! The host ABI has no context argument, so the device and the configured
//! transition live in one global. Instances hold their own `Arc` of the
//! device; global teardown is refused while any of them is alive.

use std::ffi::CString;
use std::sync::Arc;

use glmix_core::params::ParamTable;
use glmix_core::plugin::MIXER_PARAMS;
use glmix_core::render::{GlfwSurface, Instance};
use glmix_core::{Device, FragmentShader, FrameSize, MixError, MixerConfig, ParamValue};
use parking_lot::RwLock;
use tracing_subscriber::EnvFilter;

type GlDevice = Device<GlfwSurface>;

/// Everything created by a successful global init.
struct Runtime {
    device: Arc<GlDevice>,
    shader: FragmentShader,
}

static RUNTIME: RwLock<Option<Runtime>> = RwLock::new(None);

/// Installs the stderr log subscriber unless the host already set one.
fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Creates the shared device. Succeeds immediately if it already exists.
pub fn init() -> Result<(), MixError> {
    let mut runtime = RUNTIME.write();
    if runtime.is_some() {
        return Ok(());
    }

    let config = MixerConfig::from_env();
    init_logging(
        config
            .as_ref()
            .map_or(glmix_core::config::DEFAULT_LOG, |c| c.log.as_str()),
    );
    let shader = config.and_then(|c| c.resolve_shader()).map_err(|e| {
        tracing::error!("plugin init failed: {e}");
        e
    })?;

    let surface = GlfwSurface::create().map_err(|e| {
        tracing::error!("plugin init failed: {e}");
        e
    })?;
    *runtime = Some(Runtime {
        device: Arc::new(Device::new(surface)),
        shader,
    });
    tracing::info!("glmix plugin initialized");
    Ok(())
}

/// Destroys the shared device.
///
/// Refused, leaving everything in place, while instances still hold the
/// device or when called off the thread that ran [`init`].
pub fn deinit() -> Result<(), MixError> {
    let mut slot = RUNTIME.write();
    let Some(runtime) = slot.take() else {
        return Ok(());
    };

    let device = match Arc::try_unwrap(runtime.device) {
        Ok(device) => device,
        Err(device) => {
            let others = Arc::strong_count(&device) - 1;
            *slot = Some(Runtime {
                device,
                shader: runtime.shader,
            });
            return Err(MixError::DeviceBusy(others));
        }
    };

    match device.shutdown() {
        Ok(()) => {
            tracing::info!("glmix plugin deinitialized");
            Ok(())
        }
        Err(device) => {
            *slot = Some(Runtime {
                device: Arc::new(device),
                shader: runtime.shader,
            });
            Err(MixError::ForeignThread)
        }
    }
}

/// One host-visible transition instance.
pub struct PluginInstance {
    device: Arc<GlDevice>,
    instance: Instance,
    params: ParamTable,
    /// Owned copies of string parameters handed out to the host.
    strings: Vec<Option<CString>>,
}

impl PluginInstance {
    /// Builds an instance with the configured transition.
    pub fn new(width: u32, height: u32) -> Result<Self, MixError> {
        let size = FrameSize::new(width, height)?;
        let (device, shader) = {
            let runtime = RUNTIME.read();
            let runtime = runtime.as_ref().ok_or(MixError::NotInitialized)?;
            (Arc::clone(&runtime.device), runtime.shader.clone())
        };

        let instance = Instance::new(&device, size, &shader)?;
        Ok(Self {
            device,
            instance,
            params: ParamTable::new(MIXER_PARAMS),
            strings: vec![None; MIXER_PARAMS.len()],
        })
    }

    pub fn size(&self) -> FrameSize {
        self.instance.size()
    }

    /// Renders one frame; `time` is the transition progress.
    pub fn update(&self, time: f64, from: &[u32], to: &[u32], out: &mut [u32]) {
        if let Err(e) = self.instance.render(&self.device, time, from, to, out) {
            tracing::error!("frame skipped: {e}");
        }
    }

    pub fn params(&self) -> &ParamTable {
        &self.params
    }

    pub fn set_param(&mut self, index: usize, value: ParamValue) -> Result<(), MixError> {
        self.params.set(index, value)
    }

    /// Keeps a NUL-terminated copy of string parameter `index` alive until
    /// the next call for the same slot, and returns it.
    pub fn param_cstring(&mut self, index: usize) -> Result<&CString, MixError> {
        let text = match self.params.get(index)? {
            ParamValue::String(text) => text.replace('\0', ""),
            other => {
                return Err(MixError::ParamType {
                    name: self.params.spec(index).map_or("", |s| s.name).to_string(),
                    expected: glmix_core::ParamKind::String,
                    got: other.kind(),
                })
            }
        };
        let slot = self
            .strings
            .get_mut(index)
            .ok_or(MixError::ParamIndex(index))?;
        Ok(slot.insert(CString::new(text).unwrap_or_default()))
    }

    /// Releases the GPU resources.
    pub fn destroy(self) {
        self.instance.destroy(&self.device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_before_init_is_refused() {
        if RUNTIME.read().is_some() {
            return;
        }
        assert!(matches!(
            PluginInstance::new(8, 8),
            Err(MixError::NotInitialized)
        ));
    }

    #[test]
    fn zero_dimensions_are_refused_first() {
        assert!(matches!(
            PluginInstance::new(0, 8),
            Err(MixError::InvalidDimensions)
        ));
    }

    #[test]
    fn deinit_without_init_is_a_no_op() {
        if RUNTIME.read().is_some() {
            return;
        }
        assert!(deinit().is_ok());
    }

    #[test]
    #[ignore = "requires GL context"]
    fn init_is_idempotent_and_deinit_refuses_while_instances_live() {
        init().unwrap();
        init().unwrap();

        let instance = PluginInstance::new(16, 16).unwrap();
        assert!(matches!(deinit(), Err(MixError::DeviceBusy(1))));

        let frame = vec![0xFF00_00FF_u32; 256];
        let mut out = vec![0; 256];
        instance.update(0.5, &frame, &frame, &mut out);
        instance.destroy();

        deinit().unwrap();
        assert!(RUNTIME.read().is_none());
    }
}

//! Static plugin metadata reported to hosts.

use serde::Serialize;

use crate::params::ParamSpec;

/// Plugin categories in host ABI numbering. Transitions are two-input mixers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginType {
    Filter,
    Source,
    Mixer2,
    Mixer3,
}

impl PluginType {
    pub fn code(self) -> i32 {
        match self {
            PluginType::Filter => 0,
            PluginType::Source => 1,
            PluginType::Mixer2 => 2,
            PluginType::Mixer3 => 3,
        }
    }
}

/// Pixel layouts in host ABI numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorModel {
    Bgra8888,
    Rgba8888,
    Packed32,
}

impl ColorModel {
    pub fn code(self) -> i32 {
        match self {
            ColorModel::Bgra8888 => 0,
            ColorModel::Rgba8888 => 1,
            ColorModel::Packed32 => 2,
        }
    }
}

/// Parameters exposed by the transition mixer. None are defined yet.
pub static MIXER_PARAMS: &[ParamSpec] = &[];

/// Host ABI revision the plugin is written against.
pub const ABI_VERSION: i32 = 1;

/// Descriptive metadata for one plugin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginInfo {
    pub name: &'static str,
    pub author: &'static str,
    pub plugin_type: PluginType,
    pub color_model: ColorModel,
    pub abi_version: i32,
    pub major_version: i32,
    pub minor_version: i32,
    pub num_params: usize,
    pub explanation: &'static str,
}

impl PluginInfo {
    /// Metadata of the glmix transition mixer.
    pub fn mixer() -> Self {
        Self {
            name: "glmix",
            author: "glmix contributors",
            plugin_type: PluginType::Mixer2,
            color_model: ColorModel::Rgba8888,
            abi_version: ABI_VERSION,
            major_version: 0,
            minor_version: 9,
            num_params: MIXER_PARAMS.len(),
            explanation: "Applies a GLSL fragment shader as a transition between two inputs",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixer_is_a_two_input_rgba_plugin() {
        let info = PluginInfo::mixer();
        assert_eq!(info.plugin_type, PluginType::Mixer2);
        assert_eq!(info.plugin_type.code(), 2);
        assert_eq!(info.color_model.code(), 1);
    }

    #[test]
    fn mixer_param_count_matches_table() {
        assert_eq!(PluginInfo::mixer().num_params, MIXER_PARAMS.len());
    }

    #[test]
    fn info_serializes_for_cli_output() {
        let v = serde_json::to_value(PluginInfo::mixer()).unwrap();
        assert_eq!(v["name"], "glmix");
        assert_eq!(v["plugin_type"], "mixer2");
        assert_eq!(v["color_model"], "rgba8888");
    }
}

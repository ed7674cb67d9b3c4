//! frei0r C ABI entry points.
//!
//! Every function here converts raw host pointers into safe values and
//! hands off to [`crate::runtime`]. Null instance, info and frame pointers
//! are logged and ignored.
#![allow(unsafe_code)]

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::slice;

use glmix_core::plugin::{PluginInfo, MIXER_PARAMS};
use glmix_core::{ParamKind, ParamValue};
use once_cell::sync::Lazy;

use crate::runtime::{self, PluginInstance};

pub type F0rInstance = *mut c_void;
pub type F0rParam = *mut c_void;

/// `f0r_plugin_info_t`
#[repr(C)]
#[derive(Debug)]
pub struct F0rPluginInfo {
    pub name: *const c_char,
    pub author: *const c_char,
    pub plugin_type: c_int,
    pub color_model: c_int,
    pub frei0r_version: c_int,
    pub major_version: c_int,
    pub minor_version: c_int,
    pub num_params: c_int,
    pub explanation: *const c_char,
}

/// `f0r_param_info_t`
#[repr(C)]
#[derive(Debug)]
pub struct F0rParamInfo {
    pub name: *const c_char,
    pub type_: c_int,
    pub explanation: *const c_char,
}

/// `f0r_param_color_t`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F0rParamColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// `f0r_param_position_t`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F0rParamPosition {
    pub x: f64,
    pub y: f64,
}

fn c_string(text: &str) -> CString {
    CString::new(text.replace('\0', "")).unwrap_or_default()
}

/// NUL-terminated copies of the static metadata strings.
struct InfoStrings {
    name: CString,
    author: CString,
    explanation: CString,
    params: Vec<(CString, CString)>,
}

static INFO_STRINGS: Lazy<InfoStrings> = Lazy::new(|| {
    let info = PluginInfo::mixer();
    InfoStrings {
        name: c_string(info.name),
        author: c_string(info.author),
        explanation: c_string(info.explanation),
        params: MIXER_PARAMS
            .iter()
            .map(|spec| (c_string(spec.name), c_string(spec.explanation)))
            .collect(),
    }
});

/// Reads a host parameter value of `kind` from `param`.
///
/// # Safety
///
/// `param` must point to a live value of the C type frei0r uses for `kind`.
unsafe fn read_param(kind: ParamKind, param: *const c_void) -> ParamValue {
    match kind {
        ParamKind::Bool => ParamValue::Bool(*param.cast::<f64>() >= 0.5),
        ParamKind::Double => ParamValue::Double(*param.cast::<f64>()),
        ParamKind::Color => {
            let c = *param.cast::<F0rParamColor>();
            ParamValue::Color {
                r: c.r,
                g: c.g,
                b: c.b,
            }
        }
        ParamKind::Position => {
            let p = *param.cast::<F0rParamPosition>();
            ParamValue::Position { x: p.x, y: p.y }
        }
        ParamKind::String => {
            let text = *param.cast::<*const c_char>();
            if text.is_null() {
                ParamValue::String(String::new())
            } else {
                ParamValue::String(CStr::from_ptr(text).to_string_lossy().into_owned())
            }
        }
    }
}

/// Writes a non-string parameter value into `param`.
///
/// # Safety
///
/// `param` must point to writable storage of the C type for `value`'s kind.
unsafe fn write_param(value: &ParamValue, param: *mut c_void) {
    match *value {
        ParamValue::Bool(b) => *param.cast::<f64>() = if b { 1.0 } else { 0.0 },
        ParamValue::Double(d) => *param.cast::<f64>() = d,
        ParamValue::Color { r, g, b } => *param.cast::<F0rParamColor>() = F0rParamColor { r, g, b },
        ParamValue::Position { x, y } => {
            *param.cast::<F0rParamPosition>() = F0rParamPosition { x, y }
        }
        ParamValue::String(_) => {}
    }
}

#[no_mangle]
pub extern "C" fn f0r_init() -> c_int {
    match runtime::init() {
        Ok(()) => 1,
        Err(_) => 0,
    }
}

#[no_mangle]
pub extern "C" fn f0r_deinit() {
    if let Err(e) = runtime::deinit() {
        tracing::error!("plugin deinit refused: {e}");
    }
}

/// # Safety
///
/// `info` must be null or point to a writable `f0r_plugin_info_t`.
#[no_mangle]
pub unsafe extern "C" fn f0r_get_plugin_info(info: *mut F0rPluginInfo) {
    let Some(info) = info.as_mut() else {
        tracing::warn!("f0r_get_plugin_info called with null info");
        return;
    };
    let meta = PluginInfo::mixer();
    let strings = &*INFO_STRINGS;
    *info = F0rPluginInfo {
        name: strings.name.as_ptr(),
        author: strings.author.as_ptr(),
        plugin_type: meta.plugin_type.code(),
        color_model: meta.color_model.code(),
        frei0r_version: meta.abi_version,
        major_version: meta.major_version,
        minor_version: meta.minor_version,
        num_params: meta.num_params as c_int,
        explanation: strings.explanation.as_ptr(),
    };
}

/// # Safety
///
/// `info` must be null or point to a writable `f0r_param_info_t`.
#[no_mangle]
pub unsafe extern "C" fn f0r_get_param_info(info: *mut F0rParamInfo, param_index: c_int) {
    let Some(info) = info.as_mut() else {
        tracing::warn!("f0r_get_param_info called with null info");
        return;
    };
    let index = usize::try_from(param_index).ok();
    let spec = index.and_then(|i| MIXER_PARAMS.get(i));
    let names = index.and_then(|i| INFO_STRINGS.params.get(i));
    let (Some(spec), Some((name, explanation))) = (spec, names) else {
        tracing::warn!(param_index, "parameter info requested for unknown index");
        return;
    };
    *info = F0rParamInfo {
        name: name.as_ptr(),
        type_: spec.kind().code(),
        explanation: explanation.as_ptr(),
    };
}

#[no_mangle]
pub extern "C" fn f0r_construct(width: u32, height: u32) -> F0rInstance {
    match PluginInstance::new(width, height) {
        Ok(instance) => Box::into_raw(Box::new(instance)).cast(),
        Err(e) => {
            tracing::error!(width, height, "construct failed: {e}");
            std::ptr::null_mut()
        }
    }
}

/// # Safety
///
/// `instance` must be null or a handle returned by [`f0r_construct`] that
/// has not been destructed yet.
#[no_mangle]
pub unsafe extern "C" fn f0r_destruct(instance: F0rInstance) {
    if instance.is_null() {
        tracing::debug!("f0r_destruct called with null instance");
        return;
    }
    Box::from_raw(instance.cast::<PluginInstance>()).destroy();
}

/// # Safety
///
/// `instance` must be null or a live handle; `param` must point to a value
/// of the C type declared for `param_index`.
#[no_mangle]
pub unsafe extern "C" fn f0r_set_param_value(
    instance: F0rInstance,
    param: F0rParam,
    param_index: c_int,
) {
    let Some(instance) = instance.cast::<PluginInstance>().as_mut() else {
        tracing::warn!("f0r_set_param_value called with null instance");
        return;
    };
    let Some((index, spec)) = usize::try_from(param_index)
        .ok()
        .and_then(|i| instance.params().spec(i).map(|s| (i, s)))
    else {
        tracing::warn!(param_index, "set requested for unknown parameter");
        return;
    };
    if param.is_null() {
        tracing::warn!(param = spec.name, "set requested with null value");
        return;
    }
    let value = read_param(spec.kind(), param);
    if let Err(e) = instance.set_param(index, value) {
        tracing::warn!("parameter not set: {e}");
    }
}

/// # Safety
///
/// `instance` must be null or a live handle; `param` must point to writable
/// storage of the C type declared for `param_index`.
#[no_mangle]
pub unsafe extern "C" fn f0r_get_param_value(
    instance: F0rInstance,
    param: F0rParam,
    param_index: c_int,
) {
    let Some(instance) = instance.cast::<PluginInstance>().as_mut() else {
        tracing::warn!("f0r_get_param_value called with null instance");
        return;
    };
    let Ok(index) = usize::try_from(param_index) else {
        tracing::warn!(param_index, "get requested for unknown parameter");
        return;
    };
    if param.is_null() {
        tracing::warn!(param_index, "get requested with null storage");
        return;
    }
    let value = match instance.params().get(index) {
        Ok(value) => value.clone(),
        Err(e) => {
            tracing::warn!("parameter not read: {e}");
            return;
        }
    };
    match value {
        ParamValue::String(_) => match instance.param_cstring(index) {
            Ok(text) => *param.cast::<*const c_char>() = text.as_ptr(),
            Err(e) => tracing::warn!("parameter not read: {e}"),
        },
        other => write_param(&other, param),
    }
}

/// Renders one frame. `in3` is unused by two-input mixers.
///
/// # Safety
///
/// `instance` must be null or a live handle. Non-null frame pointers must
/// each address `width * height` pixels of the instance's size.
#[no_mangle]
pub unsafe extern "C" fn f0r_update2(
    instance: F0rInstance,
    time: f64,
    in1: *const u32,
    in2: *const u32,
    _in3: *const u32,
    out: *mut u32,
) {
    let Some(instance) = instance.cast::<PluginInstance>().as_ref() else {
        tracing::warn!("f0r_update2 called with null instance");
        return;
    };
    if in1.is_null() || in2.is_null() || out.is_null() {
        tracing::warn!("f0r_update2 called with a null frame pointer");
        return;
    }
    let len = instance.size().pixel_count();
    let from = slice::from_raw_parts(in1, len);
    let to = slice::from_raw_parts(in2, len);
    let out = slice::from_raw_parts_mut(out, len);
    instance.update(time, from, to, out);
}

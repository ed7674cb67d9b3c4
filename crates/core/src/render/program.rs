//! Shader compilation and linking.
//!
//! Every shader and program object created here is reported to the
//! device ledger, and every failure path deletes what it created, so a
//! failed build leaves the ledger exactly as it found it.

use std::borrow::Cow;

use super::GlScope;
use crate::ledger::GpuResource;
use crate::shader::{format_shader_error, ShaderError, ShaderStage};
use crate::translate::ShaderTranslator;

fn gl_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

/// Compiles a single shader stage.
///
/// On failure the shader object is deleted and the returned
/// `ShaderError::CompileError` carries the numbered source and driver log.
#[allow(unsafe_code)]
pub fn compile_shader(
    scope: &GlScope<'_>,
    stage: ShaderStage,
    source: &str,
) -> Result<glow::Shader, ShaderError> {
    use glow::HasContext;
    let gl = scope.gl;

    // SAFETY: glow wraps raw GL calls as unsafe. The caller holds the
    // context guard, the stage constant is valid, and the shader is
    // deleted again on the failure path.
    let shader = unsafe {
        gl.create_shader(gl_stage(stage))
            .map_err(|log| ShaderError::CompileError { stage, log })?
    };
    scope.ledger.allocated(GpuResource::Shader);

    let compiled = unsafe {
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        gl.get_shader_compile_status(shader)
    };

    if compiled {
        Ok(shader)
    } else {
        let info_log = unsafe { gl.get_shader_info_log(shader) };
        delete_shader(scope, shader);
        Err(ShaderError::CompileError {
            stage,
            log: format_shader_error(source, &info_log),
        })
    }
}

#[allow(unsafe_code)]
fn delete_shader(scope: &GlScope<'_>, shader: glow::Shader) {
    use glow::HasContext;

    // SAFETY: `shader` came from compile_shader and is deleted once.
    unsafe { scope.gl.delete_shader(shader) };
    scope.ledger.released(GpuResource::Shader);
}

/// Links a vertex and fragment shader into a program.
///
/// Both shaders are detached afterwards whether or not linking succeeded;
/// deleting them stays with the caller.
#[allow(unsafe_code)]
pub fn link_program(
    scope: &GlScope<'_>,
    vertex: glow::Shader,
    fragment: glow::Shader,
) -> Result<glow::Program, ShaderError> {
    use glow::HasContext;
    let gl = scope.gl;

    // SAFETY: glow wraps raw GL calls as unsafe. Both shader handles are
    // live, and the program is deleted again if linking fails.
    let program = unsafe { gl.create_program().map_err(ShaderError::LinkError)? };
    scope.ledger.allocated(GpuResource::Program);

    let linked = unsafe {
        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);
        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);
        gl.get_program_link_status(program)
    };

    if linked {
        Ok(program)
    } else {
        let info_log = unsafe { gl.get_program_info_log(program) };
        delete_program(scope, program);
        Err(ShaderError::LinkError(info_log))
    }
}

/// Deletes a program created by [`link_program`].
#[allow(unsafe_code)]
pub fn delete_program(scope: &GlScope<'_>, program: glow::Program) {
    use glow::HasContext;

    // SAFETY: `program` came from link_program and is deleted once.
    unsafe { scope.gl.delete_program(program) };
    scope.ledger.released(GpuResource::Program);
}

/// Builds a program from vertex and fragment sources.
///
/// When a `translator` is given the fragment source is translated first.
/// The intermediate shader objects are always deleted before returning,
/// so on success only the program remains and on failure nothing does.
pub fn compile_program(
    scope: &GlScope<'_>,
    vertex_src: &str,
    fragment_src: &str,
    translator: Option<&dyn ShaderTranslator>,
) -> Result<glow::Program, ShaderError> {
    let fragment_src: Cow<'_, str> = match translator {
        Some(translator) => Cow::Owned(translator.translate(fragment_src)?),
        None => Cow::Borrowed(fragment_src),
    };

    let vert = compile_shader(scope, ShaderStage::Vertex, vertex_src)?;
    let frag = match compile_shader(scope, ShaderStage::Fragment, &fragment_src) {
        Ok(frag) => frag,
        Err(e) => {
            delete_shader(scope, vert);
            return Err(e);
        }
    };

    let result = link_program(scope, vert, frag);

    delete_shader(scope, vert);
    delete_shader(scope, frag);

    result
}

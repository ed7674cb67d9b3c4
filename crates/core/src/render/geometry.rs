//! Static output rectangle: one vertex array plus one vertex buffer.

use super::GlScope;
use crate::error::MixError;
use crate::fullscreen::{QUAD_VERTEX_COUNT, QUAD_VERTICES};
use crate::ledger::GpuResource;

fn vertex_bytes(vertices: &[f32]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Vertex array and buffer holding [`QUAD_VERTICES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadGeometry {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
}

impl QuadGeometry {
    /// Uploads the rectangle and wires it to the attribute at `location`.
    #[allow(unsafe_code)]
    pub fn new(scope: &GlScope<'_>, location: u32) -> Result<Self, MixError> {
        use glow::HasContext;
        let gl = scope.gl;

        // SAFETY: glow wraps raw GL calls as unsafe. The caller holds the
        // context guard and both objects are deleted on the error path.
        let vao = unsafe {
            gl.create_vertex_array()
                .map_err(|message| MixError::Allocation {
                    resource: GpuResource::VertexArray,
                    message,
                })?
        };
        scope.ledger.allocated(GpuResource::VertexArray);

        let vbo = match unsafe { gl.create_buffer() } {
            Ok(vbo) => vbo,
            Err(message) => {
                unsafe { gl.delete_vertex_array(vao) };
                scope.ledger.released(GpuResource::VertexArray);
                return Err(MixError::Allocation {
                    resource: GpuResource::Buffer,
                    message,
                });
            }
        };
        scope.ledger.allocated(GpuResource::Buffer);

        unsafe {
            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                vertex_bytes(&QUAD_VERTICES),
                glow::STATIC_DRAW,
            );
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_f32(location, 2, glow::FLOAT, false, 0, 0);
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }

        Ok(Self { vao, vbo })
    }

    /// Binds the vertex array and issues the draw call.
    #[allow(unsafe_code)]
    pub fn draw(&self, scope: &GlScope<'_>) {
        use glow::HasContext;

        // SAFETY: self.vao is live and holds QUAD_VERTEX_COUNT vertices.
        unsafe {
            scope.gl.bind_vertex_array(Some(self.vao));
            scope.gl.draw_arrays(glow::TRIANGLES, 0, QUAD_VERTEX_COUNT);
            scope.gl.bind_vertex_array(None);
        }
    }

    #[allow(unsafe_code)]
    pub fn destroy(&self, scope: &GlScope<'_>) {
        use glow::HasContext;

        // SAFETY: both handles are valid objects from new().
        unsafe {
            scope.gl.delete_vertex_array(self.vao);
            scope.gl.delete_buffer(self.vbo);
        }
        scope.ledger.released(GpuResource::VertexArray);
        scope.ledger.released(GpuResource::Buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_bytes_hold_every_float() {
        let bytes = vertex_bytes(&QUAD_VERTICES);
        assert_eq!(bytes.len(), QUAD_VERTICES.len() * 4);
        assert_eq!(&bytes[8..12], &1.0_f32.to_ne_bytes());
    }
}

//! Vertex data uploaded to GPU buffers and drawn as a triangle list.

use std::fmt;
use std::rc::Rc;

use crate::backend::Backend;
use crate::context::Context;
use crate::error::{Error, Result};

/// A vertex as supplied by the caller.
///
/// Texture coordinates are only uploaded when the mesh is built with
/// [`VertexLayout::PositionTexCoord`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Texture coordinate.
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// A vertex with a position only.
    #[must_use]
    pub const fn new(position: [f32; 3]) -> Self {
        Self {
            position,
            tex_coord: [0.0, 0.0],
        }
    }

    /// A vertex with a position and a texture coordinate.
    #[must_use]
    pub const fn textured(position: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            tex_coord,
        }
    }
}

/// One vertex attribute stream: shader input name, attribute slot and float
/// component count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Name bound with `glBindAttribLocation`.
    pub name: &'static str,
    /// Attribute slot.
    pub slot: u32,
    /// Number of `f32` components per vertex.
    pub components: i32,
}

const POSITION: VertexAttribute = VertexAttribute {
    name: "position",
    slot: 0,
    components: 3,
};

const TEX_COORD: VertexAttribute = VertexAttribute {
    name: "texCoord",
    slot: 1,
    components: 2,
};

/// Which attribute streams a mesh carries and a program expects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VertexLayout {
    /// `position` at slot 0.
    #[default]
    Position,
    /// `position` at slot 0 and `texCoord` at slot 1.
    PositionTexCoord,
}

impl VertexLayout {
    /// Attribute streams in slot order.
    #[must_use]
    pub fn attributes(self) -> &'static [VertexAttribute] {
        match self {
            Self::Position => &[POSITION],
            Self::PositionTexCoord => &[POSITION, TEX_COORD],
        }
    }

    /// Whether texture coordinates are part of the layout.
    #[must_use]
    pub fn has_tex_coords(self) -> bool {
        matches!(self, Self::PositionTexCoord)
    }
}

/// An immutable triangle list in GPU memory.
///
/// Each attribute stream lives in its own tightly packed buffer. Dropping the
/// mesh deletes the vertex array and every buffer.
pub struct Mesh<B: Backend> {
    backend: Rc<B>,
    vertex_array: B::VertexArray,
    buffers: Vec<B::Buffer>,
    draw_count: i32,
    layout: VertexLayout,
}

impl<B: Backend> Mesh<B> {
    /// Upload `vertices` with a static usage hint.
    ///
    /// # Errors
    ///
    /// [`Error::TooManyVertices`] if the count doesn't fit a GL draw call,
    /// [`Error::Allocation`] if the driver refuses a vertex array or buffer.
    /// Objects created before the failure are released.
    pub fn new(ctx: &mut Context<B>, vertices: &[Vertex], layout: VertexLayout) -> Result<Self> {
        let draw_count = i32::try_from(vertices.len()).map_err(|_| Error::TooManyVertices {
            count: vertices.len(),
        })?;

        let backend = ctx.share_backend();
        let vertex_array = backend
            .create_vertex_array()
            .map_err(Error::allocation("vertex array"))?;

        let mut mesh = Self {
            backend,
            vertex_array,
            buffers: Vec::with_capacity(layout.attributes().len()),
            draw_count,
            layout,
        };

        mesh.backend.bind_vertex_array(Some(vertex_array));

        let positions: Vec<[f32; 3]> = vertices.iter().map(|v| v.position).collect();
        mesh.upload_stream(POSITION, bytemuck::cast_slice(&positions))?;

        if layout.has_tex_coords() {
            let tex_coords: Vec<[f32; 2]> = vertices.iter().map(|v| v.tex_coord).collect();
            mesh.upload_stream(TEX_COORD, bytemuck::cast_slice(&tex_coords))?;
        }

        mesh.backend.bind_vertex_array(None);

        log::debug!(
            "Uploaded mesh {vertex_array:?}: {draw_count} vertices, {layout:?}"
        );
        Ok(mesh)
    }

    /// Create a buffer for one attribute stream, fill it, and point the
    /// attribute slot at it. Expects the vertex array to be bound.
    fn upload_stream(&mut self, attribute: VertexAttribute, data: &[u8]) -> Result<()> {
        let gl = &*self.backend;
        let buffer = gl.create_buffer().map_err(Error::allocation("buffer"))?;
        self.buffers.push(buffer);

        gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
        gl.enable_vertex_attrib_array(attribute.slot);
        gl.vertex_attrib_pointer_f32(
            attribute.slot,
            attribute.components,
            glow::FLOAT,
            false,
            0,
            0,
        );
        Ok(())
    }

    /// Number of vertices issued per draw.
    pub fn draw_count(&self) -> usize {
        // Non-negative by construction.
        usize::try_from(self.draw_count).unwrap_or_default()
    }

    /// Attribute streams held by this mesh.
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Draw every vertex as a triangle list.
    pub fn draw(&self, ctx: &mut Context<B>) {
        let gl = ctx.backend();
        gl.bind_vertex_array(Some(self.vertex_array));
        gl.draw_arrays(glow::TRIANGLES, 0, self.draw_count);
        gl.bind_vertex_array(None);
    }
}

impl<B: Backend> fmt::Debug for Mesh<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("vertex_array", &self.vertex_array)
            .field("buffers", &self.buffers)
            .field("draw_count", &self.draw_count)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> Drop for Mesh<B> {
    fn drop(&mut self) {
        for buffer in self.buffers.drain(..) {
            self.backend.delete_buffer(buffer);
        }
        self.backend.delete_vertex_array(self.vertex_array);
        log::debug!("Deleted mesh {:?}", self.vertex_array);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::recording::{Call, RecordingBackend};

    fn triangle() -> [Vertex; 3] {
        [
            Vertex::textured([-0.5, -0.5, 0.0], [0.0, 0.0]),
            Vertex::textured([0.0, 0.5, 0.0], [0.5, 1.0]),
            Vertex::textured([0.5, -0.5, 0.0], [1.0, 0.0]),
        ]
    }

    fn floats(data: &[u8]) -> Vec<f32> {
        data.chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    #[test]
    fn layouts_expose_fixed_slots() {
        assert_eq!(VertexLayout::Position.attributes(), [POSITION]);
        assert_eq!(
            VertexLayout::PositionTexCoord.attributes(),
            [POSITION, TEX_COORD]
        );
        assert_eq!(TEX_COORD.slot, 1);
        assert_eq!(TEX_COORD.components, 2);
    }

    #[test]
    fn position_only_mesh_uploads_one_stream() {
        let mut ctx = Context::new(RecordingBackend::default());
        let mesh = Mesh::new(&mut ctx, &triangle(), VertexLayout::Position).unwrap();
        assert_eq!(mesh.draw_count(), 3);

        let calls = ctx.backend().calls();
        assert_eq!(
            calls,
            [
                Call::CreateVertexArray(1),
                Call::BindVertexArray(Some(1)),
                Call::CreateBuffer(2),
                Call::BindBuffer {
                    target: glow::ARRAY_BUFFER,
                    buffer: Some(2)
                },
                Call::BufferData {
                    target: glow::ARRAY_BUFFER,
                    data: bytemuck::cast_slice(&[
                        [-0.5_f32, -0.5, 0.0],
                        [0.0, 0.5, 0.0],
                        [0.5, -0.5, 0.0]
                    ])
                    .to_vec(),
                    usage: glow::STATIC_DRAW,
                },
                Call::EnableVertexAttribArray(0),
                Call::VertexAttribPointer {
                    index: 0,
                    size: 3,
                    data_type: glow::FLOAT,
                    stride: 0,
                    offset: 0
                },
                Call::BindVertexArray(None),
            ]
        );
    }

    #[test]
    fn textured_mesh_uploads_separate_uv_stream() {
        let mut ctx = Context::new(RecordingBackend::default());
        let _mesh = Mesh::new(&mut ctx, &triangle(), VertexLayout::PositionTexCoord).unwrap();

        let uploads: Vec<Vec<f32>> = ctx
            .backend()
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::BufferData { data, .. } => Some(floats(&data)),
                _ => None,
            })
            .collect();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0], [-0.5, -0.5, 0.0, 0.0, 0.5, 0.0, 0.5, -0.5, 0.0]);
        assert_eq!(uploads[1], [0.0, 0.0, 0.5, 1.0, 1.0, 0.0]);

        assert_eq!(
            ctx.backend().count(|c| matches!(
                c,
                Call::VertexAttribPointer {
                    index: 1,
                    size: 2,
                    stride: 0,
                    offset: 0,
                    ..
                }
            )),
            1
        );
    }

    #[test]
    fn draw_issues_single_triangle_list() {
        let mut ctx = Context::new(RecordingBackend::default());
        let mesh = Mesh::new(&mut ctx, &triangle(), VertexLayout::Position).unwrap();
        ctx.backend().clear_calls();

        mesh.draw(&mut ctx);
        assert_eq!(
            ctx.backend().calls(),
            [
                Call::BindVertexArray(Some(1)),
                Call::DrawArrays {
                    mode: glow::TRIANGLES,
                    first: 0,
                    count: 3
                },
                Call::BindVertexArray(None),
            ]
        );
    }

    #[test]
    fn drop_releases_vertex_array_and_all_buffers() {
        let mut ctx = Context::new(RecordingBackend::default());
        let mesh = Mesh::new(&mut ctx, &triangle(), VertexLayout::PositionTexCoord).unwrap();
        drop(mesh);
        assert_eq!(ctx.backend().count(|c| matches!(c, Call::DeleteBuffer(_))), 2);
        assert_eq!(
            ctx.backend()
                .count(|c| matches!(c, Call::DeleteVertexArray(1))),
            1
        );
        assert_eq!(ctx.backend().live_objects(), 0);
    }

    #[test]
    fn buffer_allocation_failure_releases_vertex_array() {
        let mut ctx = Context::new(RecordingBackend {
            fail_create: Some("buffer"),
            ..RecordingBackend::default()
        });
        let err = Mesh::new(&mut ctx, &triangle(), VertexLayout::Position).unwrap_err();
        assert!(matches!(err, Error::Allocation { what: "buffer", .. }));
        assert_eq!(ctx.backend().live_objects(), 0);
    }

    #[test]
    fn empty_mesh_issues_zero_count_draw() {
        let mut ctx = Context::new(RecordingBackend::default());
        let mesh = Mesh::new(&mut ctx, &[], VertexLayout::Position).unwrap();
        mesh.draw(&mut ctx);
        assert_eq!(
            ctx.backend().count(|c| matches!(c, Call::DrawArrays { count: 0, .. })),
            1
        );
    }
}

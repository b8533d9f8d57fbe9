//! GPU mesh over a fan-expanded (non-indexed) vertex list.

use crate::vertex::Vertex;
use wgpu::util::DeviceExt;

/// A GPU mesh with a vertex buffer. Vertices are already triangulated,
/// so draws are plain `0..num_vertices` without an index buffer.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub num_vertices: u32,
}

impl Mesh {
    /// Create a mesh from vertex data. An empty slice still produces a
    /// valid (zero-length) mesh; draw calls for it are skipped.
    pub fn new(device: &wgpu::Device, vertices: &[Vertex]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            vertex_buffer,
            num_vertices: vertices.len() as u32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.num_vertices == 0
    }
}

/// Mesh data before GPU upload.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
}

impl MeshData {
    pub fn upload(&self, device: &wgpu::Device) -> Mesh {
        Mesh::new(device, &self.vertices)
    }
}

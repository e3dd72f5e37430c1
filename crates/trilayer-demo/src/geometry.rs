//! Fixed scene geometry: two triangles at different depths.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // base color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const fn v(position: [f32; 3], color: [f32; 3]) -> Vertex {
    Vertex { position, color }
}

/// Near (red) triangle in `0..3`, far (blue) triangle in `3..6`.
pub const VERTICES: [Vertex; 6] = [
    v([-0.6, -0.4, 0.0], [1.0, 0.2, 0.2]),
    v([0.2, -0.4, 0.0], [1.0, 0.2, 0.2]),
    v([-0.2, 0.4, 0.0], [1.0, 0.4, 0.3]),
    v([-0.1, -0.3, 0.5], [0.2, 0.3, 1.0]),
    v([0.7, -0.3, 0.5], [0.2, 0.3, 1.0]),
    v([0.3, 0.5, 0.5], [0.3, 0.4, 1.0]),
];

/// Outline edges as a line list, for adapters without line polygon mode.
pub const EDGE_INDICES: [u16; 12] = [0, 1, 1, 2, 2, 0, 3, 4, 4, 5, 5, 3];

/// One of the two triangles.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Layer {
    /// Depth 0.0, drawn last.
    Near,
    /// Depth 0.5, drawn first.
    Far,
}

impl Layer {
    /// Submission order for alpha blending: farthest first.
    pub const BACK_TO_FRONT: [Layer; 2] = [Layer::Far, Layer::Near];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Layer::Near => 0,
            Layer::Far => 1,
        }
    }

    pub fn vertices(self) -> Range<u32> {
        let start = self.index() as u32 * 3;
        start..start + 3
    }

    pub fn edge_indices(self) -> Range<u32> {
        let start = self.index() as u32 * 6;
        start..start + 6
    }

    #[cfg(test)]
    pub fn depth(self) -> f32 {
        VERTICES[self.vertices().start as usize].position[2]
    }
}

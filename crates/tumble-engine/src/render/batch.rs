//! CPU-side vertex/index accumulation.
//!
//! Every draw call reserves a block of vertices and triangle indexes through
//! [`FrameBatch::enqueue_triangles`]. Consecutive requests for the same
//! [`RenderStateId`] extend the previous [`Batch`], so a frame of debug
//! primitives usually flushes as a handful of indexed draws.

use bytemuck::{Pod, Zeroable};

use super::states::RenderStateId;

// ── vertex ────────────────────────────────────────────────────────────────

/// Vertex layout shared by every render state (48 bytes):
///
///  offset  0  position  [f32; 4]   loc 0
///  offset 16  uv1       [f32; 2]   loc 1
///  offset 24  uv2       [f32; 2]   loc 2
///  offset 32  color     [f32; 4]   loc 3
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 4],
    pub uv1: [f32; 2],
    pub uv2: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x4, // position
        1 => Float32x2, // uv1
        2 => Float32x2, // uv2
        3 => Float32x4  // color
    ];

    #[inline]
    pub const fn new(position: [f32; 4], uv1: [f32; 2], uv2: [f32; 2], color: [f32; 4]) -> Self {
        Self { position, uv1, uv2, color }
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── batches ───────────────────────────────────────────────────────────────

/// A run of indexes drawn with one render state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Batch {
    pub state: RenderStateId,
    pub index_start: u32,
    pub index_count: u32,
}

/// One frame worth of geometry. Capacity is kept across [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct FrameBatch {
    vertices: Vec<Vertex>,
    indexes: Vec<u32>,
    batches: Vec<Batch>,
}

impl FrameBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indexes.clear();
        self.batches.clear();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indexes(&self) -> &[u32] {
        &self.indexes
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Reserves `vertices` vertex slots and `3 * triangles` index slots drawn
    /// with `state`.
    ///
    /// The returned writer must be filled completely before it is dropped.
    pub fn enqueue_triangles(
        &mut self,
        triangles: usize,
        vertices: usize,
        state: RenderStateId,
    ) -> BatchWriter<'_> {
        let index_count = 3 * triangles;
        let base_vertex = self.vertices.len() as u32;

        match self.batches.last_mut() {
            Some(last) if last.state == state => last.index_count += index_count as u32,
            _ => self.batches.push(Batch {
                state,
                index_start: self.indexes.len() as u32,
                index_count: index_count as u32,
            }),
        }

        self.vertices.reserve(vertices);
        self.indexes.reserve(index_count);

        let vertex_end = self.vertices.len() + vertices;
        let index_end = self.indexes.len() + index_count;

        BatchWriter {
            frame: self,
            base_vertex,
            vertex_end,
            index_end,
        }
    }
}

/// Write cursor returned by [`FrameBatch::enqueue_triangles`].
///
/// Indexes passed to the writer are local to the enqueued block and get
/// rebased onto the frame's vertex buffer.
pub struct BatchWriter<'a> {
    frame: &'a mut FrameBatch,
    base_vertex: u32,
    vertex_end: usize,
    index_end: usize,
}

impl BatchWriter<'_> {
    #[inline]
    pub fn push_vertex(&mut self, v: Vertex) -> &mut Self {
        debug_assert!(self.frame.vertices.len() < self.vertex_end, "vertex reservation exceeded");
        self.frame.vertices.push(v);
        self
    }

    /// Appends `local` indexes, each offset by `offset` vertices into the block.
    pub fn push_indexes_at(&mut self, offset: u32, local: &[u32]) -> &mut Self {
        debug_assert!(
            self.frame.indexes.len() + local.len() <= self.index_end,
            "index reservation exceeded"
        );
        let base = self.base_vertex + offset;
        self.frame.indexes.extend(local.iter().map(|i| base + i));
        self
    }

    #[inline]
    pub fn push_indexes(&mut self, local: &[u32]) -> &mut Self {
        self.push_indexes_at(0, local)
    }
}

impl Drop for BatchWriter<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        debug_assert_eq!(self.frame.vertices.len(), self.vertex_end, "vertex block not filled");
        debug_assert_eq!(self.frame.indexes.len(), self.index_end, "index block not filled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(frame: &mut FrameBatch, state: RenderStateId) {
        let mut w = frame.enqueue_triangles(2, 4, state);
        for _ in 0..4 {
            w.push_vertex(Vertex::default());
        }
        w.push_indexes(&[0, 1, 2, 2, 3, 0]);
    }

    // ── merging ───────────────────────────────────────────────────────────

    #[test]
    fn same_state_requests_merge_into_one_batch() {
        let mut frame = FrameBatch::new();
        quad(&mut frame, RenderStateId::Primitive);
        quad(&mut frame, RenderStateId::Primitive);

        assert_eq!(frame.batches().len(), 1);
        assert_eq!(frame.batches()[0].index_count, 12);
        assert_eq!(frame.vertices().len(), 8);
    }

    #[test]
    fn state_change_starts_a_new_batch() {
        let mut frame = FrameBatch::new();
        quad(&mut frame, RenderStateId::Primitive);
        quad(&mut frame, RenderStateId::Font);
        quad(&mut frame, RenderStateId::Primitive);

        let states: Vec<_> = frame.batches().iter().map(|b| b.state).collect();
        assert_eq!(
            states,
            [RenderStateId::Primitive, RenderStateId::Font, RenderStateId::Primitive]
        );
        assert_eq!(frame.batches()[1].index_start, 6);
        assert_eq!(frame.batches()[2].index_start, 12);
    }

    // ── rebasing ──────────────────────────────────────────────────────────

    #[test]
    fn indexes_are_rebased_onto_the_block() {
        let mut frame = FrameBatch::new();
        quad(&mut frame, RenderStateId::Primitive);
        quad(&mut frame, RenderStateId::Primitive);
        assert_eq!(&frame.indexes()[6..], &[4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn offset_indexes_address_later_vertices() {
        let mut frame = FrameBatch::new();
        {
            let mut w = frame.enqueue_triangles(2, 6, RenderStateId::ShadowMask);
            for _ in 0..6 {
                w.push_vertex(Vertex::default());
            }
            w.push_indexes_at(3, &[0, 1, 2, 0, 2, 1]);
        }
        assert_eq!(frame.indexes(), &[3, 4, 5, 3, 5, 4]);
    }

    #[test]
    fn clear_keeps_nothing_but_capacity() {
        let mut frame = FrameBatch::new();
        quad(&mut frame, RenderStateId::Primitive);
        frame.clear();
        assert!(frame.is_empty());
        assert!(frame.batches().is_empty());
        assert!(frame.vertices().is_empty());
    }

    #[test]
    fn vertex_is_48_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 48);
    }
}

/// Concatenation of several meshes into one upload buffer
use std::ops::Range;

use crate::geometry::{Mesh, PackedVertex, ShadedMesh, TriangleWithNormal};

/// A sub-range of a batch, counted in triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    pub start: usize,
    pub count: usize,
}

impl DrawRange {
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    /// One past the last triangle, or `None` if that overflows
    pub fn end(&self) -> Option<usize> {
        self.start.checked_add(self.count)
    }

    /// Triangle indices covered by this range
    pub fn triangles(&self) -> Option<Range<usize>> {
        Some(self.start..self.end()?)
    }

    /// Vertex indices covered by this range, three per triangle
    pub fn vertices(&self) -> Option<Range<usize>> {
        let first = self.start.checked_mul(3)?;
        let count = self.count.checked_mul(3)?;
        Some(first..first.checked_add(count)?)
    }
}

/// Several shaded meshes sharing one contiguous triangle list.
///
/// Each pushed mesh keeps its own `DrawRange` so it can be drawn on its own.
#[derive(Debug, Clone, Default)]
pub struct MeshBatch {
    triangles: Vec<TriangleWithNormal>,
    ranges: Vec<DrawRange>,
}

impl MeshBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mesh and return the range it occupies
    pub fn push(&mut self, mesh: ShadedMesh) -> DrawRange {
        let range = DrawRange::new(self.triangles.len(), mesh.len());
        self.triangles.extend(mesh.triangles);
        self.ranges.push(range);
        range
    }

    /// Center a raw mesh, build its normals, then append it
    pub fn push_prepared(&mut self, mesh: Mesh) -> DrawRange {
        self.push(mesh.centered().build_normals())
    }

    pub fn ranges(&self) -> &[DrawRange] {
        &self.ranges
    }

    pub fn triangles(&self) -> &[TriangleWithNormal] {
        &self.triangles
    }

    /// Triangles covered by `range`, or `None` if it reaches past the end
    pub fn slice(&self, range: DrawRange) -> Option<&[TriangleWithNormal]> {
        self.triangles.get(range.triangles()?)
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn packed_vertices(&self) -> Vec<PackedVertex> {
        self.triangles.iter().flat_map(|t| t.packed()).collect()
    }
}

/// Geometry primitives and the normal/centering pipeline
use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector3};

/// A vertex position paired with the normal used to shade it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// Interleaved vertex record as it is laid out in a device buffer.
///
/// Stride is 24 bytes: position then normal, three `f32` each.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Zeroable, Pod)]
pub struct PackedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl From<&Vertex> for PackedVertex {
    fn from(vertex: &Vertex) -> Self {
        Self {
            position: vertex.position.coords.into(),
            normal: vertex.normal.into(),
        }
    }
}

/// A raw triangle as read from a mesh file, without normals.
///
/// Winding order is kept as stored and decides the sign of the face normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(p0: Point3<f32>, p1: Point3<f32>, p2: Point3<f32>) -> Self {
        Self {
            vertices: [p0, p1, p2],
        }
    }

    /// Unit face normal, or `None` when the triangle has no area.
    pub fn try_face_normal(&self) -> Option<Vector3<f32>> {
        let [p0, p1, p2] = self.vertices;

        let a = p0 - p1;
        let b = p0 - p2;

        a.cross(&b)
            .try_normalize(0.0)
            .filter(|n| n.iter().all(|c| c.is_finite()))
    }

    /// Face normal with the zero vector standing in for degenerate triangles
    pub fn face_normal(&self) -> Vector3<f32> {
        self.try_face_normal().unwrap_or_else(Vector3::zeros)
    }

    pub fn is_degenerate(&self) -> bool {
        self.try_face_normal().is_none()
    }

    /// Pair every vertex with the face normal
    pub fn with_normal(&self) -> TriangleWithNormal {
        self.shaded(self.face_normal())
    }

    fn shaded(&self, n: Vector3<f32>) -> TriangleWithNormal {
        let [p0, p1, p2] = self.vertices;
        TriangleWithNormal {
            vertices: [Vertex::new(p0, n), Vertex::new(p1, n), Vertex::new(p2, n)],
        }
    }

    fn translate(&mut self, offset: &Vector3<f32>) {
        for p in &mut self.vertices {
            *p -= offset;
        }
    }
}

/// A triangle ready for flat shading: all three vertices carry the same normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleWithNormal {
    pub vertices: [Vertex; 3],
}

impl TriangleWithNormal {
    pub fn normal(&self) -> Vector3<f32> {
        self.vertices[0].normal
    }

    /// Interleaved records in upload order: p0, n0, p1, n1, p2, n2
    pub fn packed(&self) -> [PackedVertex; 3] {
        [
            PackedVertex::from(&self.vertices[0]),
            PackedVertex::from(&self.vertices[1]),
            PackedVertex::from(&self.vertices[2]),
        ]
    }
}

impl From<&Triangle> for TriangleWithNormal {
    fn from(triangle: &Triangle) -> Self {
        triangle.with_normal()
    }
}

/// An ordered list of raw triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Mean of every vertex position, `None` for an empty mesh
    pub fn centroid(&self) -> Option<Point3<f32>> {
        if self.triangles.is_empty() {
            return None;
        }

        // f64 keeps large meshes from drifting while summing
        let sum = self
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .fold(Vector3::<f64>::zeros(), |acc, p| acc + p.coords.cast::<f64>());

        let mean = sum / (self.triangles.len() * 3) as f64;
        Some(Point3::from(mean.cast::<f32>()))
    }

    /// Move the mesh so its centroid sits at the origin.
    ///
    /// Returns the offset that was subtracted from every vertex. An empty
    /// mesh is left untouched and yields `None`. Running this again on an
    /// already centered mesh subtracts whatever rounding residue remains.
    pub fn center_in_place(&mut self) -> Option<Vector3<f32>> {
        let offset = self.centroid()?.coords;
        for triangle in &mut self.triangles {
            triangle.translate(&offset);
        }
        log::debug!(
            "centered {} triangles by ({:.4}, {:.4}, {:.4})",
            self.triangles.len(),
            offset.x,
            offset.y,
            offset.z
        );
        Some(offset)
    }

    pub fn centered(mut self) -> Self {
        self.center_in_place();
        self
    }

    /// Compute the flat face normal of every triangle.
    ///
    /// Output triangle `i` comes from input triangle `i`. Degenerate
    /// triangles get a zero normal.
    pub fn build_normals(&self) -> ShadedMesh {
        let mut degenerate = 0usize;
        let triangles = self
            .triangles
            .iter()
            .enumerate()
            .map(|(i, t)| match t.try_face_normal() {
                Some(n) => t.shaded(n),
                None => {
                    log::debug!("triangle {} is degenerate, using zero normal", i);
                    degenerate += 1;
                    t.shaded(Vector3::zeros())
                }
            })
            .collect();

        if degenerate > 0 {
            log::warn!(
                "{} of {} triangles are degenerate and have no face normal",
                degenerate,
                self.triangles.len()
            );
        }

        ShadedMesh { triangles }
    }

    /// Create a simple cube mesh with outward winding
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let p = |x: f32, y: f32, z: f32| Point3::new(x * h, y * h, z * h);
        let faces = [
            // Front
            [p(-1., -1., 1.), p(1., -1., 1.), p(1., 1., 1.)],
            [p(-1., -1., 1.), p(1., 1., 1.), p(-1., 1., 1.)],
            // Back
            [p(-1., -1., -1.), p(-1., 1., -1.), p(1., 1., -1.)],
            [p(-1., -1., -1.), p(1., 1., -1.), p(1., -1., -1.)],
            // Top
            [p(-1., 1., -1.), p(-1., 1., 1.), p(1., 1., 1.)],
            [p(-1., 1., -1.), p(1., 1., 1.), p(1., 1., -1.)],
            // Bottom
            [p(-1., -1., -1.), p(1., -1., -1.), p(1., -1., 1.)],
            [p(-1., -1., -1.), p(1., -1., 1.), p(-1., -1., 1.)],
            // Right
            [p(1., -1., -1.), p(1., 1., -1.), p(1., 1., 1.)],
            [p(1., -1., -1.), p(1., 1., 1.), p(1., -1., 1.)],
            // Left
            [p(-1., -1., -1.), p(-1., -1., 1.), p(-1., 1., 1.)],
            [p(-1., -1., -1.), p(-1., 1., 1.), p(-1., 1., -1.)],
        ];

        let mut mesh = Self::with_capacity(faces.len());
        for [a, b, c] in faces {
            mesh.add_triangle(Triangle::new(a, b, c));
        }
        mesh
    }
}

/// An ordered list of triangles carrying face normals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadedMesh {
    pub triangles: Vec<TriangleWithNormal>,
}

impl ShadedMesh {
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

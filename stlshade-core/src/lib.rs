/// STLShade Core Library - mesh loading and preparation for rendering
///
/// This library reads STL meshes, recenters them, computes flat face
/// normals and packs several meshes into one buffer with per-mesh draw
/// ranges. Drawing itself goes through the `Renderer` trait, so nothing
/// here depends on a graphics API.

pub mod batch;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod render;
pub mod scene;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use batch::{DrawRange, MeshBatch};
pub use error::StlError;
pub use geometry::{Mesh, PackedVertex, ShadedMesh, Triangle, TriangleWithNormal, Vertex};
pub use projection::{Camera, ProjectionMode, ScreenPoint};
pub use render::{BufferHandle, Renderer, Uniform};
pub use scene::{Bounce, LightSource, Material, Motion, Scene, SceneObject};
pub use transform::{ModelTransform, RotationState};

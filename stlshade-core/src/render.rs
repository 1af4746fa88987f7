/// Interface between prepared mesh data and a device that draws it
use nalgebra::{Matrix4, Vector3};

use crate::batch::DrawRange;
use crate::geometry::PackedVertex;

pub const LIGHT_POSITION: &str = "lightPosition";
pub const LIGHT_EMITTED: &str = "lightEmitted";
pub const ALBEDO: &str = "albedo";
pub const TRANSLATE: &str = "translate";
pub const TRANSFORM: &str = "transform";

/// Owned handle to a vertex buffer living on the device.
///
/// Only the renderer that issued a handle can resolve it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(u32);

impl BufferHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// A named shader parameter value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Scalar(f32),
    Vec3(Vector3<f32>),
    Mat4(Matrix4<f32>),
}

impl From<f32> for Uniform {
    fn from(value: f32) -> Self {
        Uniform::Scalar(value)
    }
}

impl From<Vector3<f32>> for Uniform {
    fn from(value: Vector3<f32>) -> Self {
        Uniform::Vec3(value)
    }
}

impl From<Matrix4<f32>> for Uniform {
    fn from(value: Matrix4<f32>) -> Self {
        Uniform::Mat4(value)
    }
}

/// A device that accepts vertex uploads, parameter updates and draw calls.
///
/// Parameters set with `set_uniform` stay in effect for every following
/// `draw` until they are set again.
pub trait Renderer {
    type Error;

    fn upload(&mut self, vertices: &[PackedVertex]) -> Result<BufferHandle, Self::Error>;

    fn set_uniform(&mut self, name: &str, value: Uniform);

    /// Draw the triangles in `range` of a previously uploaded buffer
    fn draw(&mut self, buffer: &BufferHandle, range: DrawRange) -> Result<(), Self::Error>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Everything a renderer was asked to do, in call order
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Upload(usize),
        Uniform(String, Uniform),
        Draw(u32, DrawRange),
    }

    #[derive(Default)]
    pub(crate) struct RecordingRenderer {
        pub calls: Vec<Call>,
        buffers: Vec<usize>,
    }

    impl Renderer for RecordingRenderer {
        type Error = String;

        fn upload(&mut self, vertices: &[PackedVertex]) -> Result<BufferHandle, String> {
            self.calls.push(Call::Upload(vertices.len()));
            self.buffers.push(vertices.len() / 3);
            Ok(BufferHandle::new(self.buffers.len() as u32 - 1))
        }

        fn set_uniform(&mut self, name: &str, value: Uniform) {
            self.calls.push(Call::Uniform(name.to_string(), value));
        }

        fn draw(&mut self, buffer: &BufferHandle, range: DrawRange) -> Result<(), String> {
            let triangles = self
                .buffers
                .get(buffer.id() as usize)
                .ok_or_else(|| format!("unknown buffer {}", buffer.id()))?;
            if range.end().map_or(true, |end| end > *triangles) {
                return Err(format!("range {:?} past {} triangles", range, triangles));
            }
            self.calls.push(Call::Draw(buffer.id(), range));
            Ok(())
        }
    }

    #[test]
    fn test_uniform_conversions() {
        assert_eq!(Uniform::from(2.0f32), Uniform::Scalar(2.0));
        assert_eq!(
            Uniform::from(Vector3::new(1.0f32, 2.0, 3.0)),
            Uniform::Vec3(Vector3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(
            Uniform::from(Matrix4::<f32>::identity()),
            Uniform::Mat4(Matrix4::identity())
        );
    }

    #[test]
    fn test_draw_rejects_range_past_upload() {
        let mut renderer = RecordingRenderer::default();
        let handle = renderer.upload(&[PackedVertex::default(); 6]).unwrap();
        assert!(renderer.draw(&handle, DrawRange::new(0, 2)).is_ok());
        assert!(renderer.draw(&handle, DrawRange::new(1, 2)).is_err());
        assert!(renderer.draw(&handle, DrawRange::new(usize::MAX, 1)).is_err());
        assert!(renderer.draw(&BufferHandle::new(7), DrawRange::new(0, 1)).is_err());
    }
}

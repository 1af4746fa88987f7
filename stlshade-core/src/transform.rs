/// Model transforms and interactive rotation state
use nalgebra::{Matrix4, Point3, Unit, Vector3};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Rotation applied in order X, then Y, then Z
    pub fn matrix(&self) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(self.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, self.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, self.z));
        rz * ry * rx
    }
}

/// Builder for a model matrix.
///
/// Every step multiplies on the right, so the last step added is the first
/// one applied to a vertex:
/// `identity().rotate_y(180.0).scale(0.01)` scales, then rotates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    matrix: Matrix4<f32>,
}

impl ModelTransform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Rotate about an arbitrary axis. A zero axis leaves the transform unchanged.
    pub fn rotate(self, axis: Vector3<f32>, degrees: f32) -> Self {
        match Unit::try_new(axis, f32::EPSILON) {
            Some(axis) => self.then(Matrix4::from_axis_angle(&axis, degrees.to_radians())),
            None => self,
        }
    }

    pub fn rotate_x(self, degrees: f32) -> Self {
        self.rotate(Vector3::x(), degrees)
    }

    pub fn rotate_y(self, degrees: f32) -> Self {
        self.rotate(Vector3::y(), degrees)
    }

    pub fn rotate_z(self, degrees: f32) -> Self {
        self.rotate(Vector3::z(), degrees)
    }

    pub fn scale(self, factor: f32) -> Self {
        self.then(Matrix4::new_scaling(factor))
    }

    pub fn scale_nonuniform(self, factors: Vector3<f32>) -> Self {
        self.then(Matrix4::new_nonuniform_scaling(&factors))
    }

    pub fn translate(self, offset: Vector3<f32>) -> Self {
        self.then(Matrix4::new_translation(&offset))
    }

    fn then(self, step: Matrix4<f32>) -> Self {
        Self {
            matrix: self.matrix * step,
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        self.matrix
    }

    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        self.matrix.transform_point(point)
    }
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<RotationState> for ModelTransform {
    fn from(rotation: RotationState) -> Self {
        Self {
            matrix: rotation.matrix(),
        }
    }
}

/// Rotation part of a model matrix, for carrying normals into world space
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix4<f32> {
    model
        .try_inverse()
        .map(|inverse| inverse.transpose())
        .unwrap_or_else(|| *model)
}

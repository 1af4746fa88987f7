/// Per-frame scene state: a moving light, bouncing objects and their draw calls
use nalgebra::{Point3, Vector2, Vector3};

use crate::batch::DrawRange;
use crate::render::{self, BufferHandle, Renderer};
use crate::transform::ModelTransform;

/// A point light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    pub position: Point3<f32>,
    pub radiance: Vector3<f32>,
}

impl LightSource {
    /// Move the light along its orbit for time `t` (seconds)
    pub fn orbit(&mut self, t: f32) {
        self.position = Point3::new(100.0 * t.sin(), 150.0 * t.cos(), 50.0);
    }
}

impl Default for LightSource {
    fn default() -> Self {
        let mut light = Self {
            position: Point3::origin(),
            radiance: Vector3::repeat(40_000.0),
        };
        light.orbit(0.0);
        light
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub albedo: Vector3<f32>,
}

impl Material {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            albedo: Vector3::new(r, g, b),
        }
    }
}

/// Screen-space motion that reverses on each axis when it leaves `[-limit, limit]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    pub position: Vector2<f32>,
    pub direction: Vector2<f32>,
    pub speed: Vector2<f32>,
    pub limit: Vector2<f32>,
}

impl Bounce {
    pub fn new(start: Vector2<f32>, speed: Vector2<f32>, limit: Vector2<f32>) -> Self {
        Self {
            position: start,
            direction: Vector2::new(1.0, 1.0),
            speed,
            limit,
        }
    }

    /// Advance one frame
    pub fn step(&mut self) {
        for axis in 0..2 {
            self.position[axis] += self.direction[axis] * self.speed[axis];
            if self.position[axis].abs() > self.limit[axis] {
                self.direction[axis] = -self.direction[axis];
            }
        }
    }

    /// Current offset as a translation with zero depth
    pub fn translation(&self) -> Vector3<f32> {
        Vector3::new(self.position.x, self.position.y, 0.0)
    }
}

/// How an object moves from frame to frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Fixed(Vector3<f32>),
    Bouncing(Bounce),
}

impl Motion {
    pub fn translation(&self) -> Vector3<f32> {
        match self {
            Motion::Fixed(offset) => *offset,
            Motion::Bouncing(bounce) => bounce.translation(),
        }
    }
}

/// One drawable slice of the shared buffer with its own placement and colour
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub range: DrawRange,
    pub transform: ModelTransform,
    pub motion: Motion,
    pub material: Material,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub light: LightSource,
    pub objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new(light: LightSource) -> Self {
        Self {
            light,
            objects: Vec::new(),
        }
    }

    pub fn add(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    /// Advance the light and every moving object to time `t`
    pub fn update(&mut self, t: f32) {
        self.light.orbit(t);
        for object in &mut self.objects {
            if let Motion::Bouncing(bounce) = &mut object.motion {
                bounce.step();
            }
        }
    }

    /// Issue one frame of draw calls.
    ///
    /// Light parameters are set once, then each object sets its own
    /// placement and albedo before its range is drawn.
    pub fn draw<R: Renderer>(&self, renderer: &mut R, buffer: &BufferHandle) -> Result<(), R::Error> {
        renderer.set_uniform(render::LIGHT_POSITION, self.light.position.coords.into());
        renderer.set_uniform(render::LIGHT_EMITTED, self.light.radiance.into());

        for object in &self.objects {
            renderer.set_uniform(render::TRANSLATE, object.motion.translation().into());
            renderer.set_uniform(render::TRANSFORM, object.transform.matrix().into());
            renderer.set_uniform(render::ALBEDO, object.material.albedo.into());
            renderer.draw(buffer, object.range)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::MeshBatch;
    use crate::geometry::Mesh;
    use crate::render::tests::{Call, RecordingRenderer};
    use crate::render::Uniform;

    #[test]
    fn test_light_orbit() {
        let mut light = LightSource::default();
        assert!((light.position - Point3::new(0.0, 150.0, 50.0)).norm() < 1e-4);

        light.orbit(std::f32::consts::FRAC_PI_2);
        assert!((light.position - Point3::new(100.0, 0.0, 50.0)).norm() < 1e-3);
        assert_eq!(light.radiance, Vector3::new(40_000.0, 40_000.0, 40_000.0));
    }

    #[test]
    fn test_bounce_reverses_past_limit() {
        let mut bounce = Bounce::new(
            Vector2::new(0.95, 0.0),
            Vector2::new(0.1, 0.0),
            Vector2::new(1.0, 1.0),
        );

        bounce.step();
        assert!((bounce.position.x - 1.05).abs() < 1e-6);
        assert_eq!(bounce.direction.x, -1.0);

        bounce.step();
        assert!((bounce.position.x - 0.95).abs() < 1e-6);
        assert_eq!(bounce.direction.x, -1.0);
        assert_eq!(bounce.direction.y, 1.0);
    }

    #[test]
    fn test_bounce_stays_near_limits() {
        let mut bounce = Bounce::new(
            Vector2::new(0.2, -0.4),
            Vector2::new(0.01, 0.02),
            Vector2::new(1.7, 1.7),
        );
        for _ in 0..2000 {
            bounce.step();
            assert!(bounce.position.x.abs() <= 1.7 + 0.01 + 1e-4);
            assert!(bounce.position.y.abs() <= 1.7 + 0.02 + 1e-4);
        }
    }

    #[test]
    fn test_draw_sets_uniforms_before_each_range() {
        let mut batch = MeshBatch::new();
        let first = batch.push_prepared(Mesh::cube(1.0));
        let second = batch.push_prepared(Mesh::cube(2.0));

        let mut scene = Scene::default();
        scene.add(SceneObject {
            name: "first".to_string(),
            range: first,
            transform: ModelTransform::identity(),
            motion: Motion::Fixed(Vector3::new(-0.5, 0.0, 0.0)),
            material: Material::new(0.1, 0.8, 0.15),
        });
        scene.add(SceneObject {
            name: "second".to_string(),
            range: second,
            transform: ModelTransform::identity().scale(0.5),
            motion: Motion::Bouncing(Bounce::new(
                Vector2::new(0.2, -0.4),
                Vector2::new(0.01, 0.02),
                Vector2::new(1.7, 1.7),
            )),
            material: Material::new(0.75, 0.2, 0.1),
        });

        let mut renderer = RecordingRenderer::default();
        let buffer = renderer.upload(&batch.packed_vertices()).unwrap();
        scene.draw(&mut renderer, &buffer).unwrap();

        let calls = &renderer.calls;
        assert_eq!(calls.len(), 1 + 2 + 4 * 2);
        assert_eq!(calls[0], Call::Upload(24 * 3));
        assert!(matches!(&calls[1], Call::Uniform(name, _) if name == "lightPosition"));
        assert!(matches!(&calls[2], Call::Uniform(name, _) if name == "lightEmitted"));
        assert_eq!(
            calls[3],
            Call::Uniform("translate".to_string(), Uniform::Vec3(Vector3::new(-0.5, 0.0, 0.0)))
        );
        assert_eq!(
            calls[5],
            Call::Uniform("albedo".to_string(), Uniform::Vec3(Vector3::new(0.1, 0.8, 0.15)))
        );
        assert_eq!(calls[6], Call::Draw(buffer.id(), first));
        assert_eq!(
            calls[7],
            Call::Uniform("translate".to_string(), Uniform::Vec3(Vector3::new(0.2, -0.4, 0.0)))
        );
        assert_eq!(calls[10], Call::Draw(buffer.id(), second));
    }

    #[test]
    fn test_update_moves_only_bouncing_objects() {
        let mut scene = Scene::new(LightSource::default());
        let bounce = Bounce::new(
            Vector2::new(0.0, 0.0),
            Vector2::new(0.5, 0.25),
            Vector2::new(1.0, 1.0),
        );
        for motion in [Motion::Fixed(Vector3::x()), Motion::Bouncing(bounce)] {
            scene.add(SceneObject {
                name: String::new(),
                range: DrawRange::new(0, 0),
                transform: ModelTransform::identity(),
                motion,
                material: Material::new(1.0, 1.0, 1.0),
            });
        }

        scene.update(1.0);
        assert_eq!(scene.objects[0].motion.translation(), Vector3::x());
        assert_eq!(
            scene.objects[1].motion.translation(),
            Vector3::new(0.5, 0.25, 0.0)
        );
        assert!((scene.light.position.x - 100.0 * 1.0f32.sin()).abs() < 1e-3);
    }
}

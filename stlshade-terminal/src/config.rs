/// Demo settings: which models to load, where they sit and how they move
use std::path::PathBuf;

use anyhow::bail;
use nalgebra::{Vector2, Vector3};
use stlshade_core::{Bounce, LightSource, Material, ModelTransform, Motion, ProjectionMode};

/// Edge length of the cube drawn in place of a missing model.
/// Sized like a typical STL part so the same model transform fits it.
pub const FALLBACK_CUBE_SIZE: f32 = 100.0;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub name: String,
    /// `None` draws the fallback cube
    pub path: Option<PathBuf>,
    pub transform: ModelTransform,
    pub motion: Motion,
    pub material: Material,
}

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub models: Vec<ModelConfig>,
    pub light: LightSource,
    pub frame_rate: u32,
    pub projection: ProjectionMode,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            models: vec![
                ModelConfig {
                    name: "first".to_string(),
                    path: None,
                    transform: ModelTransform::identity()
                        .rotate_y(180.0)
                        .rotate_x(-90.0)
                        .scale(0.01),
                    motion: Motion::Bouncing(Bounce::new(
                        Vector2::new(0.2, -0.4),
                        Vector2::new(0.01, 0.02),
                        Vector2::new(1.7, 1.7),
                    )),
                    material: Material::new(0.1, 0.8, 0.15),
                },
                ModelConfig {
                    name: "second".to_string(),
                    path: None,
                    transform: ModelTransform::identity()
                        .rotate_x(90.0)
                        .rotate_y(-135.0)
                        .scale(0.01),
                    motion: Motion::Fixed(Vector3::new(-0.5, 0.0, 0.0)),
                    material: Material::new(0.75, 0.2, 0.1),
                },
            ],
            light: LightSource::default(),
            frame_rate: 30,
            projection: ProjectionMode::Perspective,
        }
    }
}

impl DemoConfig {
    /// Defaults with model paths taken from positional arguments, in order
    pub fn from_args<I, S>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();
        let paths: Vec<String> = args.into_iter().map(Into::into).collect();

        if paths.len() > config.models.len() {
            bail!(
                "expected at most {} STL files, got {}",
                config.models.len(),
                paths.len()
            );
        }

        for (model, path) in config.models.iter_mut().zip(paths) {
            model.path = Some(PathBuf::from(path));
        }
        Ok(config)
    }
}

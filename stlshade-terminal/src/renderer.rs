/// ASCII rasterizer implementing the `Renderer` interface
use std::collections::HashMap;
use std::fmt;
use std::io::Write;

use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3, Vector3};
use stlshade_core::render::{self, BufferHandle, Renderer, Uniform};
use stlshade_core::transform::normal_matrix;
use stlshade_core::{Camera, DrawRange, PackedVertex, ScreenPoint};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    UnknownBuffer(u32),
    RangeOutOfBounds { range: DrawRange, triangles: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnknownBuffer(id) => write!(f, "unknown buffer {}", id),
            RenderError::RangeOutOfBounds { range, triangles } => write!(
                f,
                "draw range of {} triangles from {} exceeds buffer of {} triangles",
                range.count,
                range.start,
                triangles
            ),
        }
    }
}

impl std::error::Error for RenderError {}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: Color,
}

const EMPTY: Cell = Cell {
    character: ' ',
    color: Color::Reset,
};

/// Renders uploaded vertex buffers into a grid of coloured characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
    buffers: Vec<Vec<PackedVertex>>,
    uniforms: HashMap<String, Uniform>,
    camera: Camera,
    view_rotation: Matrix4<f32>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let mut camera = Camera::new(width as u32, height as u32);
        camera.aspect *= CELL_ASPECT;

        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![EMPTY; size],
            buffers: Vec::new(),
            uniforms: HashMap::new(),
            camera,
            view_rotation: Matrix4::identity(),
        }
    }

    /// Reallocate the character grid, keeping uploads and uniforms
    pub fn resize(&mut self, width: usize, height: usize) {
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.cells = vec![EMPTY; size];
        self.camera.aspect = width as f32 / height.max(1) as f32 * CELL_ASPECT;
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Rotation applied to the whole scene before projection.
    ///
    /// The light turns with the scene, so the rotation moves the viewpoint
    /// and leaves the lighting on each model unchanged.
    pub fn set_view_rotation(&mut self, rotation: Matrix4<f32>) {
        self.view_rotation = rotation;
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(EMPTY);
    }

    pub fn character_at(&self, x: usize, y: usize) -> Option<char> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x].character)
    }

    fn vec3(&self, name: &str) -> Vector3<f32> {
        match self.uniforms.get(name) {
            Some(Uniform::Vec3(v)) => *v,
            Some(Uniform::Scalar(s)) => Vector3::repeat(*s),
            _ => Vector3::zeros(),
        }
    }

    fn mat4(&self, name: &str) -> Matrix4<f32> {
        match self.uniforms.get(name) {
            Some(Uniform::Mat4(m)) => *m,
            _ => Matrix4::identity(),
        }
    }

    fn render_triangle(&mut self, vertices: &[PackedVertex], model: &Matrix4<f32>, normals: &Matrix4<f32>) {
        let mut screen = [ScreenPoint {
            x: 0.0,
            y: 0.0,
            depth: 0.0,
        }; 3];
        for (out, vertex) in screen.iter_mut().zip(vertices) {
            match self.camera.project_to_screen(
                &Point3::from(vertex.position),
                model,
                self.width as u32,
                self.height as u32,
            ) {
                Some(point) => *out = point,
                None => return, // Triangle is clipped
            }
        }

        let center = vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + Vector3::from(v.position))
            / 3.0;
        let world_center = model.transform_point(&Point3::from(center));
        let normal = normals
            .transform_vector(&Vector3::from(vertices[0].normal))
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros);

        let cell = self.shade(&world_center, &normal);
        self.rasterize_triangle(&screen, cell);
    }

    /// Lambertian diffuse: albedo * radiance * cos(theta) / d^2
    fn shade(&self, position: &Point3<f32>, normal: &Vector3<f32>) -> Cell {
        let light = self
            .view_rotation
            .transform_point(&Point3::from(self.vec3(render::LIGHT_POSITION)));
        let to_light = light - position;
        let distance_sq = to_light.norm_squared().max(1e-6);
        let cos = normal.dot(&to_light.normalize()).max(0.0);

        let albedo = self.vec3(render::ALBEDO);
        let irradiance = self.vec3(render::LIGHT_EMITTED) * (cos / distance_sq);
        let rgb = albedo.component_mul(&irradiance).map(|c| c.clamp(0.0, 1.0));

        let luminance = 0.2126 * rgb.x + 0.7152 * rgb.y + 0.0722 * rgb.z;
        // Lit or not, a covered cell never renders as blank
        let index = 1 + (luminance * (LUMINOSITY_RAMP.len() - 2) as f32).round() as usize;
        let index = index.min(LUMINOSITY_RAMP.len() - 1);

        let tint = albedo.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);
        let fade = 0.3 + 0.7 * luminance;
        Cell {
            character: LUMINOSITY_RAMP[index],
            color: Color::Rgb {
                r: (tint.x as f32 * fade) as u8,
                g: (tint.y as f32 * fade) as u8,
                b: (tint.z as f32 * fade) as u8,
            },
        }
    }

    fn rasterize_triangle(&mut self, coords: &[ScreenPoint; 3], cell: Cell) {
        let [v0, v1, v2] = *coords;

        // Bounding box clipped to screen bounds
        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i32).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i32).max(0);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);

                if let Some((w0, w1, w2)) = barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), p) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.cells[idx] = cell;
                        }
                    }
                }
            }
        }
    }

    pub fn present<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in self.cells.chunks(self.width.max(1)) {
            for cell in row {
                writer.queue(SetForegroundColor(cell.color))?;
                writer.queue(Print(cell.character))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Renderer for AsciiRenderer {
    type Error = RenderError;

    fn upload(&mut self, vertices: &[PackedVertex]) -> Result<BufferHandle, RenderError> {
        self.buffers.push(vertices.to_vec());
        let handle = BufferHandle::new(self.buffers.len() as u32 - 1);
        log::debug!("uploaded {} vertices as buffer {}", vertices.len(), handle.id());
        Ok(handle)
    }

    fn set_uniform(&mut self, name: &str, value: Uniform) {
        self.uniforms.insert(name.to_string(), value);
    }

    fn draw(&mut self, buffer: &BufferHandle, range: DrawRange) -> Result<(), RenderError> {
        let vertices = self
            .buffers
            .get(buffer.id() as usize)
            .ok_or(RenderError::UnknownBuffer(buffer.id()))?;
        let vertices = range
            .vertices()
            .and_then(|span| vertices.get(span))
            .ok_or(RenderError::RangeOutOfBounds {
                range,
                triangles: vertices.len() / 3,
            })?
            .to_vec();

        // World placement is transform first, then translate
        let model = self.view_rotation
            * Matrix4::new_translation(&self.vec3(render::TRANSLATE))
            * self.mat4(render::TRANSFORM);
        let normals = normal_matrix(&model);

        for triangle in vertices.chunks_exact(3) {
            self.render_triangle(triangle, &model, &normals);
        }
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

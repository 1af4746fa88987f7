/// Terminal front end: loads the demo models and animates them as ASCII art
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use stlshade_core::{
    stl, BufferHandle, Mesh, MeshBatch, ProjectionMode, Renderer, RotationState, Scene,
    SceneObject,
};

pub mod config;
pub mod renderer;

pub use config::{DemoConfig, ModelConfig};
pub use renderer::AsciiRenderer;

/// Load every configured model into one batch and describe how to draw it.
///
/// Each model is centered and given face normals on its own before it is
/// appended, so its draw range can be placed independently.
pub fn build_scene(config: &DemoConfig) -> anyhow::Result<(MeshBatch, Scene)> {
    let mut batch = MeshBatch::new();
    let mut scene = Scene::new(config.light);

    for model in &config.models {
        let mesh = match &model.path {
            Some(path) => stl::load_stl(path)
                .with_context(|| format!("failed to load model '{}'", model.name))?,
            None => {
                log::info!("no file for '{}', using a cube", model.name);
                Mesh::cube(config::FALLBACK_CUBE_SIZE)
            }
        };

        let range = batch.push_prepared(mesh);
        log::info!(
            "'{}' occupies {} triangles from {}",
            model.name,
            range.count,
            range.start
        );

        scene.add(SceneObject {
            name: model.name.clone(),
            range,
            transform: model.transform,
            motion: model.motion,
            material: model.material,
        });
    }

    Ok((batch, scene))
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    buffer: BufferHandle,
    renderer: AsciiRenderer,
    rotation: RotationState,
    paused: bool,
    running: bool,
    frame_time: Duration,
    started: Instant,
    last_fps_update: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(batch: &MeshBatch, scene: Scene, config: &DemoConfig) -> anyhow::Result<Self> {
        let (width, height) = terminal::size().context("cannot query terminal size")?;

        let mut renderer = AsciiRenderer::new(width as usize, height as usize);
        renderer.camera_mut().mode = config.projection;
        let buffer = renderer.upload(&batch.packed_vertices())?;

        Ok(Self {
            scene,
            buffer,
            renderer,
            rotation: RotationState::default(),
            paused: false,
            running: true,
            frame_time: Duration::from_millis(1000 / config.frame_rate.max(1) as u64),
            started: Instant::now(),
            last_fps_update: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            if !self.paused {
                self.scene.update(self.started.elapsed().as_secs_f32());
            }

            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                std::thread::sleep(self.frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_fps_update).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_update).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_update = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> anyhow::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('w') | KeyCode::Up => self.rotation.rotate(0.1, 0.0, 0.0),
                KeyCode::Char('s') | KeyCode::Down => self.rotation.rotate(-0.1, 0.0, 0.0),
                KeyCode::Char('a') | KeyCode::Left => self.rotation.rotate(0.0, -0.1, 0.0),
                KeyCode::Char('d') | KeyCode::Right => self.rotation.rotate(0.0, 0.1, 0.0),
                KeyCode::Char('e') => self.rotation.rotate(0.0, 0.0, 0.1),
                KeyCode::Char('r') => self.rotation.rotate(0.0, 0.0, -0.1),
                KeyCode::Char(' ') => self.paused = !self.paused,
                KeyCode::Char('p') => {
                    let camera = self.renderer.camera_mut();
                    camera.mode = match camera.mode {
                        ProjectionMode::Perspective => ProjectionMode::Orthographic,
                        ProjectionMode::Orthographic => ProjectionMode::Perspective,
                    };
                }
                _ => {}
            },
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
                log::debug!("resized to {}x{}", width, height);
            }
            _ => {}
        }
        Ok(())
    }

    fn render(&mut self) -> anyhow::Result<()> {
        self.renderer.clear();
        self.renderer.set_view_rotation(self.rotation.matrix());
        self.scene.draw(&mut self.renderer, &self.buffer)?;

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.present(&mut stdout)?;

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "STLShade | FPS: {:.1} | WASD/Arrows=Rotate E/R=Roll Space=Pause P=Projection Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stlshade_core::StlError;

    #[test]
    fn test_build_scene_with_fallback_models() {
        let config = DemoConfig::default();
        let (batch, scene) = build_scene(&config).unwrap();

        assert_eq!(batch.len(), 24);
        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.objects[0].range.start, 0);
        assert_eq!(scene.objects[1].range.start, 12);
        assert_eq!(scene.objects[1].name, "second");
    }

    #[test]
    fn test_build_scene_reports_missing_file() {
        let config = DemoConfig::from_args(["/nonexistent/stlshade/model.stl"]).unwrap();
        let err = build_scene(&config).unwrap_err();
        assert!(err.to_string().contains("first"));
        assert!(matches!(
            err.downcast_ref::<StlError>(),
            Some(StlError::Open { .. })
        ));
    }

    #[test]
    fn test_fallback_scene_renders() {
        let config = DemoConfig::default();
        let (batch, scene) = build_scene(&config).unwrap();

        let mut renderer = AsciiRenderer::new(60, 30);
        let buffer = renderer.upload(&batch.packed_vertices()).unwrap();
        scene.draw(&mut renderer, &buffer).unwrap();

        let covered = (0..30)
            .flat_map(|y| (0..60).map(move |x| (x, y)))
            .filter(|&(x, y)| renderer.character_at(x, y) != Some(' '))
            .count();
        assert!(covered > 0);
    }
}

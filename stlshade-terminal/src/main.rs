/// STLShade Terminal Demo
///
/// Loads up to two STL files, centers them, computes face normals and
/// animates both from one shared vertex buffer. A missing file argument is
/// replaced by a cube.
///
/// Usage: stlshade-terminal [FIRST.stl [SECOND.stl]]
///
/// Controls:
///   - WASD / Arrow Keys: Rotate the view
///   - E/R: Roll rotation
///   - Space: Pause animation
///   - P: Toggle perspective/orthographic
///   - Q/ESC: Quit
use stlshade_terminal::{build_scene, DemoConfig, TerminalApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DemoConfig::from_args(std::env::args().skip(1))?;
    let (batch, scene) = build_scene(&config)?;
    log::info!(
        "{} triangles in {} objects, {} bytes of vertex data",
        batch.len(),
        scene.objects.len(),
        batch.len() * 3 * std::mem::size_of::<stlshade_core::PackedVertex>()
    );

    log::info!("Starting terminal renderer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(&batch, scene, &config)?;
    app.run()?;

    log::info!("Renderer closed");
    Ok(())
}

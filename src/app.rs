use std::path::PathBuf;
use std::thread;
use std::time;

use anyhow::{anyhow, bail, Context};
use show_image::{create_window, event, ImageInfo, ImageView, WindowOptions};

use tiny_rasterizer::mesh::{load_mesh, AttributeSource, MeshOptions};
use tiny_rasterizer::scene::{frame_uniforms, Camera, Color, ModelTransform, RenderConfig, RenderContext};

/// Fixed delay after each frame, roughly 60 frames per second.
const FRAME_DELAY: time::Duration = time::Duration::from_millis(1000 / 60);
/// Model rotation per frame, in degrees.
const ROTATION_STEP: f32 = 1.0;

/// Everything the binary can be told from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub width: u32,
    pub height: u32,
    pub print_fps: bool,
    pub asset_path: PathBuf,
    pub flat_shading: bool,   // Carry a flat color instead of lighting normals.
    pub flat_color: Color,
    pub scale: f32,           // Applied to mesh positions on load.
    pub output: Option<PathBuf>, // Render a single frame to this PNG instead of opening a window.
    pub show_depth: bool,
}

impl Default for Params {
    fn default() -> Self {
        return Self {
            width: 500,
            height: 500,
            print_fps: false,
            asset_path: PathBuf::from("assets/cube.obj"),
            flat_shading: false,
            flat_color: Color::WHITE,
            scale: 1.0,
            output: None,
            show_depth: false,
        };
    }
}

impl Params {
    /// Parses flags (program name already stripped):
    /// `-p <obj>`, `-s normal|color`, `-c RRGGBB`, `-k <scale>`, `-w <px>`, `-h <px>`,
    /// `-o <png>`, `--depth`, `--fps`.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Params> {
        let mut params = Params::default();
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let mut value = || args.next().ok_or_else(|| anyhow!("missing value after {}", flag));
            match flag.as_str() {
                "-p" => params.asset_path = PathBuf::from(value()?),
                "-s" => {
                    params.flat_shading = match value()?.as_str() {
                        "normal" => false,
                        "color" => true,
                        other => bail!("unknown shading mode '{}', expected 'normal' or 'color'", other),
                    }
                }
                "-c" => {
                    let hex = value()?;
                    params.flat_color = Color::from_hex(&hex).ok_or_else(|| anyhow!("invalid color '{}'", hex))?;
                }
                "-k" => params.scale = value()?.parse().context("invalid scale")?,
                "-w" => params.width = value()?.parse().context("invalid width")?,
                "-h" => params.height = value()?.parse().context("invalid height")?,
                "-o" => params.output = Some(PathBuf::from(value()?)),
                "--depth" => params.show_depth = true,
                "--fps" => params.print_fps = true,
                other => bail!("unknown argument '{}'", other),
            }
        }
        if params.width == 0 || params.height == 0 {
            bail!("frame size must be non-zero, got {}x{}", params.width, params.height);
        }
        return Ok(params);
    }

    fn mesh_options(&self) -> MeshOptions {
        let attribute = match self.flat_shading {
            true => AttributeSource::FlatColor(self.flat_color),
            false => AttributeSource::Normals,
        };
        return MeshOptions { scale: self.scale, attribute };
    }

    fn render_config(&self) -> RenderConfig {
        return RenderConfig {
            width: self.width,
            height: self.height,
            ..Default::default()
        };
    }
}

/// Helper, defining exit event to be an Escape key press or closing the window.
fn is_exit_event(window_event: event::WindowEvent) -> bool {
    match window_event {
        event::WindowEvent::KeyboardInput(event) => {
            return event.input.key_code == Some(event::VirtualKeyCode::Escape) && event.input.state.is_released();
        }
        event::WindowEvent::CloseRequested(_) => return true,
        _ => return false,
    }
}

/// Loads the mesh and either renders one frame to a PNG or runs the window loop
/// until the user quits.
pub fn run(params: Params) -> anyhow::Result<()> {
    let mesh = load_mesh(&params.asset_path, &params.mesh_options())
        .with_context(|| format!("loading mesh {}", params.asset_path.display()))?;
    log::info!(
        "{}: {} positions, {} normals, {} texture coords, {} faces -> {} triangles",
        params.asset_path.display(),
        mesh.position_count,
        mesh.normal_count,
        mesh.tex_coord_count,
        mesh.face_count,
        mesh.triangle_count(),
    );

    let mut context = RenderContext::new(params.render_config());
    let camera = Camera::default();
    let mut model = ModelTransform::default();

    if let Some(output) = &params.output {
        let uniforms = frame_uniforms(&camera, &model, params.width, params.height);
        let stats = context.render(&mesh.vertices, &uniforms)?;
        log::info!("{} of {} fragments visible", stats.committed, stats.fragments);
        context
            .frame_buffer()
            .to_image()
            .save(output)
            .with_context(|| format!("writing {}", output.display()))?;
        log::info!("frame written to {}", output.display());
        return Ok(());
    }

    let window_options = WindowOptions {
        size: Some([params.width, params.height]),
        ..Default::default()
    };
    let window = create_window("tiny_rasterizer", window_options)?;
    let event_channel = window.event_channel()?;

    let mut frame_counter_time_begin = time::Instant::now();
    let mut frame_counter: u32 = 0;
    loop {
        // Unloading all the events piled up since the last frame, looking for an exit event.
        if event_channel.try_iter().map(is_exit_event).fold(false, |exit, is_exit| exit || is_exit) {
            break;
        }

        let uniforms = frame_uniforms(&camera, &model, params.width, params.height);
        context.render(&mesh.vertices, &uniforms)?;

        let info = ImageInfo::rgba8(params.width, params.height);
        if params.show_depth {
            let depth_data = context.frame_buffer_mut().as_depth_data();
            window.set_image("frame", ImageView::new(info, depth_data))?;
        } else {
            window.set_image("frame", ImageView::new(info, context.frame_buffer().as_rgba()))?;
        }

        model.advance(ROTATION_STEP);
        thread::sleep(FRAME_DELAY);

        if params.print_fps {
            // Counting frames to printout stats every second.
            frame_counter += 1;
            if frame_counter_time_begin.elapsed().as_secs_f32() > 1.0 {
                log::info!("FPS --- {}", frame_counter);
                frame_counter_time_begin = time::Instant::now();
                frame_counter = 0;
            }
        }
    }

    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        return list.iter().map(|s| s.to_string()).collect();
    }

    #[test]
    fn defaults_without_flags() {
        assert_eq!(Params::from_args(args(&[])).unwrap(), Params::default());
    }

    #[test]
    fn parses_all_flags() {
        let params = Params::from_args(args(&[
            "-p", "ship.obj", "-s", "color", "-c", "#ff0000", "-k", "0.18", "-w", "320", "-h", "240", "-o",
            "out.png", "--depth", "--fps",
        ]))
        .unwrap();
        assert_eq!(params.asset_path, PathBuf::from("ship.obj"));
        assert!(params.flat_shading);
        assert_eq!(params.flat_color, Color::RED);
        assert_eq!(params.scale, 0.18);
        assert_eq!((params.width, params.height), (320, 240));
        assert_eq!(params.output, Some(PathBuf::from("out.png")));
        assert!(params.show_depth && params.print_fps);
        assert_eq!(params.mesh_options().attribute, AttributeSource::FlatColor(Color::RED));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Params::from_args(args(&["-p"])).is_err());
        assert!(Params::from_args(args(&["-s", "phong"])).is_err());
        assert!(Params::from_args(args(&["-w", "0"])).is_err());
        assert!(Params::from_args(args(&["--bogus"])).is_err());
    }

    #[test]
    fn renders_bundled_cube_headless() {
        let output = std::env::temp_dir().join("tiny_rasterizer_cube_test.png");
        let params = Params {
            asset_path: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/cube.obj")),
            width: 64,
            height: 64,
            output: Some(output.clone()),
            ..Default::default()
        };
        run(params).unwrap();
        let image = image::open(&output).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (64, 64));
        // The cube faces the camera, so the center pixel is lit.
        assert_ne!(image.get_pixel(32, 32).0[..3], [0, 0, 0]);
        let _ = std::fs::remove_file(output);
    }
}

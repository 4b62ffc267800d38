//! The per-frame render pipeline: transform, primitive assembly, rasterization,
//! fragment shading and depth-tested commit into a frame buffer.

pub mod assembly;
pub mod buffer;
pub mod error;
pub mod raster;
pub mod shader;
pub mod types;
pub mod uniform;
pub mod util;

pub use assembly::assemble_primitives;
pub use buffer::FrameBuffer;
pub use error::RasterError;
pub use raster::{FillRule, Rasterizer};
pub use shader::{fragment_shader, vertex_shader, Lighting};
pub use types::{Color, Fragment, ShadingAttribute, TransformedVertex, Triangle, Vertex};
pub use uniform::{frame_uniforms, viewport_matrix, Camera, ModelTransform, Uniforms};

/// Render target and pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub clear_color: Color,
    pub fill_rule: FillRule,
    pub lighting: Lighting,
}

impl Default for RenderConfig {
    fn default() -> Self {
        return Self {
            width: 500,
            height: 500,
            clear_color: Color::BLACK,
            fill_rule: FillRule::default(),
            lighting: Lighting::default(),
        };
    }
}

/// Counters collected while rendering one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub vertices: usize,
    pub triangles: usize,
    pub skipped_triangles: usize, // Dropped because a vertex had a degenerate clip-space w.
    pub fragments: usize,
    pub committed: usize, // Fragments that passed the depth test.
}

/// Owns the frame buffer and the scratch storage reused from frame to frame.
pub struct RenderContext {
    config: RenderConfig,
    rasterizer: Rasterizer,
    frame_buffer: FrameBuffer,
    // Scratch buffers, cleared every frame but never shrunk.
    transformed: Vec<Option<TransformedVertex>>,
    triangles: Vec<[Option<TransformedVertex>; 3]>,
    fragments: Vec<Fragment>,
}

impl RenderContext {
    pub fn new(config: RenderConfig) -> Self {
        let frame_buffer = FrameBuffer::new(config.width, config.height);
        let rasterizer = Rasterizer::new(config.fill_rule, config.lighting);
        // One triangle can't cover more than the whole screen.
        let fragments = Vec::with_capacity(config.width as usize * config.height as usize);
        return Self {
            config,
            rasterizer,
            frame_buffer,
            transformed: Vec::new(),
            triangles: Vec::new(),
            fragments,
        };
    }

    pub fn config(&self) -> &RenderConfig {
        return &self.config;
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        return &self.frame_buffer;
    }

    pub fn frame_buffer_mut(&mut self) -> &mut FrameBuffer {
        return &mut self.frame_buffer;
    }

    /// Resets color to the clear color and depth to infinity.
    pub fn clear(&mut self) {
        self.frame_buffer.clear(self.config.clear_color);
    }

    /// Renders one frame of `vertices` into the frame buffer.
    ///
    /// The buffer is always cleared first. A vertex count that isn't a multiple
    /// of three is rejected before anything is drawn. Triangles with a vertex
    /// on the camera plane are skipped and counted in the returned stats.
    pub fn render(&mut self, vertices: &[Vertex], uniforms: &Uniforms) -> Result<FrameStats, RasterError> {
        self.clear();
        let mut stats = FrameStats {
            vertices: vertices.len(),
            ..Default::default()
        };

        // 1. Vertex shader.
        self.transformed.clear();
        self.transformed.extend(vertices.iter().map(|vertex| match vertex_shader(vertex, uniforms) {
            Ok(transformed) => Some(transformed),
            Err(err) => {
                log::trace!("vertex {:?} not transformed: {}", vertex.position, err);
                None
            }
        }));

        // 2. Primitive assembly.
        self.triangles.clear();
        assemble_primitives(&self.transformed, &mut self.triangles)?;
        stats.triangles = self.triangles.len();

        // 3. Rasterization, 4. fragment shader, 5. depth test.
        let (width, height) = (self.frame_buffer.width(), self.frame_buffer.height());
        for triangle in &self.triangles {
            let triangle: Triangle = match triangle {
                [Some(a), Some(b), Some(c)] => [*a, *b, *c],
                _ => {
                    stats.skipped_triangles += 1;
                    continue;
                }
            };
            self.fragments.clear();
            stats.fragments += self.rasterizer.rasterize(&triangle, width, height, &mut self.fragments);
            for fragment in self.fragments.drain(..) {
                if self.frame_buffer.commit(&fragment_shader(fragment)) {
                    stats.committed += 1;
                }
            }
        }

        log::debug!("frame rendered: {:?}", stats);
        return Ok(stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn flat(x: f32, y: f32, z: f32, color: Color) -> Vertex {
        return Vertex::new(vector![x, y, z], ShadingAttribute::FlatColor(color));
    }

    #[test]
    fn scratch_buffers_are_reused_between_frames() {
        let mut context = RenderContext::new(RenderConfig { width: 8, height: 8, ..Default::default() });
        let vertices = [flat(0.0, 0.0, 1.0, Color::RED), flat(7.0, 0.0, 1.0, Color::RED), flat(0.0, 7.0, 1.0, Color::RED)];
        let first = context.render(&vertices, &Uniforms::identity()).unwrap();
        let capacity = context.fragments.capacity();
        let second = context.render(&vertices, &Uniforms::identity()).unwrap();
        assert_eq!(first, second);
        assert_eq!(context.fragments.capacity(), capacity);
        assert_eq!(first.committed, 36);
    }

    #[test]
    fn malformed_vertex_count_still_clears_frame() {
        let mut context = RenderContext::new(RenderConfig { width: 4, height: 4, ..Default::default() });
        let triangle = [flat(0.0, 0.0, 1.0, Color::RED), flat(3.0, 0.0, 1.0, Color::RED), flat(0.0, 3.0, 1.0, Color::RED)];
        context.render(&triangle, &Uniforms::identity()).unwrap();
        assert_eq!(context.frame_buffer().color_at(0, 0), Some(Color::RED));

        let result = context.render(&triangle[..2], &Uniforms::identity());
        assert_eq!(result, Err(RasterError::MalformedPrimitiveGroup { count: 2 }));
        assert_eq!(context.frame_buffer().color_at(0, 0), Some(Color::BLACK));
        assert_eq!(context.frame_buffer().depth_at(0, 0), Some(f32::INFINITY));
    }
}

use image::{Rgba, RgbaImage};

use super::error::RasterError;
use super::types::{Color, Fragment};

/// Color and depth storage for one frame. (0, 0) is the top left pixel.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    z_buffer: Vec<f32>,   // Nearest committed depth per pixel, infinity where nothing was drawn.
    render_data: Vec<u8>, // rgba8, row-major.
    depth_data: Vec<u8>,  // Normalized z-buffer for visualization, filled on demand.
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> FrameBuffer {
        let n_pixels = width as usize * height as usize;
        return FrameBuffer {
            width,
            height,
            z_buffer: vec![f32::INFINITY; n_pixels],
            render_data: vec![0; 4 * n_pixels],
            depth_data: vec![0; 4 * n_pixels],
        };
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    /// Fills every pixel with `color` and resets the z-buffer to infinity.
    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for pixel in self.render_data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&bytes);
        }
        self.z_buffer.fill(f32::INFINITY);
    }

    /// Flat index of a pixel, or `OutOfBoundsCoverage` if it is not in the buffer.
    pub fn pixel_index(&self, x: i64, y: i64) -> Result<usize, RasterError> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return Err(RasterError::OutOfBoundsCoverage {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        return Ok(x as usize + y as usize * self.width as usize);
    }

    /// Depth test and write. The fragment is committed only if it is strictly
    /// nearer than what the pixel already holds, so on equal depth the first
    /// writer wins. Fragments outside the buffer are dropped.
    pub fn commit(&mut self, fragment: &Fragment) -> bool {
        let index = match self.pixel_index(fragment.x as i64, fragment.y as i64) {
            Ok(index) => index,
            Err(err) => {
                log::trace!("dropping fragment: {}", err);
                return false;
            }
        };
        if !(fragment.z < self.z_buffer[index]) {
            return false;
        }
        self.z_buffer[index] = fragment.z;
        self.render_data[4 * index..4 * index + 4].copy_from_slice(&fragment.color.to_bytes());
        return true;
    }

    pub fn color_at(&self, x: u32, y: u32) -> Option<Color> {
        let index = self.pixel_index(x as i64, y as i64).ok()?;
        let pixel = &self.render_data[4 * index..4 * index + 4];
        return Some(Color { r: pixel[0], g: pixel[1], b: pixel[2], a: pixel[3] });
    }

    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        let index = self.pixel_index(x as i64, y as i64).ok()?;
        return Some(self.z_buffer[index]);
    }

    /// Rendered frame as a slice of rgba8 values, 4 * (number of pixels) long.
    pub fn as_rgba(&self) -> &[u8] {
        return &self.render_data[..];
    }

    /// Grayscale rgba8 picture of the z-buffer: nearest committed depth is white,
    /// farthest is black, untouched pixels are black too.
    /// Lazy in a sense, that the data is only computed when this is called.
    pub fn as_depth_data(&mut self) -> &[u8] {
        let covered = self.z_buffer.iter().copied().filter(|z| z.is_finite());
        let (z_min, z_max) = covered.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), z| (lo.min(z), hi.max(z)));
        let scale = z_max - z_min;
        for (i, &z) in self.z_buffer.iter().enumerate() {
            let value = if !z.is_finite() {
                0
            } else if scale > 0.0 {
                (255.0 * (z_max - z) / scale).round() as u8
            } else {
                255
            };
            self.depth_data[4 * i..4 * i + 4].copy_from_slice(&[value, value, value, 255]);
        }
        return &self.depth_data[..];
    }

    /// Copy of the rendered frame, ready to be encoded by the `image` crate.
    pub fn to_image(&self) -> RgbaImage {
        return RgbaImage::from_fn(self.width, self.height, |x, y| {
            let index = x as usize + y as usize * self.width as usize;
            let pixel = &self.render_data[4 * index..4 * index + 4];
            Rgba([pixel[0], pixel[1], pixel[2], pixel[3]])
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(x: u32, y: u32, z: f32, color: Color) -> Fragment {
        return Fragment { x, y, z, color, intensity: 1.0 };
    }

    #[test]
    fn new_buffer_is_far_and_black() {
        let buffer = FrameBuffer::new(3, 2);
        assert_eq!(buffer.as_rgba().len(), 24);
        assert_eq!(buffer.depth_at(2, 1), Some(f32::INFINITY));
        assert_eq!(buffer.depth_at(3, 1), None);
    }

    #[test]
    fn nearer_fragment_wins() {
        let mut buffer = FrameBuffer::new(4, 4);
        assert!(buffer.commit(&fragment(1, 1, 5.0, Color::BLUE)));
        assert!(buffer.commit(&fragment(1, 1, 2.0, Color::RED)));
        assert!(!buffer.commit(&fragment(1, 1, 3.0, Color::GREEN)));
        assert_eq!(buffer.color_at(1, 1), Some(Color::RED));
        assert_eq!(buffer.depth_at(1, 1), Some(2.0));
    }

    #[test]
    fn equal_depth_keeps_first_writer() {
        let mut buffer = FrameBuffer::new(4, 4);
        assert!(buffer.commit(&fragment(0, 3, 1.0, Color::RED)));
        assert!(!buffer.commit(&fragment(0, 3, 1.0, Color::GREEN)));
        assert_eq!(buffer.color_at(0, 3), Some(Color::RED));
    }

    #[test]
    fn out_of_bounds_fragment_is_dropped() {
        let mut buffer = FrameBuffer::new(4, 4);
        assert!(!buffer.commit(&fragment(4, 0, 0.0, Color::RED)));
        assert!(buffer.as_rgba().iter().all(|&byte| byte == 0));
        assert!(matches!(
            buffer.pixel_index(-1, 2),
            Err(RasterError::OutOfBoundsCoverage { x: -1, y: 2, .. })
        ));
    }

    #[test]
    fn clear_resets_depth_and_color() {
        let mut buffer = FrameBuffer::new(2, 2);
        buffer.commit(&fragment(0, 0, 1.0, Color::RED));
        buffer.clear(Color::rgb(10, 20, 30));
        assert_eq!(buffer.depth_at(0, 0), Some(f32::INFINITY));
        assert_eq!(buffer.color_at(1, 1), Some(Color::rgb(10, 20, 30)));
    }

    #[test]
    fn depth_visualization_maps_near_to_white() {
        let mut buffer = FrameBuffer::new(3, 1);
        buffer.commit(&fragment(0, 0, 1.0, Color::RED));
        buffer.commit(&fragment(1, 0, 3.0, Color::RED));
        let depth = buffer.as_depth_data();
        assert_eq!(&depth[0..4], &[255, 255, 255, 255]);
        assert_eq!(&depth[4..8], &[0, 0, 0, 255]);
        assert_eq!(&depth[8..12], &[0, 0, 0, 255]);
    }

    #[test]
    fn image_copy_matches_buffer() {
        let mut buffer = FrameBuffer::new(2, 3);
        buffer.commit(&fragment(1, 2, 0.5, Color::GREEN));
        let image = buffer.to_image();
        assert_eq!(image.dimensions(), (2, 3));
        assert_eq!(image.get_pixel(1, 2), &Rgba([0, 255, 0, 255]));
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }
}

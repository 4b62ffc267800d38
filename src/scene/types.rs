use nalgebra as na;
use na::{vector, Vector3};

use super::error::RasterError;

/// Raw rgba8 color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    /// Opaque color from three channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        return Color { r, g, b, a: 255 };
    }

    /// Color channels as floats in [0.0, 255.0], alpha excluded.
    pub fn to_vector(self) -> Vector3<f32> {
        return vector![self.r as f32, self.g as f32, self.b as f32];
    }

    /// Back from float channels, rounding and clamping each one to the byte range.
    /// NaN channels end up as 0.
    pub fn from_vector(v: Vector3<f32>, a: u8) -> Color {
        fn to_channel(value: f32) -> u8 {
            // `as` saturates and maps NaN to 0.
            return value.round().clamp(0.0, 255.0) as u8;
        }
        return Color {
            r: to_channel(v.x),
            g: to_channel(v.y),
            b: to_channel(v.z),
            a,
        };
    }

    /// Parses `RRGGBB` or `#RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Color> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
    }

    pub fn to_bytes(self) -> [u8; 4] {
        return [self.r, self.g, self.b, self.a];
    }
}

/// Per-vertex input to shading. A vertex buffer built for one pipeline
/// configuration carries only one of the two variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShadingAttribute {
    /// Surface normal, lit against the light direction.
    Normal(Vector3<f32>),
    /// Color carried through to the fragment unchanged.
    FlatColor(Color),
}

/// Vertex in object space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vector3<f32>,
    pub attribute: ShadingAttribute,
}

impl Vertex {
    pub fn new(position: Vector3<f32>, attribute: ShadingAttribute) -> Self {
        return Self { position, attribute };
    }

    /// Builds vertices from an interleaved `[position, normal, position, normal, ...]`
    /// stream, two entries per vertex.
    pub fn from_interleaved_normals(stream: &[Vector3<f32>]) -> Result<Vec<Vertex>, RasterError> {
        if stream.len() % 2 != 0 {
            return Err(RasterError::UnpairedAttribute { len: stream.len() });
        }
        let vertices = stream
            .chunks_exact(2)
            .map(|pair| Vertex::new(pair[0], ShadingAttribute::Normal(pair[1])))
            .collect();
        return Ok(vertices);
    }

    /// Same as `from_interleaved_normals`, but the second entry of each pair is a
    /// color with channels in [0.0, 1.0].
    pub fn from_interleaved_colors(stream: &[Vector3<f32>]) -> Result<Vec<Vertex>, RasterError> {
        if stream.len() % 2 != 0 {
            return Err(RasterError::UnpairedAttribute { len: stream.len() });
        }
        let vertices = stream
            .chunks_exact(2)
            .map(|pair| {
                let color = Color::from_vector(pair[1] * 255.0, 255);
                Vertex::new(pair[0], ShadingAttribute::FlatColor(color))
            })
            .collect();
        return Ok(vertices);
    }
}

/// Vertex after the transform stage. `position.x` and `position.y` are pixel
/// coordinates, `position.z` is depth (smaller is nearer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformedVertex {
    pub position: Vector3<f32>,
    pub attribute: ShadingAttribute,
}

/// Three screen-space vertices. Each triangle owns copies, nothing is indexed.
pub type Triangle = [TransformedVertex; 3];

/// Candidate pixel write produced by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: u32,
    pub y: u32,
    pub z: f32,
    pub color: Color,
    pub intensity: f32, // Scalar applied to the color by the fragment shader.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vector_clamps_and_rounds() {
        let color = Color::from_vector(vector![300.0, -4.0, 127.6], 10);
        assert_eq!(color, Color { r: 255, g: 0, b: 128, a: 10 });
        let color = Color::from_vector(vector![f32::NAN, 1.0, 2.0], 255);
        assert_eq!(color.r, 0);
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::from_hex("00FF00"), Some(Color::GREEN));
        assert_eq!(Color::from_hex("fff"), None);
        assert_eq!(Color::from_hex("zzzzzz"), None);
    }

    #[test]
    fn interleaved_stream_pairs_up() {
        let stream = [
            vector![0.0, 0.0, 0.0],
            vector![0.0, 0.0, 1.0],
            vector![1.0, 0.0, 0.0],
            vector![0.0, 1.0, 0.0],
        ];
        let vertices = Vertex::from_interleaved_normals(&stream).unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1].position, vector![1.0, 0.0, 0.0]);
        assert_eq!(vertices[1].attribute, ShadingAttribute::Normal(vector![0.0, 1.0, 0.0]));

        let colored = Vertex::from_interleaved_colors(&stream[..2]).unwrap();
        assert_eq!(colored[0].attribute, ShadingAttribute::FlatColor(Color::BLUE));
    }

    #[test]
    fn odd_interleaved_stream_is_rejected() {
        let stream = [vector![0.0, 0.0, 0.0]; 3];
        assert!(matches!(
            Vertex::from_interleaved_normals(&stream),
            Err(RasterError::UnpairedAttribute { len: 3 })
        ));
    }
}

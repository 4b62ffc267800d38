use nalgebra as na;
use na::{vector, Vector3};

use super::error::RasterError;
use super::types::{Color, Fragment, ShadingAttribute, TransformedVertex, Vertex};
use super::uniform::Uniforms;
use super::util::{from_hom_point, normalize_or_zero, to_hom_point};

/// Transform stage: object space -> clip space -> NDC -> screen space.
///
/// Normals are rotated by the model matrix and renormalized, colors pass through.
/// A vertex sitting on the camera plane can't be divided by its w and is reported
/// as `DegenerateTransform`, so the caller can drop its triangle.
pub fn vertex_shader(vertex: &Vertex, uniforms: &Uniforms) -> Result<TransformedVertex, RasterError> {
    let clip_position = uniforms.pvm_matrix() * to_hom_point(vertex.position);
    let ndc_position = from_hom_point(clip_position)?;
    let screen_position = uniforms.viewport * to_hom_point(ndc_position);

    let attribute = match vertex.attribute {
        ShadingAttribute::Normal(normal) => {
            ShadingAttribute::Normal(normalize_or_zero(uniforms.normal_matrix() * normal))
        }
        flat @ ShadingAttribute::FlatColor(_) => flat,
    };

    return Ok(TransformedVertex {
        position: screen_position.xyz(),
        attribute,
    });
}

/// Fixed lighting setup used to turn interpolated attributes into color and intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub light_direction: Vector3<f32>, // Direction pointing towards the light.
    pub base_color: Color,             // Surface color for normal-shaded geometry.
}

impl Default for Lighting {
    fn default() -> Self {
        // Light comes from the default camera position.
        return Self {
            light_direction: vector![0.0, 0.0, -1.0],
            base_color: Color::WHITE,
        };
    }
}

impl Lighting {
    /// Interpolates the three vertex attributes with barycentric weights and
    /// returns the fragment's base color and intensity.
    ///
    /// Normals give `base_color` with a diffuse intensity clamped to [0, 1].
    /// Colors are blended channel-wise and keep full intensity. A triangle mixing
    /// both kinds is shaded as if every vertex were a normal of zero length.
    pub fn resolve(&self, attributes: [ShadingAttribute; 3], bar_coord: Vector3<f32>) -> (Color, f32) {
        match attributes {
            [ShadingAttribute::FlatColor(a), ShadingAttribute::FlatColor(b), ShadingAttribute::FlatColor(c)] => {
                let rgb = a.to_vector() * bar_coord.x + b.to_vector() * bar_coord.y + c.to_vector() * bar_coord.z;
                let alpha = a.a as f32 * bar_coord.x + b.a as f32 * bar_coord.y + c.a as f32 * bar_coord.z;
                let alpha = alpha.round().clamp(0.0, 255.0) as u8;
                return (Color::from_vector(rgb, alpha), 1.0);
            }
            _ => {
                let normal_at = |attribute: ShadingAttribute| match attribute {
                    ShadingAttribute::Normal(normal) => normal,
                    ShadingAttribute::FlatColor(_) => Vector3::zeros(),
                };
                let normal = normal_at(attributes[0]) * bar_coord.x
                    + normal_at(attributes[1]) * bar_coord.y
                    + normal_at(attributes[2]) * bar_coord.z;
                let light = normalize_or_zero(self.light_direction);
                let diff_coef = normalize_or_zero(normal).dot(&light).clamp(0.0, 1.0);
                return (self.base_color, diff_coef);
            }
        }
    }
}

/// Modulates the fragment color by its intensity. Alpha is left as is.
pub fn fragment_shader(mut fragment: Fragment) -> Fragment {
    let intensity = if fragment.intensity.is_nan() { 0.0 } else { fragment.intensity.max(0.0) };
    fragment.color = Color::from_vector(fragment.color.to_vector() * intensity, fragment.color.a);
    return fragment;
}

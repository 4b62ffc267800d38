use nalgebra as na;
use na::{vector, Vector2, Vector3};

use super::shader::Lighting;
use super::types::{Fragment, Triangle};

/// How pixels lying exactly on a triangle edge are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Every pixel with all barycentric coordinates in [0, 1] is covered,
    /// edges and vertices included. Adjacent triangles both shade their shared edge.
    #[default]
    Inclusive,
    /// Edge pixels are covered only on top and left edges, so a pixel on an
    /// edge shared by two triangles is shaded exactly once.
    TopLeft,
}

/// Pixel box a triangle can touch, already clipped to the frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoundingBox {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl BoundingBox {
    /// Samples sit on integer coordinates, so only pixels in [ceil(min), floor(max)]
    /// can be inside. Returns None if nothing of the triangle is on screen.
    fn clipped(points: [Vector3<f32>; 3], width: u32, height: u32) -> Option<BoundingBox> {
        if width == 0 || height == 0 {
            return None;
        }
        if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return None;
        }
        let min_x = points[0].x.min(points[1].x).min(points[2].x).ceil().max(0.0);
        let min_y = points[0].y.min(points[1].y).min(points[2].y).ceil().max(0.0);
        let max_x = points[0].x.max(points[1].x).max(points[2].x).floor().min((width - 1) as f32);
        let max_y = points[0].y.max(points[1].y).max(points[2].y).floor().min((height - 1) as f32);
        if min_x > max_x || min_y > max_y {
            return None;
        }
        return Some(BoundingBox {
            min_x: min_x as u32,
            min_y: min_y as u32,
            max_x: max_x as u32,
            max_y: max_y as u32,
        });
    }
}

/// Doubled signed area of (a, b, p). Positive when p lies on the inner side of
/// edge a -> b for a triangle with positive area.
fn edge_function(a: Vector2<f32>, b: Vector2<f32>, p: Vector2<f32>) -> f32 {
    return (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
}

/// Barycentric coordinates of `p` relative to (a, b, c). They always sum to 1;
/// `None` for a degenerate triangle.
pub fn to_barycentric_coord(
    p: Vector2<f32>,
    a: Vector2<f32>,
    b: Vector2<f32>,
    c: Vector2<f32>,
) -> Option<Vector3<f32>> {
    let area = edge_function(a, b, c);
    if !area.is_finite() || area.abs() < f32::EPSILON {
        return None;
    }
    return Some(barycentric_weights(p, a, b, c, area));
}

/// Weights of `p` for a triangle whose doubled signed area is already known.
/// `area` must be finite and non-zero.
fn barycentric_weights(p: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>, area: f32) -> Vector3<f32> {
    return vector![edge_function(b, c, p), edge_function(c, a, p), edge_function(a, b, p)] / area;
}

/// Top-left test for edge `from -> to` in a y-down raster. The edge is first
/// oriented as if the triangle had positive area.
fn is_top_left(from: Vector2<f32>, to: Vector2<f32>, area: f32) -> bool {
    let d = (to - from) * area.signum();
    let is_top = d.y == 0.0 && d.x > 0.0;
    let is_left = d.y < 0.0;
    return is_top || is_left;
}

/// Converts screen-space triangles into fragments.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rasterizer {
    pub fill_rule: FillRule,
    pub lighting: Lighting,
}

impl Rasterizer {
    pub fn new(fill_rule: FillRule, lighting: Lighting) -> Self {
        return Self { fill_rule, lighting };
    }

    /// Appends one fragment per covered pixel of `triangle` to `fragments`, in
    /// row-major order. Returns the number of fragments emitted.
    ///
    /// No culling or clipping against near/far planes is done. Anything outside
    /// [0, width) x [0, height) is simply never visited.
    pub fn rasterize(&self, triangle: &Triangle, width: u32, height: u32, fragments: &mut Vec<Fragment>) -> usize {
        let positions = [triangle[0].position, triangle[1].position, triangle[2].position];
        let bbox = match BoundingBox::clipped(positions, width, height) {
            Some(bbox) => bbox,
            None => return 0,
        };

        let a = positions[0].xy();
        let b = positions[1].xy();
        let c = positions[2].xy();
        let area = edge_function(a, b, c);
        if !area.is_finite() || area.abs() < f32::EPSILON {
            // Degenerate triangle, nothing to cover.
            return 0;
        }

        // Edge i is the one opposite vertex i.
        let top_left = [is_top_left(b, c, area), is_top_left(c, a, area), is_top_left(a, b, area)];
        let z_values = vector![positions[0].z, positions[1].z, positions[2].z];
        let attributes = [triangle[0].attribute, triangle[1].attribute, triangle[2].attribute];

        let emitted_before = fragments.len();
        for y in bbox.min_y..=bbox.max_y {
            for x in bbox.min_x..=bbox.max_x {
                let p = vector![x as f32, y as f32];
                let bar_coord = barycentric_weights(p, a, b, c, area);
                if !self.covers(bar_coord, top_left) {
                    continue;
                }
                let (color, intensity) = self.lighting.resolve(attributes, bar_coord);
                fragments.push(Fragment {
                    x,
                    y,
                    z: bar_coord.dot(&z_values),
                    color,
                    intensity,
                });
            }
        }
        return fragments.len() - emitted_before;
    }

    fn covers(&self, bar_coord: Vector3<f32>, top_left: [bool; 3]) -> bool {
        match self.fill_rule {
            FillRule::Inclusive => {
                return bar_coord.iter().all(|&weight| weight >= 0.0);
            }
            FillRule::TopLeft => {
                return bar_coord
                    .iter()
                    .zip(top_left)
                    .all(|(&weight, on_top_left)| weight > 0.0 || (weight == 0.0 && on_top_left));
            }
        }
    }
}

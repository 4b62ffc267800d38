use nalgebra as na;
use na::{vector, Vector3, Vector4};

use super::error::RasterError;

/// Clip-space w values closer to zero than this are treated as lying on the camera plane.
pub const MIN_CLIP_W: f32 = 1e-6;

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Perspective division. Fails instead of producing NaN or infinite coordinates.
pub fn from_hom_point(v: Vector4<f32>) -> Result<Vector3<f32>, RasterError> {
    if !v.w.is_finite() || v.w.abs() < MIN_CLIP_W {
        return Err(RasterError::DegenerateTransform { w: v.w });
    }
    let point = vector![v.x / v.w, v.y / v.w, v.z / v.w];
    if !(point.x.is_finite() && point.y.is_finite() && point.z.is_finite()) {
        return Err(RasterError::DegenerateTransform { w: v.w });
    }
    return Ok(point);
}

/// Normalizes `v`, leaving zero-length vectors untouched.
pub fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    return v.try_normalize(f32::EPSILON).unwrap_or(v);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_by_w() {
        let p = from_hom_point(vector![2.0, 4.0, 6.0, 2.0]).unwrap();
        assert_eq!(p, vector![1.0, 2.0, 3.0]);
    }

    #[test]
    fn zero_w_is_degenerate() {
        assert!(from_hom_point(vector![1.0, 1.0, 1.0, 0.0]).is_err());
        assert!(from_hom_point(vector![1.0, 1.0, 1.0, -1e-9]).is_err());
        assert!(from_hom_point(vector![1.0, 1.0, 1.0, f32::NAN]).is_err());
    }

    #[test]
    fn zero_vector_stays_zero() {
        assert_eq!(normalize_or_zero(Vector3::zeros()), Vector3::zeros());
        assert_eq!(normalize_or_zero(vector![0.0, 3.0, 0.0]), vector![0.0, 1.0, 0.0]);
    }
}

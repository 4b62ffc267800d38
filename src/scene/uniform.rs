use nalgebra as na;
use na::{matrix, point, vector, Matrix3, Matrix4, Rotation3, Unit, Vector3};

/// Per-frame transform constants, shared read-only by every vertex of the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniforms {
    pub model: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub viewport: Matrix4<f32>,
    pvm_matrix: Matrix4<f32>,    // Object space to clip space.
    normal_matrix: Matrix3<f32>, // Rotational part of the model matrix, applied to normals.
}

impl Uniforms {
    pub fn new(
        model: Matrix4<f32>,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        viewport: Matrix4<f32>,
    ) -> Self {
        let pvm_matrix = projection * view * model;
        let normal_matrix = Matrix3::from_fn(|row, column| model[(row, column)]);
        return Self {
            model,
            view,
            projection,
            viewport,
            pvm_matrix,
            normal_matrix,
        };
    }

    /// All four matrices set to identity. Vertices then pass through untouched,
    /// which makes this handy for feeding screen-space geometry directly.
    pub fn identity() -> Self {
        let identity = Matrix4::identity();
        return Self::new(identity, identity, identity, identity);
    }

    pub fn pvm_matrix(&self) -> &Matrix4<f32> {
        return &self.pvm_matrix;
    }

    pub fn normal_matrix(&self) -> &Matrix3<f32> {
        return &self.normal_matrix;
    }
}

/// Maps normalized device coordinates to pixel coordinates of a `width` x `height`
/// target. Equivalent to scale(w/2, h/2, 1/2) followed by translate(1, 1, 1/2),
/// so NDC depth in [-1, 1] lands in [-0.25, 0.75].
pub fn viewport_matrix(width: u32, height: u32) -> Matrix4<f32> {
    let w = width as f32 / 2.0;
    let h = height as f32 / 2.0;
    return matrix![w,   0.0, 0.0, w;
                   0.0, h,   0.0, h;
                   0.0, 0.0, 0.5, 0.25;
                   0.0, 0.0, 0.0, 1.0];
}

/// Pinhole camera producing the view and projection matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub look_from: Vector3<f32>,
    pub look_at: Vector3<f32>,
    pub up: Vector3<f32>,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    /// Camera five units behind the origin looking forward. The up vector points
    /// down -y so that +y ends up at the top of a y-down frame buffer.
    fn default() -> Self {
        return Self {
            look_from: vector![0.0, 0.0, -5.0],
            look_at: vector![0.0, 0.0, 0.0],
            up: vector![0.0, -1.0, 0.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        };
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = point![self.look_from.x, self.look_from.y, self.look_from.z];
        let target = point![self.look_at.x, self.look_at.y, self.look_at.z];
        return Matrix4::look_at_rh(&eye, &target, &self.up);
    }

    pub fn projection_matrix(&self, width: u32, height: u32) -> Matrix4<f32> {
        let aspect = width as f32 / height.max(1) as f32;
        return Matrix4::new_perspective(aspect, self.fov_degrees.to_radians(), self.near, self.far);
    }
}

/// Placement of the model in the world: translation * scale * rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTransform {
    pub translation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub rotation_axis: Vector3<f32>,
    pub rotation_degrees: f32,
}

impl Default for ModelTransform {
    fn default() -> Self {
        return Self {
            translation: Vector3::zeros(),
            scale: vector![1.0, 1.0, 1.0],
            rotation_axis: vector![1.0, 1.0, 0.0],
            rotation_degrees: 0.0,
        };
    }
}

impl ModelTransform {
    pub fn matrix(&self) -> Matrix4<f32> {
        let translation = Matrix4::new_translation(&self.translation);
        let scale = Matrix4::new_nonuniform_scaling(&self.scale);
        // Zero axis means no rotation.
        let rotation = match Unit::try_new(self.rotation_axis, f32::EPSILON) {
            Some(axis) => Rotation3::from_axis_angle(&axis, self.rotation_degrees.to_radians()).to_homogeneous(),
            None => Matrix4::identity(),
        };
        return translation * scale * rotation;
    }

    /// Spins the model by `degrees` around its rotation axis.
    pub fn advance(&mut self, degrees: f32) {
        self.rotation_degrees = (self.rotation_degrees + degrees) % 360.0;
    }
}

/// Builds the full uniform block for one frame.
pub fn frame_uniforms(camera: &Camera, model: &ModelTransform, width: u32, height: u32) -> Uniforms {
    return Uniforms::new(
        model.matrix(),
        camera.view_matrix(),
        camera.projection_matrix(width, height),
        viewport_matrix(width, height),
    );
}

use nalgebra::{Matrix4, Point3, Vector3};

pub struct Camera {
    pub pos: Point3<f64>,
    look_at: Point3<f64>,
    up: Vector3<f64>,
    fov_radians: f64,
    aspect_ratio: f64,
    near_plane: f64,
    far_plane: f64,
    pub perspective_matrix: Matrix4<f64>,
    pub view_matrix: Matrix4<f64>,
    pub camera_matrix: Matrix4<f64>,
}

impl Camera {
    pub fn new(
        pos: Point3<f64>,
        look_at: Point3<f64>,
        up: Vector3<f64>,
        fov_radians: f64,
        aspect_ratio: f64,
        near_plane: f64,
        far_plane: f64,
    ) -> Self {
        let mut camera = Camera {
            pos,
            look_at,
            up,
            fov_radians,
            aspect_ratio,
            near_plane,
            far_plane,
            perspective_matrix: Matrix4::identity(),
            view_matrix: Matrix4::identity(),
            camera_matrix: Matrix4::identity(),
        };
        camera.update_matrices();
        camera
    }

    /// Обновляет соотношение сторон при изменении размеров окна просмотра.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f64) {
        if (self.aspect_ratio - aspect_ratio).abs() > f64::EPSILON {
            self.aspect_ratio = aspect_ratio;
            self.update_matrices();
        }
    }

    fn update_matrices(&mut self) {
        self.perspective_matrix = Matrix4::new_perspective(
            self.aspect_ratio,
            self.fov_radians,
            self.near_plane,
            self.far_plane,
        );
        self.view_matrix = Matrix4::look_at_rh(&self.pos, &self.look_at, &self.up);
        self.camera_matrix = self.perspective_matrix * self.view_matrix;
    }
}

use crate::config::BACKGROUND_COLOR;
use crate::objects::camera::Camera;
use crate::objects::light::LightSource;
use crate::objects::model3d::Model3D;
use crate::render::{Renderer, calculate_color};
use image::{Rgb, RgbImage};
use nalgebra::{Matrix4, Point3};

#[derive(Default)]
pub struct ZBufferPerformer {
    width: u32,
    height: u32,
    z_buffer: Vec<f64>,
    flat_shading: bool,
}

impl ZBufferPerformer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            z_buffer: vec![f64::INFINITY; (width * height) as usize],
            flat_shading: false,
        }
    }

    fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.z_buffer
            .resize((width * height) as usize, f64::INFINITY);
        self.z_buffer.fill(f64::INFINITY);
    }

    fn set_depth(&mut self, x: u32, y: u32, depth: f64) {
        let index = (y * self.width + x) as usize;
        self.z_buffer[index] = depth;
    }

    fn get_depth(&self, x: u32, y: u32) -> f64 {
        let index = (y * self.width + x) as usize;
        self.z_buffer[index]
    }

    /// Матрица преобразования из NDC в пространство экрана.
    pub(crate) fn calculate_viewport_matrix(width: u32, height: u32) -> Matrix4<f64> {
        Matrix4::new(
            width as f64 / 2.,
            0.,
            0.,
            width as f64 / 2.,
            0.,
            -(height as f64 / 2.),
            0.,
            height as f64 / 2.,
            0.,
            0.,
            1.,
            0.,
            0.,
            0.,
            0.,
            1.,
        )
    }

    /// Перевод вершин модели в пространство экрана:
    /// модель -> вид -> проекция -> вьюпорт.
    fn transform_vertices_to_screen(
        vertices: &[Point3<f64>],
        mvpv_matrix: &Matrix4<f64>,
    ) -> Vec<Point3<f64>> {
        vertices
            .iter()
            .map(|v| {
                Point3::from_homogeneous(mvpv_matrix * v.to_homogeneous())
                    .expect("Perspective division failed.")
            })
            .collect()
    }

    fn draw_triangle(
        &mut self,
        image: &mut RgbImage,
        tri: &[Point3<f64>; 3],
        tri_colors: &[Rgb<u8>; 3],
    ) {
        let [p1, p2, p3] = *tri;

        // Ограничивающий прямоугольник, зажатый в размеры изображения
        let min_x = (p1.x.min(p2.x).min(p3.x).round() as u32).max(0);
        let max_x = (p1.x.max(p2.x).max(p3.x).round() as u32).min(self.width - 1);
        let min_y = (p1.y.min(p2.y).min(p3.y).round() as u32).max(0);
        let max_y = (p1.y.max(p2.y).max(p3.y).round() as u32).min(self.height - 1);

        let denom = (p2.x - p1.x) * (p3.y - p1.y) - (p2.y - p1.y) * (p3.x - p1.x);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                // Барицентрические координаты пикселя
                let u =
                    ((p3.x - p2.x) * (y as f64 - p2.y) - (p3.y - p2.y) * (x as f64 - p2.x)) / denom;
                let v =
                    ((p1.x - p3.x) * (y as f64 - p3.y) - (p1.y - p3.y) * (x as f64 - p3.x)) / denom;
                let bary = Point3::new(u, v, 1.0 - u - v);

                if bary.x > -f64::EPSILON && bary.y > -f64::EPSILON && bary.z > -f64::EPSILON {
                    let z = p1.z * bary.x + p2.z * bary.y + p3.z * bary.z;

                    if z < self.get_depth(x, y) {
                        self.set_depth(x, y, z);

                        let channel = |c: usize| {
                            (bary.x * tri_colors[0].0[c] as f64
                                + bary.y * tri_colors[1].0[c] as f64
                                + bary.z * tri_colors[2].0[c] as f64)
                                .clamp(0.0, 255.0) as u8
                        };
                        image.put_pixel(x, y, Rgb([channel(0), channel(1), channel(2)]));
                    }
                }
            }
        }
    }

    fn draw_object(
        &mut self,
        image: &mut RgbImage,
        model: &dyn Model3D,
        camera: &Camera,
        light_source: &LightSource,
    ) {
        let (width, height) = image.dimensions();
        let mvp_matrix = camera.camera_matrix * model.model_matrix();
        let viewport_matrix = Self::calculate_viewport_matrix(width, height);
        let mvpv_matrix = viewport_matrix * mvp_matrix;

        let screen_vertices: Vec<Point3<f64>> =
            Self::transform_vertices_to_screen(model.vertices(), &mvpv_matrix);

        for (i, tri) in model.triangles().iter().enumerate() {
            // Гуро: цвет в вершинах по вершинным нормалям; в плоском режиме
            // все три вершины освещаются нормалью грани
            let tri_colors = [tri.0, tri.1, tri.2].map(|v_idx| {
                let normal = if self.flat_shading {
                    model.face_normals()[i].xyz()
                } else {
                    model.vertex_normals()[v_idx].xyz()
                };
                calculate_color(
                    model.material(),
                    &normal,
                    &model.vertices_world()[v_idx],
                    light_source,
                    &camera.pos,
                )
            });

            self.draw_triangle(
                image,
                &[
                    screen_vertices[tri.0],
                    screen_vertices[tri.1],
                    screen_vertices[tri.2],
                ],
                &tri_colors,
            );
        }
    }
}

impl Renderer for ZBufferPerformer {
    fn render_single_object(
        &mut self,
        image: &mut RgbImage,
        object: &dyn Model3D,
        camera: &Camera,
        light: &LightSource,
    ) {
        let (width, height) = image.dimensions();
        self.reset(width, height);
        image.pixels_mut().for_each(|px| *px = BACKGROUND_COLOR);
        self.draw_object(image, object, camera, light);
    }

    fn set_flat_shading(&mut self, flat: bool) {
        self.flat_shading = flat;
    }
}

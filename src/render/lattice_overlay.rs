use crate::config::LATTICE_COLOR;
use crate::objects::camera::Camera;
use crate::objects::deform_box::DeformBox;
use crate::objects::model3d::Model3D;
use crate::render::z_buffer::ZBufferPerformer;
use image::RgbImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use itertools::iproduct;
use nalgebra::Point3;

/// Рисует контрольную решётку поверх готового кадра: узлы квадратами,
/// рёбра между соседними узлами вдоль каждой из трёх осей отрезками.
pub struct LatticeOverlay;

impl LatticeOverlay {
    pub fn draw(image: &mut RgbImage, camera: &Camera, deform: &DeformBox) {
        let (width, height) = image.dimensions();
        let viewport_matrix = ZBufferPerformer::calculate_viewport_matrix(width, height);
        // Решётка живёт в локальных координатах сетки, поэтому проходит ту
        // же цепочку преобразований, что и сам объект
        let mvpv_matrix = viewport_matrix * camera.camera_matrix * deform.model_matrix();

        let degree = deform.degree();
        let nodes = degree + 1;
        let screen: Vec<Point3<f64>> = deform
            .control_points()
            .iter()
            .map(|pt| {
                Point3::from_homogeneous(mvpv_matrix * pt.to_homogeneous())
                    .expect("Perspective division failed.")
            })
            .collect();

        let index = |i: usize, j: usize, k: usize| (i * nodes + j) * nodes + k;

        let mut draw_edge = |a: usize, b: usize| {
            draw_line_segment_mut(
                image,
                (screen[a].x as f32, screen[a].y as f32),
                (screen[b].x as f32, screen[b].y as f32),
                LATTICE_COLOR,
            );
        };

        for (i, j, k) in iproduct!(0..nodes, 0..nodes, 0..nodes) {
            if i + 1 < nodes {
                draw_edge(index(i, j, k), index(i + 1, j, k));
            }
            if j + 1 < nodes {
                draw_edge(index(i, j, k), index(i, j + 1, k));
            }
            if k + 1 < nodes {
                draw_edge(index(i, j, k), index(i, j, k + 1));
            }
        }

        for pt in &screen {
            draw_filled_rect_mut(
                image,
                Rect::at(pt.x.round() as i32 - 2, pt.y.round() as i32 - 2).of_size(4, 4),
                LATTICE_COLOR,
            );
        }
    }
}
